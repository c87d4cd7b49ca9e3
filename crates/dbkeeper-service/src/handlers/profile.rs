//! Profile command handlers.

use std::sync::Arc;

use axum::extract::State;

use dbkeeper_core::Profile;

use crate::auth::Actor;
use crate::error::{CommandError, Envelope};
use crate::handlers::Command;
use crate::provision::Done;
use crate::state::AppState;

/// `profile get`
pub async fn get(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<Profile>, CommandError> {
    req.no_args("profile get")?;
    let target = req.target_for(&actor);

    state
        .provisioner
        .profile_get(&actor.username, &target)
        .map(Envelope)
}

/// `profile set <json-object>`
pub async fn set(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<Done>, CommandError> {
    let target = req.target_for(&actor);

    state
        .provisioner
        .profile_set(&actor.username, &target, &req.args)
        .map(Envelope)
}
