//! Password command handlers.

use std::sync::Arc;

use axum::extract::State;

use crate::auth::Actor;
use crate::error::{CommandError, Envelope};
use crate::handlers::Command;
use crate::provision::{Done, PasswordResult};
use crate::state::AppState;

/// `password set <password>`
pub async fn set(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<Done>, CommandError> {
    let target = req.target_for(&actor);

    state
        .provisioner
        .password_set(&actor.username, &target, &req.args)
        .await
        .map(Envelope)
}

/// `password generate`: the only way to learn a credential after the fact.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<PasswordResult>, CommandError> {
    req.no_args("password generate")?;
    let target = req.target_for(&actor);

    state
        .provisioner
        .password_generate(&actor.username, &target)
        .await
        .map(Envelope)
}
