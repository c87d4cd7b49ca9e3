//! Database command handlers.

use std::sync::Arc;

use axum::extract::State;

use crate::auth::Actor;
use crate::error::{CommandError, Envelope};
use crate::handlers::Command;
use crate::provision::{DatabaseCreated, DatabaseListing, Done};
use crate::state::AppState;

/// `database create <name>`
pub async fn create(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<DatabaseCreated>, CommandError> {
    let target = req.target_for(&actor);

    state
        .provisioner
        .database_create(&actor.username, &target, &req.args)
        .await
        .map(Envelope)
}

/// `database drop <name>`
pub async fn drop(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<Done>, CommandError> {
    let target = req.target_for(&actor);

    state
        .provisioner
        .database_drop(&actor.username, &target, &req.args)
        .await
        .map(Envelope)
}

/// `database list`
pub async fn list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<DatabaseListing>, CommandError> {
    let target = req.target_for(&actor);

    state
        .provisioner
        .database_list(&actor.username, &target, &req.args)
        .map(Envelope)
}
