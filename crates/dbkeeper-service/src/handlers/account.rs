//! Account command handlers.

use std::sync::Arc;

use axum::extract::State;

use crate::auth::Actor;
use crate::error::{CommandError, Envelope};
use crate::handlers::Command;
use crate::provision::{Done, IsAuth, PasswordResult, WhoAmI};
use crate::state::AppState;

/// `account create`: provision the target and return its credential.
pub async fn create(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<PasswordResult>, CommandError> {
    req.no_args("account create")?;
    let target = req.target_for(&actor);

    state
        .provisioner
        .account_create(&actor.username, &target)
        .await
        .map(Envelope)
}

/// `account delete`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<Done>, CommandError> {
    req.no_args("account delete")?;
    let target = req.target_for(&actor);

    state
        .provisioner
        .account_delete(&actor.username, &target)
        .await
        .map(Envelope)
}

/// `account whoami`: describe the caller.
pub async fn whoami(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<WhoAmI>, CommandError> {
    req.no_args("account whoami")?;

    state
        .provisioner
        .whoami(&actor.principal, &actor.username)
        .map(Envelope)
}

/// `account is-auth`: may the caller act on the target?
pub async fn is_auth(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Command(req): Command,
) -> Result<Envelope<IsAuth>, CommandError> {
    req.no_args("account is-auth")?;
    let target = req.target_for(&actor);

    Ok(Envelope(state.provisioner.is_auth(&actor.username, &target)))
}
