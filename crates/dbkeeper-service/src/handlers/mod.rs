//! Command handlers.
//!
//! Each command is `POST /v1/<group>/<command>` with an optional JSON body
//! `{"target": "...", "args": ["..."]}`. The target defaults to the caller's
//! own account.

pub mod account;
pub mod database;
pub mod health;
pub mod password;
pub mod profile;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::Deserialize;

use crate::auth::Actor;
use crate::error::CommandError;

/// A command's target and arguments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandRequest {
    /// Account to act on; defaults to the caller.
    #[serde(default)]
    pub target: Option<String>,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandRequest {
    /// The target account, defaulting to the actor's own.
    #[must_use]
    pub fn target_for(&self, actor: &Actor) -> String {
        self.target
            .clone()
            .unwrap_or_else(|| actor.username.clone())
    }

    /// Reject any positional arguments.
    pub fn no_args(&self, command: &str) -> Result<(), CommandError> {
        if self.args.is_empty() {
            Ok(())
        } else {
            Err(CommandError::arity(command, 0, self.args.len()))
        }
    }
}

/// Extractor for [`CommandRequest`]. An empty body is an empty request.
#[derive(Debug, Clone, Default)]
pub struct Command(pub CommandRequest);

#[async_trait]
impl<S> FromRequest<S> for Command
where
    S: Send + Sync,
{
    type Rejection = CommandError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| CommandError::InvalidArguments(e.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(&body)
            .map(Self)
            .map_err(|e| CommandError::InvalidArguments(format!("malformed request: {e}")))
    }
}
