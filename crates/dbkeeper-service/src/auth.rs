//! Authentication extractor.
//!
//! The acting identity comes from the bearer token, never from the request
//! body. Tokens are HS256 JWTs whose subject is the caller's principal, e.g.
//! `alice@EXAMPLE.ORG`; the account name is the part before `@`.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Full principal from the token subject.
    pub principal: String,
    /// Account name derived from the principal.
    pub username: String,
}

impl Actor {
    /// Build an actor from a principal.
    #[must_use]
    pub fn from_principal(principal: &str) -> Self {
        let username = principal
            .split_once('@')
            .map_or(principal, |(user, _)| user)
            .to_string();

        Self {
            principal: principal.to_string(),
            username,
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = CommandError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(CommandError::Unauthenticated)?;

        // Extract the Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(CommandError::Unauthenticated)?;

        // Allow test tokens in testing only.
        // This bypass is gated behind #[cfg(test)] or the "test-auth" feature
        // to ensure it is never active in production builds.
        #[cfg(any(test, feature = "test-auth"))]
        if let Some(principal) = token.strip_prefix("test-token:") {
            if principal.is_empty() {
                return Err(CommandError::Unauthenticated);
            }
            return Ok(Self::from_principal(principal));
        }

        let claims = validate_jwt(token, state)?;
        Ok(Self::from_principal(&claims.sub))
    }
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (principal).
    pub sub: String,
    /// Audience (can be string or array).
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Validate an HS256 token against the configured secret and audience.
fn validate_jwt(token: &str, state: &AppState) -> Result<JwtClaims, CommandError> {
    let secret = state
        .config
        .auth_secret
        .as_ref()
        .ok_or(CommandError::Unauthenticated)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[&state.config.auth_audience]);

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        CommandError::Unauthenticated
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(CommandError::Unauthenticated);
    }

    Ok(token_data.claims)
}
