//! Command error types and the response envelope.
//!
//! Every command response is a JSON object carrying a `status` field:
//! `0` for success, `1` for failures the caller can act on, `2` for anything
//! unexpected. Successful results never set `status` themselves; [`Envelope`]
//! adds it.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use dbkeeper_core::DomainError;
use dbkeeper_store::StoreError;

/// Status of a successful command.
pub const STATUS_OK: u8 = 0;

/// Status of an expected, caller-actionable failure.
pub const STATUS_USER: u8 = 1;

/// Status of an unexpected failure.
pub const STATUS_INTERNAL: u8 = 2;

/// Where a name collision was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// The metadata store's uniqueness constraint.
    Metadata,
    /// The live database engine.
    Sql,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Metadata => "metadata",
            Self::Sql => "sql",
        })
    }
}

/// Which quota dimension was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaDimension {
    /// Number of enabled databases.
    Count,
    /// Total bytes used.
    Bytes,
}

impl fmt::Display for QuotaDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Count => "database count",
            Self::Bytes => "bytes",
        })
    }
}

/// Command error type.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Missing or invalid credentials.
    #[error("authentication required")]
    Unauthenticated,

    /// The actor may not act on the target.
    #[error("{actor} is not authorized to act on {target}")]
    Unauthorized {
        /// Acting identity.
        actor: String,
        /// Target identity.
        target: String,
    },

    /// Account or database not found.
    #[error("{0}")]
    NotFound(String),

    /// Wrong argument count, malformed name, or unparseable payload.
    #[error("{0}")]
    InvalidArguments(String),

    /// Name collision in metadata or on the live engine.
    #[error("{message}")]
    AlreadyExists {
        /// Human-readable description.
        message: String,
        /// Where the collision happened.
        location: Location,
    },

    /// A quota limit would be exceeded.
    #[error("quota exceeded ({dimension}): {current} of {limit}")]
    QuotaExceeded {
        /// Which limit.
        dimension: QuotaDimension,
        /// Current value.
        current: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl CommandError {
    /// The envelope status for this error.
    #[must_use]
    pub const fn status(&self) -> u8 {
        match self {
            Self::Internal(_) => STATUS_INTERNAL,
            _ => STATUS_USER,
        }
    }

    /// The HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidArguments(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::QuotaExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build an argument-count error.
    pub(crate) fn arity(command: &str, expected: usize, got: usize) -> Self {
        Self::InvalidArguments(format!(
            "{command} takes {expected} argument(s), got {got}"
        ))
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    status: u8,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        if let Self::Internal(msg) = &self {
            tracing::error!(error = %msg, "Command failed unexpectedly");
        }

        let location = match &self {
            Self::AlreadyExists { location, .. } => Some(*location),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            status: self.status(),
            location,
        };

        (self.http_status(), Json(body)).into_response()
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::AlreadyExists { entity, id } => Self::AlreadyExists {
                message: format!("{entity} already exists: {id}"),
                location: Location::Metadata,
            },
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

/// A successful command result, serialized with `status: 0` added.
#[derive(Debug)]
pub struct Envelope<T>(pub T);

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.0) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.entry("status").or_insert_with(|| STATUS_OK.into());
                (StatusCode::OK, Json(serde_json::Value::Object(map))).into_response()
            }
            Ok(_) => CommandError::Internal("command result is not an object".into())
                .into_response(),
            Err(e) => CommandError::Internal(e.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_internal_errors_are_status_two() {
        assert_eq!(CommandError::Internal("boom".into()).status(), STATUS_INTERNAL);
        assert_eq!(CommandError::NotFound("x".into()).status(), STATUS_USER);
        assert_eq!(
            CommandError::QuotaExceeded {
                dimension: QuotaDimension::Count,
                current: 2,
                limit: 2,
            }
            .status(),
            STATUS_USER
        );
        assert_eq!(
            CommandError::Unauthorized {
                actor: "alice".into(),
                target: "bob".into(),
            }
            .status(),
            STATUS_USER
        );
    }

    #[test]
    fn quota_message_names_current_and_limit() {
        let err = CommandError::QuotaExceeded {
            dimension: QuotaDimension::Bytes,
            current: 120,
            limit: 100,
        };
        assert_eq!(err.to_string(), "quota exceeded (bytes): 120 of 100");
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        let err: CommandError = StoreError::AlreadyExists {
            entity: "database",
            id: "alice+blog".into(),
        }
        .into();
        assert!(matches!(
            err,
            CommandError::AlreadyExists {
                location: Location::Metadata,
                ..
            }
        ));

        let err: CommandError = StoreError::Database("io".into()).into();
        assert_eq!(err.status(), STATUS_INTERNAL);
    }

    #[test]
    fn http_status_codes() {
        assert_eq!(
            CommandError::Unauthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CommandError::AlreadyExists {
                message: String::new(),
                location: Location::Sql,
            }
            .http_status(),
            StatusCode::CONFLICT
        );
    }
}
