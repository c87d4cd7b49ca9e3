//! Client error types.

/// Errors that can occur when using the dbkeeper client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or rejected bearer token.
    #[error("unauthenticated: {message}")]
    Unauthenticated {
        /// Server message.
        message: String,
    },

    /// The caller may not act on the target.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Server message.
        message: String,
    },

    /// Account or database not found.
    #[error("not found: {message}")]
    NotFound {
        /// Server message.
        message: String,
    },

    /// The command's arguments were rejected.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// Server message.
        message: String,
    },

    /// Name collision.
    #[error("already exists ({location}): {message}")]
    AlreadyExists {
        /// Server message.
        message: String,
        /// `metadata` or `sql`.
        location: String,
    },

    /// A quota would be exceeded.
    #[error("quota exceeded: {message}")]
    QuotaExceeded {
        /// Server message, naming the current value and the limit.
        message: String,
    },

    /// Any other failure reported by the server.
    #[error("command failed (status {status}, HTTP {http_status}): {message}")]
    Command {
        /// Envelope status, `2` for unexpected failures.
        status: u8,
        /// Server message.
        message: String,
        /// HTTP status code.
        http_status: u16,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether this is an expected, caller-actionable failure (envelope status 1).
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Unauthenticated { .. }
            | Self::Unauthorized { .. }
            | Self::NotFound { .. }
            | Self::InvalidArguments { .. }
            | Self::AlreadyExists { .. }
            | Self::QuotaExceeded { .. } => true,
            Self::Command { status, .. } => *status == 1,
            Self::Http(_) | Self::Serialization(_) | Self::Configuration(_) => false,
        }
    }
}
