//! Error types for dbkeeper domain values.

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Errors raised while constructing or parsing domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// An account name failed validation.
    #[error("invalid account name {name:?}: {reason}")]
    InvalidAccountName {
        /// The rejected input.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A short database name failed validation.
    #[error("invalid database name {name:?}: {reason}")]
    InvalidDatabaseName {
        /// The rejected input.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A profile payload was not a flat JSON object.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}
