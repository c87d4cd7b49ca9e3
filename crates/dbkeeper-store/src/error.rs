//! Error types for dbkeeper metadata storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Key that was looked up.
        id: String,
    },

    /// A uniqueness constraint was violated.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// Kind of record.
        entity: &'static str,
        /// Key that collided.
        id: String,
    },
}

impl StoreError {
    pub(crate) fn account_not_found(name: impl ToString) -> Self {
        Self::NotFound {
            entity: "account",
            id: name.to_string(),
        }
    }

    pub(crate) fn database_not_found(name: impl ToString) -> Self {
        Self::NotFound {
            entity: "database",
            id: name.to_string(),
        }
    }
}
