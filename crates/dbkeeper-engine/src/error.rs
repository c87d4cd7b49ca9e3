//! Error types for live engine operations.

/// Errors that can occur while talking to the live database engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine could not be reached.
    #[error("failed to connect to database engine: {0}")]
    Connection(String),

    /// A statement was sent and the engine reported an error.
    #[error("{operation} failed: {message}")]
    Statement {
        /// Which adapter operation failed.
        operation: &'static str,
        /// The engine's error text.
        message: String,
    },

    /// The call did not finish within the configured timeout.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// Which adapter operation timed out.
        operation: &'static str,
        /// The configured timeout.
        seconds: u64,
    },

    /// The engine refused the operation without running it (used by injected faults).
    #[error("{operation} rejected: {reason}")]
    Rejected {
        /// Which adapter operation was rejected.
        operation: &'static str,
        /// Why.
        reason: String,
    },
}
