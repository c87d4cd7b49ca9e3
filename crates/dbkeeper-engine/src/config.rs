//! Live engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the MySQL live engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Connection URL with administrative credentials (`mysql://root:pw@host:3306`).
    pub url: String,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// Upper bound for each adapter call, in seconds.
    pub timeout_seconds: u64,
}

impl EngineConfig {
    /// Create a configuration for `url` with default pool and timeout settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 4,
            timeout_seconds: 10,
        }
    }

    /// Set the pool size.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}
