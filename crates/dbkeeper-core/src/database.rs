//! Database types for dbkeeper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountName, DatabaseName, DEFAULT_MAX_BYTES};

/// A provisioned database owned by exactly one account.
///
/// The `enabled` flag is a soft-delete marker: a disabled database keeps its
/// row (and its composite name) but is excluded from listings and quota counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Composite `<owner>+<local>` name.
    pub name: DatabaseName,

    /// The owning account.
    pub owner: AccountName,

    /// Whether the database logically exists.
    pub enabled: bool,

    /// Size in bytes, mirrored from the live engine by external accounting.
    pub size_bytes: u64,

    /// When the database was created.
    pub created_at: DateTime<Utc>,
}

impl Database {
    /// A newly created, enabled, empty database.
    #[must_use]
    pub fn new(name: DatabaseName, owner: AccountName) -> Self {
        Self {
            name,
            owner,
            enabled: true,
            size_bytes: 0,
            created_at: Utc::now(),
        }
    }
}

/// Per-database limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseQuota {
    /// Maximum bytes for this database.
    pub max_bytes: u64,
}

impl Default for DatabaseQuota {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}
