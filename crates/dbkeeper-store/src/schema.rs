//! Column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Account records, keyed by account name.
    pub const ACCOUNTS: &str = "accounts";

    /// Account quotas, keyed by account name.
    pub const QUOTAS: &str = "quotas";

    /// Account usage stats, keyed by account name.
    pub const USAGE: &str = "usage";

    /// Database records, keyed by composite database name.
    pub const DATABASES: &str = "databases";

    /// Per-database quotas, keyed by composite database name.
    pub const DATABASE_QUOTAS: &str = "database_quotas";

    /// Ownership index, keyed by `owner || 0x00 || database`.
    /// Value is empty (index only).
    pub const DATABASES_BY_OWNER: &str = "databases_by_owner";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::QUOTAS,
        cf::USAGE,
        cf::DATABASES,
        cf::DATABASE_QUOTAS,
        cf::DATABASES_BY_OWNER,
    ]
}
