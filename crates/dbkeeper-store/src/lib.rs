//! `RocksDB` metadata store for dbkeeper.
//!
//! This crate keeps the bookkeeping side of provisioning: accounts, their
//! quotas and usage stats, databases, and which account owns which database.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: account records, keyed by account name
//! - `quotas` / `usage`: one record per account, same key
//! - `databases`: database records, keyed by composite name
//! - `database_quotas`: one record per database, same key
//! - `databases_by_owner`: ownership index for listing an account's databases
//!
//! Uniqueness of account names and composite database names is enforced here:
//! every check-then-write runs under one write lock and lands as a single
//! `WriteBatch`, so concurrent creators are serialized and the loser gets
//! `StoreError::AlreadyExists`.
//!
//! # Example
//!
//! ```no_run
//! use dbkeeper_core::{Account, Quota, UsageStat};
//! use dbkeeper_store::{MetadataStore, RocksStore};
//!
//! let store = RocksStore::open("/tmp/dbkeeper-db").unwrap();
//!
//! let account = Account::new("alice".parse().unwrap(), String::new(), String::new());
//! store
//!     .create_account(&account, &Quota::default(), &UsageStat::empty())
//!     .unwrap();
//!
//! let databases = store.list_databases_by_owner(&account.name).unwrap();
//! assert!(databases.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use dbkeeper_core::{
    Account, AccountName, Database, DatabaseName, DatabaseQuota, Quota, UsageStat,
};

/// The metadata store trait defining all bookkeeping operations.
///
/// Every method that writes more than one record applies them atomically.
pub trait MetadataStore: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert an account together with its quota and usage stat.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if an account with the same name exists.
    fn create_account(&self, account: &Account, quota: &Quota, usage: &UsageStat) -> Result<()>;

    /// Get an account by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, name: &AccountName) -> Result<Option<Account>>;

    /// Replace an existing account record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn update_account(&self, account: &Account) -> Result<()>;

    /// Delete an account and everything it owns in metadata.
    ///
    /// Removes the quota, usage stat, owned database rows, their quotas, and the
    /// ownership index entries in one batch.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn delete_account(&self, name: &AccountName) -> Result<()>;

    /// Get an account's quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_quota(&self, name: &AccountName) -> Result<Option<Quota>>;

    /// Replace an account's quota.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn put_quota(&self, name: &AccountName, quota: &Quota) -> Result<()>;

    /// Get an account's usage stat.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_usage(&self, name: &AccountName) -> Result<Option<UsageStat>>;

    /// Record current byte usage for an account (out-of-band accounting).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn record_usage(&self, name: &AccountName, bytes: u64) -> Result<()>;

    // =========================================================================
    // Database Operations
    // =========================================================================

    /// Insert a database, its ownership index entry, and its quota.
    ///
    /// # Errors
    ///
    /// - `StoreError::AlreadyExists` if the composite name is taken, enabled or not.
    /// - `StoreError::NotFound` if the owner account doesn't exist.
    fn create_database(&self, database: &Database, quota: &DatabaseQuota) -> Result<()>;

    /// Get a database by composite name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_database(&self, name: &DatabaseName) -> Result<Option<Database>>;

    /// Get a database's quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_database_quota(&self, name: &DatabaseName) -> Result<Option<DatabaseQuota>>;

    /// Delete a database, its ownership index entry, and its quota.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the database doesn't exist.
    fn delete_database(&self, name: &DatabaseName) -> Result<()>;

    /// List every database owned by an account, enabled or not, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_databases_by_owner(&self, owner: &AccountName) -> Result<Vec<Database>>;

    /// Set the soft-delete flag of a database.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the database doesn't exist.
    fn set_database_enabled(&self, name: &DatabaseName, enabled: bool) -> Result<()>;

    /// Record the current size of a database (out-of-band accounting).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the database doesn't exist.
    fn record_database_size(&self, name: &DatabaseName, bytes: u64) -> Result<()>;

    /// Count the enabled databases of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn count_enabled_databases(&self, owner: &AccountName) -> Result<usize> {
        Ok(self
            .list_databases_by_owner(owner)?
            .iter()
            .filter(|db| db.enabled)
            .count())
    }
}
