//! Key encoding utilities for `RocksDB`.
//!
//! Names are plain ASCII, so keys are their bytes. The ownership index joins
//! owner and database with a `0x00` byte, which never appears in a valid name,
//! so an owner prefix cannot match another owner whose name extends it.

use dbkeeper_core::{AccountName, DatabaseName};

use crate::error::{Result, StoreError};

const SEPARATOR: u8 = 0;

/// Create an account key (also used for the quota and usage families).
#[must_use]
pub fn account_key(name: &AccountName) -> Vec<u8> {
    name.as_str().as_bytes().to_vec()
}

/// Create a database key (also used for the per-database quota family).
#[must_use]
pub fn database_key(name: &DatabaseName) -> Vec<u8> {
    name.as_str().as_bytes().to_vec()
}

/// Create an ownership index key.
///
/// Format: `owner || 0x00 || composite database name`
#[must_use]
pub fn owner_database_key(owner: &AccountName, database: &DatabaseName) -> Vec<u8> {
    let mut key = owner_prefix(owner);
    key.extend_from_slice(database.as_str().as_bytes());
    key
}

/// Create a prefix for iterating all databases of an owner.
#[must_use]
pub fn owner_prefix(owner: &AccountName) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.as_str().len() + 1);
    key.extend_from_slice(owner.as_str().as_bytes());
    key.push(SEPARATOR);
    key
}

/// Extract the database name from an ownership index key.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the key is malformed.
pub fn database_from_owner_key(key: &[u8]) -> Result<DatabaseName> {
    let malformed = || StoreError::Serialization("malformed ownership index key".into());
    let split = key
        .iter()
        .position(|b| *b == SEPARATOR)
        .ok_or_else(malformed)?;
    let name = std::str::from_utf8(&key[split + 1..]).map_err(|_| malformed())?;
    name.parse().map_err(|_| malformed())
}
