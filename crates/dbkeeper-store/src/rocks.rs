//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `MetadataStore` trait.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use dbkeeper_core::{
    Account, AccountName, Database, DatabaseName, DatabaseQuota, Quota, UsageStat,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::MetadataStore;

/// RocksDB-backed metadata store.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes every read-check-write sequence so uniqueness checks and the
    /// batch that follows them cannot interleave with another writer.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get<T: serde::de::DeserializeOwned>(&self, family: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(family)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn exists(&self, family: &str, key: &[u8]) -> Result<bool> {
        let cf = self.cf(family)?;
        Ok(self
            .db
            .get_pinned_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some())
    }

    fn put<T: serde::Serialize>(&self, family: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(family)?;
        let value = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn owned_database_names(&self, owner: &AccountName) -> Result<Vec<DatabaseName>> {
        let cf_by_owner = self.cf(cf::DATABASES_BY_OWNER)?;
        let prefix = keys::owner_prefix(owner);

        let iter = self
            .db
            .iterator_cf(&cf_by_owner, IteratorMode::From(&prefix, Direction::Forward));

        let mut names = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            names.push(keys::database_from_owner_key(&key)?);
        }
        Ok(names)
    }
}

impl MetadataStore for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn create_account(&self, account: &Account, quota: &Quota, usage: &UsageStat) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::account_key(&account.name);

        if self.exists(cf::ACCOUNTS, &key)? {
            return Err(StoreError::AlreadyExists {
                entity: "account",
                id: account.name.to_string(),
            });
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(&self.cf(cf::ACCOUNTS)?, &key, Self::serialize(account)?);
        batch.put_cf(&self.cf(cf::QUOTAS)?, &key, Self::serialize(quota)?);
        batch.put_cf(&self.cf(cf::USAGE)?, &key, Self::serialize(usage)?);
        self.write(batch)?;

        tracing::debug!(account = %account.name, "Account row inserted");
        Ok(())
    }

    fn get_account(&self, name: &AccountName) -> Result<Option<Account>> {
        self.get(cf::ACCOUNTS, &keys::account_key(name))
    }

    fn update_account(&self, account: &Account) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::account_key(&account.name);

        if !self.exists(cf::ACCOUNTS, &key)? {
            return Err(StoreError::account_not_found(&account.name));
        }
        self.put(cf::ACCOUNTS, &key, account)
    }

    fn delete_account(&self, name: &AccountName) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::account_key(name);

        if !self.exists(cf::ACCOUNTS, &key)? {
            return Err(StoreError::account_not_found(name));
        }

        let cf_databases = self.cf(cf::DATABASES)?;
        let cf_db_quotas = self.cf(cf::DATABASE_QUOTAS)?;
        let cf_by_owner = self.cf(cf::DATABASES_BY_OWNER)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&self.cf(cf::ACCOUNTS)?, &key);
        batch.delete_cf(&self.cf(cf::QUOTAS)?, &key);
        batch.delete_cf(&self.cf(cf::USAGE)?, &key);

        let owned = self.owned_database_names(name)?;
        for database in &owned {
            let db_key = keys::database_key(database);
            batch.delete_cf(&cf_databases, &db_key);
            batch.delete_cf(&cf_db_quotas, &db_key);
            batch.delete_cf(&cf_by_owner, keys::owner_database_key(name, database));
        }
        self.write(batch)?;

        tracing::debug!(account = %name, databases = owned.len(), "Account rows deleted");
        Ok(())
    }

    fn get_quota(&self, name: &AccountName) -> Result<Option<Quota>> {
        self.get(cf::QUOTAS, &keys::account_key(name))
    }

    fn put_quota(&self, name: &AccountName, quota: &Quota) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::account_key(name);

        if !self.exists(cf::ACCOUNTS, &key)? {
            return Err(StoreError::account_not_found(name));
        }
        self.put(cf::QUOTAS, &key, quota)
    }

    fn get_usage(&self, name: &AccountName) -> Result<Option<UsageStat>> {
        self.get(cf::USAGE, &keys::account_key(name))
    }

    fn record_usage(&self, name: &AccountName, bytes: u64) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::account_key(name);

        if !self.exists(cf::ACCOUNTS, &key)? {
            return Err(StoreError::account_not_found(name));
        }
        let usage = UsageStat {
            bytes,
            updated_at: chrono::Utc::now(),
        };
        self.put(cf::USAGE, &key, &usage)
    }

    // =========================================================================
    // Database Operations
    // =========================================================================

    fn create_database(&self, database: &Database, quota: &DatabaseQuota) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::database_key(&database.name);

        if self.exists(cf::DATABASES, &key)? {
            return Err(StoreError::AlreadyExists {
                entity: "database",
                id: database.name.to_string(),
            });
        }
        if !self.exists(cf::ACCOUNTS, &keys::account_key(&database.owner))? {
            return Err(StoreError::account_not_found(&database.owner));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(&self.cf(cf::DATABASES)?, &key, Self::serialize(database)?);
        batch.put_cf(&self.cf(cf::DATABASE_QUOTAS)?, &key, Self::serialize(quota)?);
        batch.put_cf(
            &self.cf(cf::DATABASES_BY_OWNER)?,
            keys::owner_database_key(&database.owner, &database.name),
            [],
        );
        self.write(batch)?;

        tracing::debug!(database = %database.name, "Database row inserted");
        Ok(())
    }

    fn get_database(&self, name: &DatabaseName) -> Result<Option<Database>> {
        self.get(cf::DATABASES, &keys::database_key(name))
    }

    fn get_database_quota(&self, name: &DatabaseName) -> Result<Option<DatabaseQuota>> {
        self.get(cf::DATABASE_QUOTAS, &keys::database_key(name))
    }

    fn delete_database(&self, name: &DatabaseName) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::database_key(name);

        let database: Database = self
            .get(cf::DATABASES, &key)?
            .ok_or_else(|| StoreError::database_not_found(name))?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&self.cf(cf::DATABASES)?, &key);
        batch.delete_cf(&self.cf(cf::DATABASE_QUOTAS)?, &key);
        batch.delete_cf(
            &self.cf(cf::DATABASES_BY_OWNER)?,
            keys::owner_database_key(&database.owner, name),
        );
        self.write(batch)?;

        tracing::debug!(database = %name, "Database row deleted");
        Ok(())
    }

    fn list_databases_by_owner(&self, owner: &AccountName) -> Result<Vec<Database>> {
        let mut databases = Vec::new();
        for name in self.owned_database_names(owner)? {
            if let Some(database) = self.get_database(&name)? {
                databases.push(database);
            }
        }
        Ok(databases)
    }

    fn set_database_enabled(&self, name: &DatabaseName, enabled: bool) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::database_key(name);

        let mut database: Database = self
            .get(cf::DATABASES, &key)?
            .ok_or_else(|| StoreError::database_not_found(name))?;
        database.enabled = enabled;
        self.put(cf::DATABASES, &key, &database)
    }

    fn record_database_size(&self, name: &DatabaseName, bytes: u64) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::database_key(name);

        let mut database: Database = self
            .get(cf::DATABASES, &key)?
            .ok_or_else(|| StoreError::database_not_found(name))?;
        database.size_bytes = bytes;
        self.put(cf::DATABASES, &key, &database)
    }
}
