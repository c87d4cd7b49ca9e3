//! Live database engine adapter for dbkeeper.
//!
//! The metadata store records who owns what; this crate makes it real on the
//! database engine: accounts, schemas, passwords, and privilege grants.
//!
//! Two implementations of [`LiveEngine`] are provided:
//!
//! - [`MySqlEngine`] runs statements against a MySQL-compatible server via `sqlx`.
//! - [`MemoryEngine`] keeps the same state in process, for local development and
//!   tests, and can be told to fail specific operations.
//!
//! # Example
//!
//! ```no_run
//! use dbkeeper_engine::{EngineConfig, LiveEngine, MySqlEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MySqlEngine::connect(&EngineConfig::new("mysql://root:pw@localhost"))?;
//! engine
//!     .create_account(&"alice".parse()?, "%", "s3cret!")
//!     .await?;
//! engine.create_database(&"alice+blog".parse()?).await?;
//! engine
//!     .grant(&"alice+blog".parse()?, &"alice".parse()?, "%")
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod memory;
mod mysql;
pub mod statements;

pub use config::EngineConfig;
pub use error::EngineError;
pub use memory::MemoryEngine;
pub use mysql::MySqlEngine;

use async_trait::async_trait;
use dbkeeper_core::{AccountName, DatabaseName};

/// Host pattern matching any originating host.
pub const WILDCARD_HOST: &str = "%";

/// Operations of the live engine adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Create a login account.
    CreateAccount,
    /// Drop a login account.
    DropAccount,
    /// Change an account's password.
    ChangePassword,
    /// Create a schema.
    CreateDatabase,
    /// Drop a schema.
    DropDatabase,
    /// Grant all privileges on a schema.
    Grant,
    /// Revoke all privileges on a schema.
    Revoke,
}

impl Operation {
    /// Get the operation name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateAccount => "create-account",
            Self::DropAccount => "drop-account",
            Self::ChangePassword => "change-password",
            Self::CreateDatabase => "create-database",
            Self::DropDatabase => "drop-database",
            Self::Grant => "grant",
            Self::Revoke => "revoke",
        }
    }
}

/// The live database engine.
///
/// Drop and revoke are expected to be called on a best-effort basis; callers
/// decide whether their failures matter.
#[async_trait]
pub trait LiveEngine: Send + Sync {
    /// Create an account that may log in from `host` with `password`.
    async fn create_account(
        &self,
        name: &AccountName,
        host: &str,
        password: &str,
    ) -> Result<(), EngineError>;

    /// Drop an account. An account that is already gone is not an error.
    async fn drop_account(&self, name: &AccountName, host: &str) -> Result<(), EngineError>;

    /// Change an account's password.
    async fn change_password(
        &self,
        name: &AccountName,
        host: &str,
        password: &str,
    ) -> Result<(), EngineError>;

    /// Create a schema.
    async fn create_database(&self, database: &DatabaseName) -> Result<(), EngineError>;

    /// Drop a schema; with `ignore_missing`, a missing schema is not an error.
    async fn drop_database(
        &self,
        database: &DatabaseName,
        ignore_missing: bool,
    ) -> Result<(), EngineError>;

    /// Grant an account all privileges on a schema.
    async fn grant(
        &self,
        database: &DatabaseName,
        name: &AccountName,
        host: &str,
    ) -> Result<(), EngineError>;

    /// Revoke an account's privileges on a schema.
    async fn revoke(
        &self,
        database: &DatabaseName,
        name: &AccountName,
        host: &str,
    ) -> Result<(), EngineError>;
}
