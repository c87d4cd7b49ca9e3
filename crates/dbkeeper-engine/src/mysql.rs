//! MySQL implementation of the live engine.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{debug, instrument};

use dbkeeper_core::{AccountName, DatabaseName};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::{statements, LiveEngine, Operation};

/// Live engine backed by a MySQL-compatible server.
#[derive(Debug, Clone)]
pub struct MySqlEngine {
    pool: MySqlPool,
    timeout: Duration,
}

impl MySqlEngine {
    /// Build a lazily connecting pool from `config`.
    ///
    /// No connection is made until the first operation, so the service can start
    /// while the engine is briefly unavailable.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Connection` if the URL cannot be parsed.
    pub fn connect(config: &EngineConfig) -> Result<Self, EngineError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(timeout)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::Executor::execute(conn, sqlx::raw_sql(statements::SESSION_SETUP))
                        .await?;
                    Ok(())
                })
            })
            .connect_lazy(&config.url)
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        Ok(Self { pool, timeout })
    }

    /// Build from an existing pool.
    ///
    /// The pool's connections must already run [`statements::SESSION_SETUP`].
    #[must_use]
    pub fn from_pool(pool: MySqlPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Run one statement, bounded by the configured timeout.
    async fn execute(&self, operation: Operation, sql: String) -> Result<(), EngineError> {
        let run = sqlx::raw_sql(&sql).execute(&self.pool);
        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(_)) => {
                debug!(operation = operation.as_str(), "Engine statement executed");
                Ok(())
            }
            Ok(Err(e)) => Err(map_sqlx_error(operation, e)),
            Err(_) => Err(EngineError::Timeout {
                operation: operation.as_str(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

fn map_sqlx_error(operation: Operation, error: sqlx::Error) -> EngineError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => EngineError::Connection(error.to_string()),
        other => EngineError::Statement {
            operation: operation.as_str(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl LiveEngine for MySqlEngine {
    #[instrument(skip(self, password))]
    async fn create_account(
        &self,
        name: &AccountName,
        host: &str,
        password: &str,
    ) -> Result<(), EngineError> {
        self.execute(
            Operation::CreateAccount,
            statements::create_account(name, host, password),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn drop_account(&self, name: &AccountName, host: &str) -> Result<(), EngineError> {
        self.execute(Operation::DropAccount, statements::drop_account(name, host))
            .await
    }

    #[instrument(skip(self, password))]
    async fn change_password(
        &self,
        name: &AccountName,
        host: &str,
        password: &str,
    ) -> Result<(), EngineError> {
        self.execute(
            Operation::ChangePassword,
            statements::change_password(name, host, password),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn create_database(&self, database: &DatabaseName) -> Result<(), EngineError> {
        self.execute(Operation::CreateDatabase, statements::create_database(database))
            .await
    }

    #[instrument(skip(self))]
    async fn drop_database(
        &self,
        database: &DatabaseName,
        ignore_missing: bool,
    ) -> Result<(), EngineError> {
        self.execute(
            Operation::DropDatabase,
            statements::drop_database(database, ignore_missing),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn grant(
        &self,
        database: &DatabaseName,
        name: &AccountName,
        host: &str,
    ) -> Result<(), EngineError> {
        self.execute(Operation::Grant, statements::grant(database, name, host))
            .await
    }

    #[instrument(skip(self))]
    async fn revoke(
        &self,
        database: &DatabaseName,
        name: &AccountName,
        host: &str,
    ) -> Result<(), EngineError> {
        self.execute(Operation::Revoke, statements::revoke(database, name, host))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_is_lazy() {
        let engine = MySqlEngine::connect(&EngineConfig::new("mysql://root@127.0.0.1:1/none"));
        assert!(engine.is_ok());
    }

    #[test]
    fn bad_url_is_a_connection_error() {
        let result = MySqlEngine::connect(&EngineConfig::new("not a url"));
        assert!(matches!(result, Err(EngineError::Connection(_))));
    }

    #[test]
    fn pool_errors_map_to_connection() {
        let mapped = map_sqlx_error(Operation::Grant, sqlx::Error::PoolTimedOut);
        assert!(matches!(mapped, EngineError::Connection(_)));

        let mapped = map_sqlx_error(Operation::Grant, sqlx::Error::RowNotFound);
        assert!(matches!(
            mapped,
            EngineError::Statement {
                operation: "grant",
                ..
            }
        ));
    }
}
