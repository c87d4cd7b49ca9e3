//! In-process implementation of the live engine.
//!
//! Mirrors the MySQL adapter's observable behaviour closely enough for the
//! coordinator to be exercised without a server:
//!
//! - creating an account or schema that already exists fails;
//! - dropping an account that is gone succeeds (the adapter uses `IF EXISTS`);
//! - granting to a missing account fails, as does revoking a grant that was never made.
//!
//! Faults can be injected per operation with [`MemoryEngine::fail_next`], and
//! every call is recorded for assertions.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use dbkeeper_core::{AccountName, DatabaseName};

use crate::error::EngineError;
use crate::{LiveEngine, Operation};

#[derive(Debug, Default)]
struct State {
    /// `(name, host)` → password.
    accounts: BTreeMap<(String, String), String>,
    databases: BTreeSet<String>,
    /// `(database, name, host)`.
    grants: BTreeSet<(String, String, String)>,
    faults: HashMap<Operation, usize>,
    calls: Vec<Operation>,
}

/// Live engine kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: Mutex<State>,
}

impl MemoryEngine {
    /// Create an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of `operation` fail without changing state.
    pub fn fail_next(&self, operation: Operation) {
        *self.state().faults.entry(operation).or_default() += 1;
    }

    /// Every operation called so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Operation> {
        self.state().calls.clone()
    }

    /// Number of times `operation` was called.
    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state().calls.iter().filter(|op| **op == operation).count()
    }

    /// Whether an account exists for `name` at `host`.
    #[must_use]
    pub fn has_account(&self, name: &str, host: &str) -> bool {
        self.state()
            .accounts
            .contains_key(&(name.to_string(), host.to_string()))
    }

    /// The current password of an account, if it exists.
    #[must_use]
    pub fn password_of(&self, name: &str, host: &str) -> Option<String> {
        self.state()
            .accounts
            .get(&(name.to_string(), host.to_string()))
            .cloned()
    }

    /// Whether a schema exists.
    #[must_use]
    pub fn has_database(&self, database: &str) -> bool {
        self.state().databases.contains(database)
    }

    /// Whether `name@host` holds privileges on `database`.
    #[must_use]
    pub fn has_grant(&self, database: &str, name: &str, host: &str) -> bool {
        self.state().grants.contains(&(
            database.to_string(),
            name.to_string(),
            host.to_string(),
        ))
    }

    /// Record the call and consume an injected fault, if any.
    fn begin(&self, operation: Operation) -> Result<MutexGuard<'_, State>, EngineError> {
        let mut state = self.state();
        state.calls.push(operation);
        if let Some(remaining) = state.faults.get_mut(&operation) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EngineError::Rejected {
                    operation: operation.as_str(),
                    reason: "injected fault".into(),
                });
            }
        }
        Ok(state)
    }
}

fn statement_error(operation: Operation, message: impl Into<String>) -> EngineError {
    EngineError::Statement {
        operation: operation.as_str(),
        message: message.into(),
    }
}

#[async_trait]
impl LiveEngine for MemoryEngine {
    async fn create_account(
        &self,
        name: &AccountName,
        host: &str,
        password: &str,
    ) -> Result<(), EngineError> {
        let op = Operation::CreateAccount;
        let mut state = self.begin(op)?;
        let key = (name.to_string(), host.to_string());
        if state.accounts.contains_key(&key) {
            return Err(statement_error(op, format!("account {name}@{host} exists")));
        }
        state.accounts.insert(key, password.to_string());
        Ok(())
    }

    async fn drop_account(&self, name: &AccountName, host: &str) -> Result<(), EngineError> {
        let mut state = self.begin(Operation::DropAccount)?;
        state
            .accounts
            .remove(&(name.to_string(), host.to_string()));
        state
            .grants
            .retain(|(_, grantee, grant_host)| !(grantee == name.as_str() && grant_host == host));
        Ok(())
    }

    async fn change_password(
        &self,
        name: &AccountName,
        host: &str,
        password: &str,
    ) -> Result<(), EngineError> {
        let op = Operation::ChangePassword;
        let mut state = self.begin(op)?;
        match state.accounts.get_mut(&(name.to_string(), host.to_string())) {
            Some(current) => {
                *current = password.to_string();
                Ok(())
            }
            None => Err(statement_error(op, format!("no account {name}@{host}"))),
        }
    }

    async fn create_database(&self, database: &DatabaseName) -> Result<(), EngineError> {
        let op = Operation::CreateDatabase;
        let mut state = self.begin(op)?;
        if !state.databases.insert(database.to_string()) {
            return Err(statement_error(op, format!("database {database} exists")));
        }
        Ok(())
    }

    async fn drop_database(
        &self,
        database: &DatabaseName,
        ignore_missing: bool,
    ) -> Result<(), EngineError> {
        let op = Operation::DropDatabase;
        let mut state = self.begin(op)?;
        if !state.databases.remove(database.as_str()) && !ignore_missing {
            return Err(statement_error(op, format!("database {database} does not exist")));
        }
        Ok(())
    }

    async fn grant(
        &self,
        database: &DatabaseName,
        name: &AccountName,
        host: &str,
    ) -> Result<(), EngineError> {
        let op = Operation::Grant;
        let mut state = self.begin(op)?;
        if !state
            .accounts
            .contains_key(&(name.to_string(), host.to_string()))
        {
            return Err(statement_error(op, format!("no account {name}@{host}")));
        }
        state
            .grants
            .insert((database.to_string(), name.to_string(), host.to_string()));
        Ok(())
    }

    async fn revoke(
        &self,
        database: &DatabaseName,
        name: &AccountName,
        host: &str,
    ) -> Result<(), EngineError> {
        let op = Operation::Revoke;
        let mut state = self.begin(op)?;
        let grant = (database.to_string(), name.to_string(), host.to_string());
        if !state.grants.remove(&grant) {
            return Err(statement_error(op, "no such grant defined"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WILDCARD_HOST;

    fn alice() -> AccountName {
        "alice".parse().unwrap()
    }

    fn blog() -> DatabaseName {
        "alice+blog".parse().unwrap()
    }

    #[tokio::test]
    async fn account_lifecycle() {
        let engine = MemoryEngine::new();
        engine
            .create_account(&alice(), WILDCARD_HOST, "one")
            .await
            .unwrap();
        assert_eq!(engine.password_of("alice", "%").as_deref(), Some("one"));

        assert!(engine
            .create_account(&alice(), WILDCARD_HOST, "two")
            .await
            .is_err());

        engine
            .change_password(&alice(), WILDCARD_HOST, "two")
            .await
            .unwrap();
        assert_eq!(engine.password_of("alice", "%").as_deref(), Some("two"));

        engine.drop_account(&alice(), WILDCARD_HOST).await.unwrap();
        assert!(!engine.has_account("alice", "%"));

        // Already gone.
        engine.drop_account(&alice(), WILDCARD_HOST).await.unwrap();
    }

    #[tokio::test]
    async fn database_and_grants() {
        let engine = MemoryEngine::new();
        engine
            .create_account(&alice(), WILDCARD_HOST, "pw")
            .await
            .unwrap();
        engine.create_database(&blog()).await.unwrap();
        assert!(engine.create_database(&blog()).await.is_err());

        engine.grant(&blog(), &alice(), WILDCARD_HOST).await.unwrap();
        assert!(engine.has_grant("alice+blog", "alice", "%"));

        engine.revoke(&blog(), &alice(), WILDCARD_HOST).await.unwrap();
        assert!(engine.revoke(&blog(), &alice(), WILDCARD_HOST).await.is_err());

        engine.drop_database(&blog(), false).await.unwrap();
        assert!(engine.drop_database(&blog(), false).await.is_err());
        engine.drop_database(&blog(), true).await.unwrap();
    }

    #[tokio::test]
    async fn grant_requires_account() {
        let engine = MemoryEngine::new();
        engine.create_database(&blog()).await.unwrap();
        assert!(engine.grant(&blog(), &alice(), WILDCARD_HOST).await.is_err());
    }

    #[tokio::test]
    async fn injected_fault_fails_once_without_side_effects() {
        let engine = MemoryEngine::new();
        engine.fail_next(Operation::CreateDatabase);

        let result = engine.create_database(&blog()).await;
        assert!(matches!(result, Err(EngineError::Rejected { .. })));
        assert!(!engine.has_database("alice+blog"));

        engine.create_database(&blog()).await.unwrap();
        assert!(engine.has_database("alice+blog"));
        assert_eq!(engine.call_count(Operation::CreateDatabase), 2);
    }
}
