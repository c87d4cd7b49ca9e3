//! The provisioning coordinator.
//!
//! Every command that touches an account runs the authorization gate first,
//! then mutates the metadata store, then the live engine. The metadata store
//! is the source of truth for existence. The only failure that is rolled back
//! is a live-engine failure while creating a database; every other live-engine
//! failure after a metadata commit is logged at `warn` and left for manual
//! reconciliation.
//!
//! Each metadata-then-engine sequence runs on its own task, so a request that is
//! dropped mid-flight (timeout, client disconnect) still finishes the sequence,
//! including the rollback of a failed database creation.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use dbkeeper_core::{
    generate_password, AccessPolicy, Account, AccountName, Database, DatabaseName, DatabaseQuota,
    LocalDbName, Profile, ProfileUpdate, Quota, UsageStat, DEFAULT_PASSWORD_LENGTH,
};
use dbkeeper_engine::{LiveEngine, WILDCARD_HOST};
use dbkeeper_store::{MetadataStore, StoreError};

use crate::directory::DirectoryResolver;
use crate::error::{CommandError, Location, QuotaDimension};

/// Result type for commands.
pub type CommandResult<T> = Result<T, CommandError>;

// ============================================================================
// Results
// ============================================================================

/// A credential returned exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResult {
    /// The generated credential.
    pub password: String,
}

/// An empty successful result.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Done {}

/// Result of `account whoami`.
#[derive(Debug, Clone, Serialize)]
pub struct WhoAmI {
    /// The authenticated principal.
    pub principal: String,
    /// The principal's account name.
    pub username: String,
    /// Whether the account has been provisioned.
    pub exists: bool,
}

/// Result of `account is-auth`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IsAuth {
    /// Whether the actor may act on the target.
    pub result: bool,
}

/// Result of `database create`.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseCreated {
    /// The composite database name.
    pub db_name: String,
}

/// One entry of a database listing.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseEntry {
    /// Composite database name.
    pub name: String,
    /// Current size in bytes.
    pub size: u64,
}

/// Result of `database list`.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseListing {
    /// The account's byte ceiling.
    pub quota: u64,
    /// Enabled databases.
    pub databases: Vec<DatabaseEntry>,
}

// ============================================================================
// Settings
// ============================================================================

/// Tunables for the coordinator.
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    /// Host pattern used for account creation, grants, and password changes.
    pub grant_host: String,
    /// Quota given to new accounts.
    pub default_quota: Quota,
    /// Per-database quota given to new databases.
    pub default_database_quota: DatabaseQuota,
    /// Length of generated credentials.
    pub password_length: usize,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            grant_host: WILDCARD_HOST.to_string(),
            default_quota: Quota::default(),
            default_database_quota: DatabaseQuota::default(),
            password_length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Coordinates the metadata store and the live engine.
#[derive(Clone)]
pub struct Provisioner {
    store: Arc<dyn MetadataStore>,
    engine: Arc<dyn LiveEngine>,
    directory: Arc<dyn DirectoryResolver>,
    policy: AccessPolicy,
    settings: ProvisionSettings,
}

impl Provisioner {
    /// Create a coordinator.
    #[must_use]
    pub fn new(
        store: Arc<dyn MetadataStore>,
        engine: Arc<dyn LiveEngine>,
        directory: Arc<dyn DirectoryResolver>,
        policy: AccessPolicy,
        settings: ProvisionSettings,
    ) -> Self {
        Self {
            store,
            engine,
            directory,
            policy,
            settings,
        }
    }

    /// The metadata store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    /// The coordinator's settings.
    #[must_use]
    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    /// The authorization gate. Runs before any store is touched.
    fn authorize(&self, actor: &str, target: &str) -> CommandResult<()> {
        if self.policy.authorize(actor, target) {
            Ok(())
        } else {
            tracing::info!(actor = %actor, target = %target, "Command denied");
            Err(CommandError::Unauthorized {
                actor: actor.to_string(),
                target: target.to_string(),
            })
        }
    }

    fn require_account(&self, name: &AccountName) -> CommandResult<Account> {
        self.store
            .get_account(name)?
            .ok_or_else(|| CommandError::NotFound(format!("account not found: {name}")))
    }

    fn host(&self) -> &str {
        &self.settings.grant_host
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Create the target's account and return its generated credential.
    ///
    /// A live-engine failure after the metadata commit is not rolled back.
    pub async fn account_create(&self, actor: &str, target: &str) -> CommandResult<PasswordResult> {
        self.authorize(actor, target)?;
        let name: AccountName = target.parse()?;

        if self.store.get_account(&name)?.is_some() {
            return Err(already_exists_in_metadata("account", &name));
        }

        let entry = self.directory.resolve(&name).await;
        let password = generate_password(self.settings.password_length);
        let account = Account::new(name.clone(), entry.display_name, entry.contact);

        let this = self.clone();
        run_to_completion(async move { this.commit_account(account, password).await }).await
    }

    async fn commit_account(
        &self,
        account: Account,
        password: String,
    ) -> CommandResult<PasswordResult> {
        let name = account.name.clone();

        // The lookup in `account_create` is advisory; a racing creator is caught here.
        self.store
            .create_account(&account, &self.settings.default_quota, &UsageStat::empty())?;
        tracing::info!(account = %name, "Account created");

        if let Err(e) = self
            .engine
            .create_account(&name, self.host(), &password)
            .await
        {
            tracing::warn!(
                account = %name,
                error = %e,
                "Live account creation failed after metadata commit - needs reconciliation"
            );
        }

        Ok(PasswordResult { password })
    }

    /// Delete the target's account.
    pub async fn account_delete(&self, actor: &str, target: &str) -> CommandResult<Done> {
        self.authorize(actor, target)?;
        let name: AccountName = target.parse()?;
        self.require_account(&name)?;

        let this = self.clone();
        run_to_completion(async move { this.remove_account(name).await }).await
    }

    async fn remove_account(&self, name: AccountName) -> CommandResult<Done> {
        self.store.delete_account(&name)?;
        tracing::info!(account = %name, "Account deleted");

        if let Err(e) = self.engine.drop_account(&name, self.host()).await {
            tracing::warn!(
                account = %name,
                error = %e,
                "Live account drop failed after metadata commit - needs reconciliation"
            );
        }

        Ok(Done {})
    }

    /// Describe the caller. Not gated: it only reveals the caller's own state.
    pub fn whoami(&self, principal: &str, username: &str) -> CommandResult<WhoAmI> {
        let exists = match username.parse::<AccountName>() {
            Ok(name) => self.store.get_account(&name)?.is_some(),
            Err(_) => false,
        };

        Ok(WhoAmI {
            principal: principal.to_string(),
            username: username.to_string(),
            exists,
        })
    }

    /// Report whether the actor may act on the target. Not gated.
    #[must_use]
    pub fn is_auth(&self, actor: &str, target: &str) -> IsAuth {
        IsAuth {
            result: self.policy.authorize(actor, target),
        }
    }

    // ========================================================================
    // Database
    // ========================================================================

    /// Create a database for the target.
    ///
    /// Quotas are checked before anything is written. If the live engine
    /// refuses the schema, the metadata rows are removed again.
    pub async fn database_create(
        &self,
        actor: &str,
        target: &str,
        args: &[String],
    ) -> CommandResult<DatabaseCreated> {
        self.authorize(actor, target)?;
        let [local] = args else {
            return Err(CommandError::arity("database create", 1, args.len()));
        };
        let owner: AccountName = target.parse()?;
        self.require_account(&owner)?;
        let local: LocalDbName = local.parse()?;

        self.check_quota(&owner)?;

        let name = DatabaseName::compose(&owner, &local)?;
        let this = self.clone();
        run_to_completion(async move { this.commit_database(owner, name).await }).await
    }

    async fn commit_database(
        &self,
        owner: AccountName,
        name: DatabaseName,
    ) -> CommandResult<DatabaseCreated> {
        let database = Database::new(name.clone(), owner.clone());
        self.store
            .create_database(&database, &self.settings.default_database_quota)?;

        if let Err(e) = self.engine.create_database(&name).await {
            tracing::warn!(database = %name, error = %e, "Live database creation failed - rolling back");
            self.store.delete_database(&name)?;
            return Err(CommandError::AlreadyExists {
                message: format!("database {name} could not be created: {e}"),
                location: Location::Sql,
            });
        }

        if let Err(e) = self.engine.grant(&name, &owner, self.host()).await {
            tracing::warn!(
                database = %name,
                account = %owner,
                error = %e,
                "Grant failed after database creation - needs reconciliation"
            );
        }

        tracing::info!(database = %name, "Database created");
        Ok(DatabaseCreated {
            db_name: name.to_string(),
        })
    }

    fn check_quota(&self, owner: &AccountName) -> CommandResult<()> {
        let quota = self
            .store
            .get_quota(owner)?
            .ok_or_else(|| CommandError::Internal(format!("quota missing for account {owner}")))?;

        let count = self.store.count_enabled_databases(owner)? as u64;
        if count >= u64::from(quota.max_databases) {
            return Err(CommandError::QuotaExceeded {
                dimension: QuotaDimension::Count,
                current: count,
                limit: u64::from(quota.max_databases),
            });
        }

        let usage = self.store.get_usage(owner)?.map_or(0, |u| u.bytes);
        if usage > quota.max_bytes {
            return Err(CommandError::QuotaExceeded {
                dimension: QuotaDimension::Bytes,
                current: usage,
                limit: quota.max_bytes,
            });
        }

        Ok(())
    }

    /// Drop one of the target's databases.
    ///
    /// Live-side cleanup is best-effort; the metadata deletion decides the outcome.
    pub async fn database_drop(
        &self,
        actor: &str,
        target: &str,
        args: &[String],
    ) -> CommandResult<Done> {
        self.authorize(actor, target)?;
        let [local] = args else {
            return Err(CommandError::arity("database drop", 1, args.len()));
        };
        let owner: AccountName = target.parse()?;
        let local: LocalDbName = local.parse()?;
        let name = DatabaseName::compose(&owner, &local)?;

        let this = self.clone();
        run_to_completion(async move { this.remove_database(owner, name).await }).await
    }

    async fn remove_database(&self, owner: AccountName, name: DatabaseName) -> CommandResult<Done> {
        match self.store.delete_database(&name) {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(CommandError::NotFound(format!("database not found: {name}")));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(database = %name, "Database dropped");

        if let Err(e) = self.engine.drop_database(&name, true).await {
            tracing::warn!(database = %name, error = %e, "Live database drop failed - needs reconciliation");
        }
        if let Err(e) = self.engine.revoke(&name, &owner, self.host()).await {
            tracing::debug!(database = %name, error = %e, "Revoke after drop failed");
        }

        Ok(Done {})
    }

    /// List the target's enabled databases and byte ceiling.
    pub fn database_list(
        &self,
        actor: &str,
        target: &str,
        args: &[String],
    ) -> CommandResult<DatabaseListing> {
        self.authorize(actor, target)?;
        if !args.is_empty() {
            return Err(CommandError::arity("database list", 0, args.len()));
        }
        let owner: AccountName = target.parse()?;

        let quota = self
            .store
            .get_quota(&owner)?
            .ok_or_else(|| CommandError::NotFound(format!("account not found: {owner}")))?;

        let databases = self
            .store
            .list_databases_by_owner(&owner)?
            .into_iter()
            .filter(|db| db.enabled)
            .map(|db| DatabaseEntry {
                name: db.name.to_string(),
                size: db.size_bytes,
            })
            .collect();

        Ok(DatabaseListing {
            quota: quota.max_bytes,
            databases,
        })
    }

    // ========================================================================
    // Password
    // ========================================================================

    /// Set the target's credential.
    pub async fn password_set(
        &self,
        actor: &str,
        target: &str,
        args: &[String],
    ) -> CommandResult<Done> {
        self.authorize(actor, target)?;
        let [password] = args else {
            return Err(CommandError::arity("password set", 1, args.len()));
        };
        if password.is_empty() {
            return Err(CommandError::InvalidArguments(
                "password must not be empty".into(),
            ));
        }
        let name: AccountName = target.parse()?;

        let mut account = self.require_account(&name)?;
        account.touch_credential();

        let this = self.clone();
        let password = password.clone();
        run_to_completion(async move { this.commit_credential(account, password).await }).await
    }

    async fn commit_credential(&self, account: Account, password: String) -> CommandResult<Done> {
        let name = &account.name;
        self.store.update_account(&account)?;
        tracing::info!(account = %name, "Credential updated");

        if let Err(e) = self
            .engine
            .change_password(name, self.host(), &password)
            .await
        {
            tracing::warn!(
                account = %name,
                error = %e,
                "Live password change failed after metadata commit - needs reconciliation"
            );
        }

        Ok(Done {})
    }

    /// Generate a fresh credential, set it, and return it.
    ///
    /// Gated through [`Provisioner::password_set`].
    pub async fn password_generate(
        &self,
        actor: &str,
        target: &str,
    ) -> CommandResult<PasswordResult> {
        let password = generate_password(self.settings.password_length);
        self.password_set(actor, target, std::slice::from_ref(&password))
            .await?;
        Ok(PasswordResult { password })
    }

    // ========================================================================
    // Profile
    // ========================================================================

    /// Get the target's profile.
    pub fn profile_get(&self, actor: &str, target: &str) -> CommandResult<Profile> {
        self.authorize(actor, target)?;
        let name: AccountName = target.parse()?;
        Ok(self.require_account(&name)?.profile())
    }

    /// Update the target's profile from a JSON object payload.
    pub fn profile_set(&self, actor: &str, target: &str, args: &[String]) -> CommandResult<Done> {
        self.authorize(actor, target)?;
        let [payload] = args else {
            return Err(CommandError::arity("profile set", 1, args.len()));
        };
        let update = ProfileUpdate::parse(payload)?;
        let name: AccountName = target.parse()?;

        let mut account = self.require_account(&name)?;
        account.apply_profile(update);
        self.store.update_account(&account)?;

        Ok(Done {})
    }
}

/// Run `work` on its own task. Dropping the returned future leaves the task running.
async fn run_to_completion<T, F>(work: F) -> CommandResult<T>
where
    F: Future<Output = CommandResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| CommandError::Internal(format!("command task failed: {e}")))?
}

fn already_exists_in_metadata(entity: &str, name: &impl std::fmt::Display) -> CommandError {
    CommandError::AlreadyExists {
        message: format!("{entity} already exists: {name}"),
        location: Location::Metadata,
    }
}
