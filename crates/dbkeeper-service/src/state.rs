//! Application state.

use std::sync::Arc;
use std::time::Duration;

use dbkeeper_core::{AccessPolicy, DatabaseQuota, Quota, DEFAULT_PASSWORD_LENGTH};
use dbkeeper_engine::{EngineError, LiveEngine, MemoryEngine, MySqlEngine};
use dbkeeper_store::MetadataStore;

use crate::config::{nonzero_or, ServiceConfig};
use crate::directory::{DirectoryResolver, HttpDirectory, NullDirectory};
use crate::provision::{ProvisionSettings, Provisioner};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The provisioning coordinator.
    pub provisioner: Provisioner,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create state from explicit collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn MetadataStore>,
        engine: Arc<dyn LiveEngine>,
        directory: Arc<dyn DirectoryResolver>,
        config: ServiceConfig,
    ) -> Self {
        let policy = AccessPolicy::new(config.privileged_targets.iter().cloned());
        let settings = ProvisionSettings {
            grant_host: config.grant_host.clone(),
            default_quota: Quota {
                max_databases: config.default_max_databases,
                max_bytes: config.default_max_bytes,
            },
            default_database_quota: DatabaseQuota {
                max_bytes: config.default_max_bytes,
            },
            password_length: nonzero_or(
                "password_length",
                Some(config.password_length),
                DEFAULT_PASSWORD_LENGTH,
            ),
        };

        if config.auth_secret.is_none() {
            tracing::warn!("AUTH_SECRET not configured - all bearer tokens will be rejected");
        }

        Self {
            provisioner: Provisioner::new(store, engine, directory, policy, settings),
            config,
        }
    }

    /// Create state, building the live engine and directory from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine URL is malformed.
    pub fn from_config(
        store: Arc<dyn MetadataStore>,
        config: ServiceConfig,
    ) -> Result<Self, EngineError> {
        let engine: Arc<dyn LiveEngine> = match config.engine_config() {
            Some(engine_config) => {
                tracing::info!("MySQL live engine enabled");
                Arc::new(MySqlEngine::connect(&engine_config)?)
            }
            None => {
                tracing::warn!(
                    "ENGINE_URL not configured - using in-process engine, nothing is provisioned for real"
                );
                Arc::new(MemoryEngine::new())
            }
        };

        let directory: Arc<dyn DirectoryResolver> = match &config.directory_url {
            Some(url) => {
                tracing::info!(directory_url = %url, "Directory lookups enabled");
                Arc::new(HttpDirectory::new(
                    url,
                    Duration::from_secs(config.directory_timeout_seconds),
                ))
            }
            None => {
                tracing::warn!("Directory not configured - new accounts get empty profiles");
                Arc::new(NullDirectory)
            }
        };

        Ok(Self::new(store, engine, directory, config))
    }
}
