//! Service configuration.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use dbkeeper_core::{
    DEFAULT_MAX_BYTES, DEFAULT_MAX_DATABASES, DEFAULT_PASSWORD_LENGTH, DEFAULT_PRIVILEGED_TARGETS,
};
use dbkeeper_engine::{EngineConfig, WILDCARD_HOST};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/dbkeeper").
    pub data_dir: String,

    /// Live engine URL. Without one the service runs against an in-process engine.
    pub engine_url: Option<String>,

    /// Live engine pool size.
    pub engine_max_connections: u32,

    /// Live engine per-call timeout in seconds.
    pub engine_timeout_seconds: u64,

    /// Host pattern for accounts, grants, and password changes (default: "%").
    pub grant_host: String,

    /// HS256 secret for bearer tokens. Without one every token is rejected.
    pub auth_secret: Option<String>,

    /// Expected JWT audience (default: "dbkeeper").
    pub auth_audience: String,

    /// Targets any actor may act on.
    pub privileged_targets: Vec<String>,

    /// Directory service base URL (optional).
    pub directory_url: Option<String>,

    /// Directory lookup timeout in seconds.
    pub directory_timeout_seconds: u64,

    /// Default maximum enabled databases per account.
    pub default_max_databases: u32,

    /// Default maximum bytes per account.
    pub default_max_bytes: u64,

    /// Length of generated credentials.
    pub password_length: usize,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Engine secrets file structure.
#[derive(Debug, Deserialize)]
struct EngineSecrets {
    url: String,
}

/// Auth secrets file structure.
#[derive(Debug, Deserialize)]
struct AuthSecrets {
    secret: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            engine_url: load_engine_url(),
            engine_max_connections: env_parse("ENGINE_MAX_CONNECTIONS")
                .unwrap_or(defaults.engine_max_connections),
            engine_timeout_seconds: env_parse("ENGINE_TIMEOUT_SECONDS")
                .unwrap_or(defaults.engine_timeout_seconds),
            grant_host: std::env::var("GRANT_HOST").unwrap_or(defaults.grant_host),
            auth_secret: load_auth_secret(),
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or(defaults.auth_audience),
            privileged_targets: std::env::var("PRIVILEGED_TARGETS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.privileged_targets),
            directory_url: std::env::var("DIRECTORY_URL").ok(),
            directory_timeout_seconds: env_parse("DIRECTORY_TIMEOUT_SECONDS")
                .unwrap_or(defaults.directory_timeout_seconds),
            default_max_databases: env_parse("DEFAULT_MAX_DATABASES")
                .unwrap_or(defaults.default_max_databases),
            default_max_bytes: env_parse("DEFAULT_MAX_BYTES").unwrap_or(defaults.default_max_bytes),
            password_length: nonzero_or(
                "PASSWORD_LENGTH",
                env_parse("PASSWORD_LENGTH"),
                defaults.password_length,
            ),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Live engine configuration, if an engine URL is set.
    #[must_use]
    pub fn engine_config(&self) -> Option<EngineConfig> {
        self.engine_url.as_ref().map(|url| {
            EngineConfig::new(url.clone())
                .with_max_connections(self.engine_max_connections)
                .with_timeout_seconds(self.engine_timeout_seconds)
        })
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// `value`, unless it is missing or zero.
pub(crate) fn nonzero_or(key: &str, value: Option<usize>, default: usize) -> usize {
    match value {
        Some(0) => {
            tracing::warn!(key = %key, default, "Zero is not a valid value - using default");
            default
        }
        Some(n) => n,
        None => default,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

const SECRET_DIRS: [&str; 3] = [".secrets", "dbkeeper/.secrets", "../.secrets"];

/// Load the live engine URL from file or environment.
fn load_engine_url() -> Option<String> {
    for dir in SECRET_DIRS {
        let path = format!("{dir}/engine.json");
        if let Ok(secrets) = load_secrets_file::<EngineSecrets>(&path) {
            tracing::info!(path = %path, "Loaded engine secrets from file");
            return Some(secrets.url);
        }
    }

    tracing::debug!("Engine secrets file not found, using environment variables");
    std::env::var("ENGINE_URL").ok()
}

/// Load the token secret from file or environment.
fn load_auth_secret() -> Option<String> {
    for dir in SECRET_DIRS {
        let path = format!("{dir}/auth.json");
        if let Ok(secrets) = load_secrets_file::<AuthSecrets>(&path) {
            tracing::info!(path = %path, "Loaded auth secrets from file");
            return Some(secrets.secret);
        }
    }

    tracing::debug!("Auth secrets file not found, using environment variables");
    std::env::var("AUTH_SECRET").ok()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/dbkeeper".into(),
            engine_url: None,
            engine_max_connections: 4,
            engine_timeout_seconds: 10,
            grant_host: WILDCARD_HOST.into(),
            auth_secret: None,
            auth_audience: "dbkeeper".into(),
            privileged_targets: DEFAULT_PRIVILEGED_TARGETS
                .iter()
                .map(ToString::to_string)
                .collect(),
            directory_url: None,
            directory_timeout_seconds: 3,
            default_max_databases: DEFAULT_MAX_DATABASES,
            default_max_bytes: DEFAULT_MAX_BYTES,
            password_length: DEFAULT_PASSWORD_LENGTH,
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
