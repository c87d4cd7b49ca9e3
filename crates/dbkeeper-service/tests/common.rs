//! Common test utilities for dbkeeper integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::{TestResponse, TestServer};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;

use dbkeeper_engine::MemoryEngine;
use dbkeeper_service::{create_router, AppState, DirectoryEntry, ServiceConfig, StaticDirectory};
use dbkeeper_store::RocksStore;

/// Secret the harness signs tokens with.
pub const AUTH_SECRET: &str = "test-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The metadata store behind the server.
    pub store: Arc<RocksStore>,
    /// The live engine behind the server.
    pub engine: Arc<MemoryEngine>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));
        let engine = Arc::new(MemoryEngine::new());
        let directory = StaticDirectory::new()
            .with_entry("bob", DirectoryEntry::new("Bob B", "bob@x.edu"));

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_secret: Some(AUTH_SECRET.into()),
            ..ServiceConfig::default()
        };

        let state = AppState::new(store.clone(), engine.clone(), Arc::new(directory), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            engine,
            _temp_dir: temp_dir,
        }
    }

    /// Get the authorization header for `principal`.
    pub fn auth_header(principal: &str) -> String {
        let claims = json!({
            "sub": principal,
            "aud": "dbkeeper",
            "iat": chrono::Utc::now().timestamp(),
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(AUTH_SECRET.as_bytes()),
        )
        .expect("Failed to sign token");

        format!("Bearer {token}")
    }

    /// Run a command as `principal`.
    pub async fn command(&self, principal: &str, path: &str, body: Value) -> TestResponse {
        self.server
            .post(path)
            .add_header("authorization", Self::auth_header(principal))
            .json(&body)
            .await
    }

    /// Create `name`'s own account and return the generated password.
    pub async fn create_account(&self, name: &str) -> String {
        let response = self.command(name, "/v1/account/create", json!({})).await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["password"]
            .as_str()
            .expect("password missing")
            .to_string()
    }

    /// Create a database owned by `owner`.
    pub async fn create_database(&self, owner: &str, local: &str) {
        self.command(owner, "/v1/database/create", json!({ "args": [local] }))
            .await
            .assert_status_ok();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
