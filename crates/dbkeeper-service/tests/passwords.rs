//! Password command integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use dbkeeper_engine::Operation;
use dbkeeper_store::MetadataStore;
use serde_json::{json, Value};

#[tokio::test]
async fn set_password_updates_engine_only() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/password/set", json!({ "args": ["s3cret!"] }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        harness.engine.password_of("alice", "%").as_deref(),
        Some("s3cret!")
    );
    let account = harness
        .store
        .get_account(&"alice".parse().unwrap())
        .unwrap()
        .unwrap();
    let record = serde_json::to_string(&account).unwrap();
    assert!(!record.contains("s3cret!"));
    assert!(account.credential_updated_at >= account.created_at);
}

#[tokio::test]
async fn set_password_requires_one_argument() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/password/set", json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_password_for_someone_else_is_unauthorized() {
    let harness = TestHarness::new();
    harness.create_account("bob").await;

    let response = harness
        .command(
            "alice",
            "/v1/password/set",
            json!({ "target": "bob", "args": ["x"] }),
        )
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(harness.engine.call_count(Operation::ChangePassword), 0);
}

#[tokio::test]
async fn generate_password_returns_new_credential() {
    let harness = TestHarness::new();
    let original = harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/password/generate", json!({}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let generated = body["password"].as_str().unwrap();
    assert_eq!(generated.len(), 10);
    assert_ne!(generated, original);
    assert_eq!(
        harness.engine.password_of("alice", "%").as_deref(),
        Some(generated)
    );
}

#[tokio::test]
async fn generate_password_for_missing_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice", "/v1/password/generate", json!({}))
        .await;

    response.assert_status_not_found();
}
