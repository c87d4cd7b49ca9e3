//! Account command integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use dbkeeper_store::MetadataStore;
use serde_json::{json, Value};

// ============================================================================
// Account Creation
// ============================================================================

#[tokio::test]
async fn create_account_returns_password() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice@EXAMPLE.ORG", "/v1/account/create", json!({}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], 0);
    assert_eq!(body["password"].as_str().unwrap().len(), 10);
    assert!(harness.engine.has_account("alice", "%"));
}

#[tokio::test]
async fn create_account_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/account/create")
        .json(&json!({}))
        .await;

    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["status"], 1);
}

#[tokio::test]
async fn create_account_with_bad_token_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/account/create")
        .add_header("authorization", "Bearer not-a-jwt".to_string())
        .json(&json!({}))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn create_account_for_someone_else_is_unauthorized() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice", "/v1/account/create", json!({ "target": "bob" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["status"], 1);
    assert!(harness
        .store
        .get_account(&"bob".parse().unwrap())
        .unwrap()
        .is_none());
    assert!(harness.engine.calls().is_empty());
}

#[tokio::test]
async fn create_account_duplicate_fails() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/account/create", json!({}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["status"], 1);
    assert_eq!(body["where"], "metadata");
}

#[tokio::test]
async fn create_account_rejects_arguments() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice", "/v1/account/create", json!({ "args": ["x"] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_account_uses_directory_profile() {
    let harness = TestHarness::new();
    harness.create_account("bob").await;

    let response = harness.command("bob", "/v1/profile/get", json!({})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["fullname"], "Bob B");
    assert_eq!(body["email"], "bob@x.edu");
}

// ============================================================================
// Delete Account
// ============================================================================

#[tokio::test]
async fn delete_account_success() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/account/delete", json!({}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": 0 }));
    assert!(!harness.engine.has_account("alice", "%"));
}

#[tokio::test]
async fn delete_nonexistent_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice", "/v1/account/delete", json!({}))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn delete_other_account_does_not_reveal_existence() {
    let harness = TestHarness::new();
    harness.create_account("bob").await;

    let existing = harness
        .command("alice", "/v1/account/delete", json!({ "target": "bob" }))
        .await;
    let missing = harness
        .command("alice", "/v1/account/delete", json!({ "target": "carol" }))
        .await;

    existing.assert_status(StatusCode::FORBIDDEN);
    missing.assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Identity
// ============================================================================

#[tokio::test]
async fn whoami_reports_principal_and_existence() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice@EXAMPLE.ORG", "/v1/account/whoami", json!({}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["principal"], "alice@EXAMPLE.ORG");
    assert_eq!(body["username"], "alice");
    assert_eq!(body["exists"], false);

    harness.create_account("alice").await;

    let response = harness
        .command("alice@EXAMPLE.ORG", "/v1/account/whoami", json!({}))
        .await;
    let body: Value = response.json();
    assert_eq!(body["exists"], true);
}

#[tokio::test]
async fn is_auth_reports_gate_decision() {
    let harness = TestHarness::new();

    let cases = [("alice", true), ("sql", true), ("bob", false)];
    for (target, expected) in cases {
        let response = harness
            .command("alice", "/v1/account/is-auth", json!({ "target": target }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["result"], expected, "target {target}");
        assert_eq!(body["status"], 0);
    }
}

#[tokio::test]
async fn malformed_body_is_invalid_arguments() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice", "/v1/account/whoami", json!({ "args": "nope" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], 1);
}
