//! Database command integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use dbkeeper_core::{DatabaseName, Quota};
use dbkeeper_engine::Operation;
use dbkeeper_store::MetadataStore;
use serde_json::{json, Value};

fn db(name: &str) -> DatabaseName {
    name.parse().unwrap()
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_database_returns_composite_name() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/database/create", json!({ "args": ["blog"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["db_name"], "alice+blog");
    assert_eq!(body["status"], 0);
    assert!(harness.engine.has_database("alice+blog"));
    assert!(harness.engine.has_grant("alice+blog", "alice", "%"));
}

#[tokio::test]
async fn create_database_without_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .command("alice", "/v1/database/create", json!({ "args": ["blog"] }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn create_database_argument_count_is_checked() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    for args in [json!([]), json!(["a", "b"])] {
        let response = harness
            .command("alice", "/v1/database/create", json!({ "args": args }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn create_database_rejects_bad_names() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    for name in ["a+b", "Blog"] {
        let response = harness
            .command("alice", "/v1/database/create", json!({ "args": [name] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    assert!(harness.engine.calls().iter().all(|op| *op != Operation::CreateDatabase));
    assert!(harness.store.get_database(&db("alice+blog")).unwrap().is_none());
}

#[tokio::test]
async fn create_database_at_quota_fails_without_side_effects() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;
    harness
        .store
        .put_quota(
            &"alice".parse().unwrap(),
            &Quota {
                max_databases: 2,
                max_bytes: Quota::default().max_bytes,
            },
        )
        .unwrap();
    harness.create_database("alice", "one").await;
    harness.create_database("alice", "two").await;
    let calls_before = harness.engine.calls().len();

    let response = harness
        .command("alice", "/v1/database/create", json!({ "args": ["three"] }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["status"], 1);
    assert!(body["error"].as_str().unwrap().contains("2 of 2"));
    assert_eq!(harness.engine.calls().len(), calls_before);
    assert!(harness.store.get_database(&db("alice+three")).unwrap().is_none());
}

#[tokio::test]
async fn create_database_over_byte_quota_fails() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;
    harness
        .store
        .record_usage(&"alice".parse().unwrap(), Quota::default().max_bytes + 1)
        .unwrap();

    let response = harness
        .command("alice", "/v1/database/create", json!({ "args": ["blog"] }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("bytes"));
}

#[tokio::test]
async fn create_database_twice_collides_in_metadata() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;
    harness.create_database("alice", "blog").await;

    let response = harness
        .command("alice", "/v1/database/create", json!({ "args": ["blog"] }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["where"], "metadata");
}

#[tokio::test]
async fn engine_failure_is_rolled_back() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;
    harness.engine.fail_next(Operation::CreateDatabase);

    let response = harness
        .command("alice", "/v1/database/create", json!({ "args": ["blog"] }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["status"], 1);
    assert_eq!(body["where"], "sql");
    assert!(harness.store.get_database(&db("alice+blog")).unwrap().is_none());

    // Retrying the same name succeeds.
    harness.create_database("alice", "blog").await;
}

#[tokio::test]
async fn create_database_for_someone_else_is_unauthorized() {
    let harness = TestHarness::new();
    harness.create_account("bob").await;

    let response = harness
        .command(
            "alice",
            "/v1/database/create",
            json!({ "target": "bob", "args": ["blog"] }),
        )
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Drop
// ============================================================================

#[tokio::test]
async fn drop_database_success() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;
    harness.create_database("alice", "blog").await;

    let response = harness
        .command("alice", "/v1/database/drop", json!({ "args": ["blog"] }))
        .await;

    response.assert_status_ok();
    assert!(harness.store.get_database(&db("alice+blog")).unwrap().is_none());
    assert!(!harness.engine.has_database("alice+blog"));
}

#[tokio::test]
async fn drop_missing_database_fails() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/database/drop", json!({ "args": ["blog"] }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn drop_database_succeeds_when_live_cleanup_fails() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;
    harness.create_database("alice", "blog").await;
    harness.engine.fail_next(Operation::DropDatabase);

    let response = harness
        .command("alice", "/v1/database/drop", json!({ "args": ["blog"] }))
        .await;

    response.assert_status_ok();
    assert!(harness.store.get_database(&db("alice+blog")).unwrap().is_none());
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn list_databases_excludes_disabled() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;
    harness.create_database("alice", "blog").await;
    harness.create_database("alice", "old").await;
    harness
        .store
        .set_database_enabled(&db("alice+old"), false)
        .unwrap();
    harness
        .store
        .record_database_size(&db("alice+blog"), 2048)
        .unwrap();

    let response = harness
        .command("alice", "/v1/database/list", json!({}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["quota"], Quota::default().max_bytes);
    assert_eq!(
        body["databases"],
        json!([{ "name": "alice+blog", "size": 2048 }])
    );
}

#[tokio::test]
async fn list_databases_takes_no_arguments() {
    let harness = TestHarness::new();
    harness.create_account("alice").await;

    let response = harness
        .command("alice", "/v1/database/list", json!({ "args": ["x"] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
