//! Integration tests for the state-sync HTTP API.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum_test::TestServer;
use konband::api::{ApiContext, router};
use konband::cli::{Backend, load_or_create_session};
use konband_core::{Policy, Report, Role, Session, Snapshot};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Spin up a test server over a fresh session persisted at a temp path.
fn test_server(temp: &TempDir) -> (TestServer, PathBuf) {
    let db_path = temp.path().join("api.db");
    let ctx = ApiContext::new(Session::new(), db_path.clone(), Backend::File);
    let server = TestServer::new(router(ctx)).expect("Failed to start test server");
    (server, db_path)
}

/// A snapshot with one member over-assigned across two bands.
fn conflicted_snapshot() -> Snapshot {
    let mut session = Session::new();
    let member = session.add_member(
        "Aki",
        BTreeMap::from([(Role::Vocal, 5), (Role::Bass, 3)]),
        Some(Role::Vocal),
    );
    let first = session.state().new_bands[0].id;
    let second = session.state().new_bands[1].id;
    session.fill_slot(first, Role::Vocal, member).unwrap();
    session.fill_slot(second, Role::Bass, member).unwrap();
    session.snapshot()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let temp = create_temp_dir();
    let (server, _) = test_server(&temp);

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn state_round_trips_through_the_api() {
    let temp = create_temp_dir();
    let (server, _) = test_server(&temp);

    let snapshot = conflicted_snapshot();
    let response = server.put("/state").json(&snapshot).await;
    response.assert_status_ok();

    let pulled = server.get("/state").await.json::<Snapshot>();
    assert_eq!(pulled.members, snapshot.members);
    assert_eq!(pulled.bands, snapshot.bands);
    assert_eq!(pulled.settings, snapshot.settings);
}

#[tokio::test]
async fn put_state_persists_to_disk() {
    let temp = create_temp_dir();
    let (server, db_path) = test_server(&temp);

    let snapshot = conflicted_snapshot();
    server.put("/state").json(&snapshot).await.assert_status_ok();

    let loaded = load_or_create_session(&db_path, Backend::File).unwrap();
    assert_eq!(loaded.state().members.len(), 1);
}

#[tokio::test]
async fn put_state_returns_the_fresh_analysis() {
    let temp = create_temp_dir();
    let (server, _) = test_server(&temp);

    let response = server.put("/state").json(&conflicted_snapshot()).await;
    response.assert_status_ok();

    // Default policy: vocal 5 passes, bass 3 is below the level floor.
    let report = response.json::<Report>();
    assert_eq!(report.conflicts.len(), 1);
}

#[tokio::test]
async fn malformed_snapshot_is_rejected_without_touching_state() {
    let temp = create_temp_dir();
    let (server, _) = test_server(&temp);

    let response = server
        .put("/state")
        .json(&serde_json::json!({"bands": "not a list"}))
        .await;
    assert!(response.status_code().is_client_error());

    let pulled = server.get("/state").await.json::<Snapshot>();
    assert!(pulled.members.is_empty());
    assert_eq!(pulled.settings, Policy::default());
}

#[tokio::test]
async fn analysis_endpoint_reflects_replacements() {
    let temp = create_temp_dir();
    let (server, _) = test_server(&temp);

    let clean = server.get("/analysis").await.json::<Report>();
    assert!(clean.is_clean());

    server
        .put("/state")
        .json(&conflicted_snapshot())
        .await
        .assert_status_ok();

    let report = server.get("/analysis").await.json::<Report>();
    assert!(!report.is_clean());
}
