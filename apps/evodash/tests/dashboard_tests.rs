//! Integration tests for the evodash dashboard.
//!
//! Uses axum-test to exercise the router without binding a real port.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use axum_test::TestServer;
use common::SourceDb;
use evodash::cli::run_pipeline;
use evodash::dashboard::{AppState, HealthResponse, create_router};
use evodash_core::{FamilyTable, Report};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn create_test_server() -> TestServer {
    let db = SourceDb::new();
    let run = run_pipeline(&db.config()).unwrap();
    let state = AppState::new(run.report, "pokemon_dw.db");
    TestServer::new(create_router(state)).unwrap()
}

fn create_empty_test_server() -> TestServer {
    let report = Report::build(&FamilyTable::default(), &[]);
    let state = AppState::new(report, "empty.db");
    TestServer::new(create_router(state)).unwrap()
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// DASHBOARD PAGE
// =============================================================================

#[tokio::test]
async fn test_index_renders_all_views() {
    let server = create_test_server();

    let response = server.get("/").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Source: pokemon_dw.db"));
    assert!(html.contains("+170 pts"));
    assert!(html.contains("+112 pts"));
    assert!(html.contains("class=\"bar\""));
    assert!(html.contains("Gyarados (family 7): +340 pts"));
    assert!(html.contains("use-item → Stage 3: 1"));
    assert!(html.contains("Raw family table (8 rows)"));
}

#[tokio::test]
async fn test_index_on_empty_report() {
    let server = create_empty_test_server();

    let response = server.get("/").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("n/a"));
    assert!(html.contains("no data"));
    assert!(!html.contains("3. Path of evolution"));
    assert!(html.contains("Raw family table (0 rows)"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = create_test_server();
    let response = server.get("/report.json").await;
    response.assert_status_not_found();
}
