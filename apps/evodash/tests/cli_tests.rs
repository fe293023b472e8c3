//! Integration tests for the evodash CLI commands.
//!
//! Each test builds a throwaway SQLite source and drives the command layer.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::SourceDb;
use evodash::cli::{StatusSummary, cmd_report, cmd_status, render_report, run_pipeline};
use evodash::config::Config;
use evodash_core::{EvodashError, Stage};
use std::path::PathBuf;

// =============================================================================
// PIPELINE
// =============================================================================

#[test]
fn test_pipeline_builds_report() {
    let db = SourceDb::new();
    let run = run_pipeline(&db.config()).unwrap();

    // Missingno has no entity row.
    assert_eq!(run.transformation.table.len(), 8);
    assert_eq!(run.transformation.dropped.len(), 1);

    // Stage 2: Charmeleon +96, Gyarados +340, Gloom +75
    let first = &run.report.summary.first_evolution;
    assert_eq!(first.sum, 511);
    assert_eq!(first.samples, 3);
    assert_eq!(first.rounded(), Some(170));

    // Stage 3: Charizard +129, Vileplume +95
    let second = &run.report.summary.second_evolution;
    assert_eq!(second.sum, 224);
    assert_eq!(second.rounded(), Some(112));

    let charizard = run.transformation.table.find("Charizard").unwrap();
    assert_eq!(charizard.stage, Stage::Third);
}

#[test]
fn test_pipeline_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.apply_flags(Some(dir.path().join("absent.db")), None, None);

    let err = run_pipeline(&config).unwrap_err();
    assert!(err.is_data_source_error());
    assert!(!dir.path().join("absent.db").exists());
}

#[test]
fn test_pipeline_missing_relation() {
    let db = SourceDb::new();
    let mut config = db.config();
    config.source.evolutions = "evolutions".to_string();

    match run_pipeline(&config) {
        Err(EvodashError::MissingRelation(name)) => assert_eq!(name, "evolutions"),
        other => panic!("expected MissingRelation, got {other:?}"),
    }
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

#[test]
fn test_report_text() {
    let db = SourceDb::new();
    let run = run_pipeline(&db.config()).unwrap();
    let text = render_report(&run.report, &db.path, Some(3));

    assert!(text.contains("+170 pts"));
    assert!(text.contains("+112 pts"));
    assert!(text.contains("n=3  min 75  q1 85.5  median 96  q3 218  max 340"));
    assert!(text.contains("use-item"));
    assert!(text.contains("... 5 more rows"));
}

#[test]
fn test_cmd_report_both_modes() {
    let db = SourceDb::new();
    assert!(cmd_report(&db.config(), false, None).is_ok());
    assert!(cmd_report(&db.config(), true, Some(2)).is_ok());
}

#[test]
fn test_report_json_shape() {
    let db = SourceDb::new();
    let run = run_pipeline(&db.config()).unwrap();
    let json = serde_json::to_value(&run.report).unwrap();

    assert_eq!(json["summary"]["first_evolution"]["sum"], 511);
    assert_eq!(json["table"][0]["name"], "Charmander");
    assert_eq!(json["table"][0]["stage"], 1);
    assert!(json["table"][0]["delta"].is_null());
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

#[test]
fn test_status_summary() {
    let db = SourceDb::new();
    let run = run_pipeline(&db.config()).unwrap();
    let status = StatusSummary::from_run(&run, &db.path);

    assert_eq!(status.entities, 8);
    assert_eq!(status.attributes, 48);
    assert_eq!(status.edges, 6);
    assert_eq!(status.families, 3);
    assert_eq!(status.rows, 8);
    assert_eq!(status.dropped_unknown_name, 1);
    assert_eq!(status.dropped_no_attributes, 0);
    assert!(status.unknown_attributes.is_empty());
}

#[test]
fn test_cmd_status_both_modes() {
    let db = SourceDb::new();
    assert!(cmd_status(&db.config(), false).is_ok());
    assert!(cmd_status(&db.config(), true).is_ok());
}

#[test]
fn test_cmd_status_unreachable() {
    let mut config = Config::default();
    config.apply_flags(Some(PathBuf::from("/nonexistent/dir/source.db")), None, None);
    assert!(cmd_status(&config, false).is_err());
}
