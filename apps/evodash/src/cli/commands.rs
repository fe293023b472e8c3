//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Rendering is split from printing: `render_*` functions build the text so
//! they can be checked without capturing stdout.

use crate::config::Config;
use crate::dashboard;
use evodash_core::{
    Dataset, DropReason, EvodashError, Report, Transformation, format_millis, load_dataset,
    transform,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width of the longest text bar, in characters.
const BAR_WIDTH: i64 = 40;

// =============================================================================
// PIPELINE
// =============================================================================

/// Everything one invocation derives from the data source.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub dataset: Dataset,
    pub transformation: Transformation,
    pub report: Report,
}

/// Load, transform and build the report.
///
/// Members lost to the inner joins are logged at debug level only.
pub fn run_pipeline(config: &Config) -> Result<PipelineRun, EvodashError> {
    let source = &config.source;
    tracing::debug!(database = %source.database.display(), "Loading data source");

    let dataset = load_dataset(&source.database, &source.schema())?;
    tracing::info!(
        entities = dataset.entities.len(),
        attributes = dataset.attributes.len(),
        edges = dataset.edges.len(),
        "Data source loaded"
    );

    let transformation = transform(&dataset);
    for dropped in &transformation.dropped {
        tracing::debug!(
            family = %dropped.family,
            name = %dropped.name,
            reason = ?dropped.reason,
            "Family member dropped"
        );
    }
    tracing::debug!(
        rows = transformation.table.len(),
        dropped = transformation.dropped.len(),
        "Transform complete"
    );

    let report = Report::build(&transformation.table, &dataset.edges);

    Ok(PipelineRun {
        dataset,
        transformation,
        report,
    })
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Print the evolution power report.
pub fn cmd_report(
    config: &Config,
    json_mode: bool,
    limit: Option<usize>,
) -> Result<(), EvodashError> {
    let run = run_pipeline(config)?;

    if json_mode {
        let mut report = run.report;
        if let Some(limit) = limit {
            report.table.truncate(limit);
        }
        let output = serde_json::to_string_pretty(&report)
            .map_err(|e| EvodashError::Serialization(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    print!(
        "{}",
        render_report(&run.report, &config.source.database, limit)
    );
    Ok(())
}

/// Render the report as terminal text.
pub fn render_report(report: &Report, database: &Path, limit: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str("Evolution Power Report\n");
    out.push_str("======================\n");
    out.push_str(&format!("Database: {}\n", database.display()));

    // 1. Headline metrics + bars
    out.push_str("\n1. Average power jump\n\n");
    for mean in [&report.summary.first_evolution, &report.summary.second_evolution] {
        out.push_str(&format!(
            "  {:<24} {:>10}  ({} evolutions)\n",
            mean.label(),
            points(mean.rounded()),
            mean.samples
        ));
    }
    out.push('\n');

    let widest = report
        .bars
        .iter()
        .filter_map(|b| b.mean_millis)
        .map(i64::saturating_abs)
        .max()
        .unwrap_or(0);
    for bar in &report.bars {
        let width = match bar.mean_millis {
            Some(m) if widest > 0 => m.max(0).saturating_mul(BAR_WIDTH) / widest,
            _ => 0,
        };
        out.push_str(&format!(
            "  {:<24} {} {}\n",
            bar.label,
            "█".repeat(usize::try_from(width).unwrap_or(0)),
            bar.mean_millis
                .map(format_millis)
                .unwrap_or_else(|| "n/a".to_string())
        ));
    }

    // 2. Distribution
    out.push_str("\n2. Not every evolution is equal\n\n");
    for group in &report.distribution {
        out.push_str(&format!("  {}\n", group.label));
        match &group.summary {
            Some(s) => {
                out.push_str(&format!(
                    "    n={}  min {}  q1 {}  median {}  q3 {}  max {}\n",
                    group.points.len(),
                    s.min,
                    format_millis(s.q1_millis),
                    format_millis(s.median_millis),
                    format_millis(s.q3_millis),
                    s.max
                ));
                let outliers: Vec<String> = group
                    .points
                    .iter()
                    .filter(|p| s.outliers.contains(&p.delta))
                    .map(|p| format!("{} {:+}", p.name, p.delta))
                    .collect();
                if !outliers.is_empty() {
                    out.push_str(&format!("    outliers: {}\n", outliers.join(", ")));
                }
            }
            None => out.push_str("    n=0\n"),
        }
    }

    // 3. Trigger flow
    out.push_str("\n3. Path of evolution\n\n");
    if report.flow.is_empty() {
        out.push_str("  (no evolution triggers recorded)\n");
    }
    for link in &report.flow.links {
        let source = report.flow.nodes.get(link.source).map_or("?", String::as_str);
        let target = report.flow.nodes.get(link.target).map_or("?", String::as_str);
        out.push_str(&format!("  {:<20} → {:<8} {:>5}\n", source, target, link.value));
    }

    // 4. Table
    out.push_str(&format!("\n4. Family table ({} rows)\n\n", report.table.len()));
    out.push_str(&format!(
        "  {:<16} {:>7} {:>6} {:>6} {:>6}\n",
        "Name", "Family", "Stage", "Score", "Delta"
    ));
    let shown = limit.unwrap_or(report.table.len());
    for row in report.table.iter().take(shown) {
        out.push_str(&format!(
            "  {:<16} {:>7} {:>6} {:>6} {:>6}\n",
            row.name,
            row.family,
            row.stage,
            row.score,
            row.delta
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        ));
    }
    if report.table.len() > shown {
        out.push_str(&format!("  ... {} more rows\n", report.table.len() - shown));
    }

    out
}

/// `+N pts`, or `n/a` without samples.
fn points(rounded: Option<i64>) -> String {
    rounded
        .map(|v| format!("{:+} pts", v))
        .unwrap_or_else(|| "n/a".to_string())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// What the data source holds and what survived the transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub database: String,
    pub entities: usize,
    pub attributes: usize,
    pub edges: usize,
    pub families: usize,
    pub rows: usize,
    pub dropped_unknown_name: usize,
    pub dropped_no_attributes: usize,
    pub unknown_attributes: Vec<String>,
}

impl StatusSummary {
    /// Summarize a pipeline run.
    #[must_use]
    pub fn from_run(run: &PipelineRun, database: &Path) -> Self {
        Self {
            database: database.display().to_string(),
            entities: run.dataset.entities.len(),
            attributes: run.dataset.attributes.len(),
            edges: run.dataset.edges.len(),
            families: run.dataset.family_count(),
            rows: run.transformation.table.len(),
            dropped_unknown_name: run.transformation.dropped_count(DropReason::UnknownName),
            dropped_no_attributes: run.transformation.dropped_count(DropReason::NoAttributes),
            unknown_attributes: run.dataset.unknown_attribute_names(),
        }
    }
}

/// Show data source status.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), EvodashError> {
    let run = run_pipeline(config)?;
    let status = StatusSummary::from_run(&run, &config.source.database);

    if json_mode {
        let output = serde_json::to_string_pretty(&status)
            .map_err(|e| EvodashError::Serialization(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    print!("{}", render_status(&status));
    Ok(())
}

/// Render a status summary as terminal text.
pub fn render_status(status: &StatusSummary) -> String {
    let mut out = String::new();
    out.push_str("evodash Data Source Status\n");
    out.push_str("==========================\n");
    out.push_str(&format!("Database: {}\n\n", status.database));
    out.push_str(&format!("Entities:         {}\n", status.entities));
    out.push_str(&format!("Attribute rows:   {}\n", status.attributes));
    out.push_str(&format!("Evolution edges:  {}\n", status.edges));
    out.push_str(&format!("Families:         {}\n", status.families));
    out.push_str(&format!("Table rows:       {}\n", status.rows));
    out.push_str("\nDropped members:\n");
    out.push_str(&format!("  Unknown name:   {}\n", status.dropped_unknown_name));
    out.push_str(&format!("  No attributes:  {}\n", status.dropped_no_attributes));
    if !status.unknown_attributes.is_empty() {
        out.push_str(&format!(
            "\nAttributes outside the base stats: {}\n",
            status.unknown_attributes.join(", ")
        ));
    }
    out
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Build the report once and serve the dashboard until Ctrl+C.
pub async fn cmd_serve(config: &Config) -> Result<(), EvodashError> {
    let run = run_pipeline(config)?;
    let addr = config.server.addr();

    println!("evodash Dashboard Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  http://{}", addr);
    println!("  Database: {}", config.source.database.display());
    println!("  Rows:     {}", run.transformation.table.len());
    println!();
    println!("Endpoints:");
    println!("  GET /       - Dashboard page");
    println!("  GET /health - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let source = config.source.database.display().to_string();
    let state = dashboard::AppState::new(run.report, &source);
    dashboard::run_server(&addr, state).await
}

// =============================================================================
// TESTS
// =============================================================================
