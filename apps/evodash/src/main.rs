//! # evodash - Evolution Power Dashboard
//!
//! The main binary for the evodash reporting pipeline.
//!
//! This application provides:
//! - A terminal report of the power gained at each evolution
//! - A status view of the source dataset
//! - A local dashboard page (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   apps/evodash (THE BINARY)                 │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌────────────────┐   │
//! │  │    CLI      │    │  Dashboard  │    │     Config     │   │
//! │  │   (clap)    │    │   (axum)    │    │ (toml + env)   │   │
//! │  └──────┬──────┘    └──────┬──────┘    └───────┬────────┘   │
//! │         │                  │                   │            │
//! │         └──────────────────┼───────────────────┘            │
//! │                            ▼                                │
//! │                    ┌───────────────┐                        │
//! │                    │ evodash-core  │                        │
//! │                    │  (THE LOGIC)  │                        │
//! │                    └───────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Terminal report (default command)
//! evodash -D pokemon_dw.db report --limit 20
//!
//! # Dataset status as JSON
//! evodash --json-mode status
//!
//! # Local dashboard
//! evodash serve --host 127.0.0.1 --port 8501
//! ```

use clap::Parser;
use evodash::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments first: --verbose decides the default filter.
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    // Banner stays off stdout when the output is meant for a program.
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing on stderr. EVODASH_LOG_FORMAT=json switches to JSON lines.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("EVODASH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "evodash=debug,tower_http=debug"
    } else {
        "evodash=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Print the evodash startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┬  ┬┌─┐┌┬┐┌─┐┌─┐┬ ┬
  ├┤ └┐┌┘│ │ ││├─┤└─┐├─┤
  └─┘ └┘ └─┘─┴┘┴ ┴└─┘┴ ┴

  Evolution Power Dashboard v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
