//! # evodash CLI Module
//!
//! This module implements the CLI interface for evodash.
//!
//! ## Available Commands
//!
//! - `report` - Print the evolution power report (default)
//! - `status` - Show what the data source contains
//! - `serve` - Start the local dashboard

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use evodash_core::EvodashError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// evodash - Evolution Power Dashboard
///
/// Reads a creature dataset from SQLite and reports how much raw power each
/// evolution adds.
#[derive(Parser, Debug)]
#[command(name = "evodash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the SQLite data source
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the evolution power report
    Report {
        /// Maximum number of table rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show data source status
    Status,

    /// Start the local dashboard
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), EvodashError> {
    let mut config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        None => {
            config.apply_flags(cli.database, None, None);
            cmd_report(&config, json_mode, None)
        }
        Some(Commands::Report { limit }) => {
            config.apply_flags(cli.database, None, None);
            cmd_report(&config, json_mode, limit)
        }
        Some(Commands::Status) => {
            config.apply_flags(cli.database, None, None);
            cmd_status(&config, json_mode)
        }
        Some(Commands::Serve { host, port }) => {
            config.apply_flags(cli.database, host, port);
            cmd_serve(&config).await
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["evodash"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(cli.database.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["evodash", "status", "-D", "x.db", "--json-mode"])
            .expect("parse");
        assert!(matches!(cli.command, Some(Commands::Status)));
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
        assert!(cli.json_mode);
    }

    #[test]
    fn serve_flags() {
        let cli = Cli::try_parse_from(["evodash", "serve", "-H", "0.0.0.0", "-p", "9000"])
            .expect("parse");
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            other => unreachable!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn report_limit() {
        let cli = Cli::try_parse_from(["evodash", "report", "--limit", "5"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Report { limit: Some(5) })));
    }
}
