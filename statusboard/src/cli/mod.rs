//! CLI module for statusboard
//!
//! Provides the `serve` and `check` subcommands.

pub mod check;
pub mod serve;

use clap::{Parser, Subcommand};

/// Statusboard - live health dashboard for a fixed set of microservices
#[derive(Parser, Debug)]
#[command(name = "statusboard")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    STATUSBOARD_CONFIG             Config file path (TOML/JSON/YAML)
    STATUSBOARD_HOST               Bind address (default: 0.0.0.0)
    STATUSBOARD_PORT               Listen port (default: 3000)
    STATUSBOARD_POLL_INTERVAL_MS   Polling interval (default: 30000)
    STATUSBOARD_PROBE_TIMEOUT_MS   Per-check timeout (default: 5000)
    STATUSBOARD_LOG_LEVEL          Log filter (default: info, falls back to RUST_LOG)
    STATUSBOARD_LOG_FORMAT         Set to "json" for JSON log lines
"#)]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(serve::ServeArgs),
    /// Run one health check cycle and print the result
    Check(check::CheckArgs),
}
