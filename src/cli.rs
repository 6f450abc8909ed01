//! Command line interface built on clap.
//!
//! [`Cli`] carries the global flags (`--api-url`, `--interval-ms`,
//! `--verbose`) and one [`Command`] per job operation.

use clap::{Parser, Subcommand};

/// Follow render jobs held by a render API.
#[derive(Debug, Parser)]
#[command(name = "renderjob", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the render API (overrides config and API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Polling interval in milliseconds (overrides config and API_UPDATE_INTERVAL).
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the job's current record.
    Status {
        /// Job id.
        id: String,
    },

    /// Poll the job until it finishes or fails.
    Watch {
        /// Job id.
        id: String,
    },

    /// Delete the job from the render API.
    Remove {
        /// Job id.
        id: String,
    },
}
