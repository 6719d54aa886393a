//! Regharvest CLI Library
//!
//! Resumable harvester for regulations.gov dockets.
//!
//! # Overview
//!
//! `regharvest` downloads every document and public comment filed under a
//! docket, together with their attachments, into a per-docket folder with a
//! durable CSV record table:
//!
//! - **Harvesting**: discover, diff against saved state, fetch the delta
//!   (`regharvest pull NIST-2021-0006`)
//! - **Status**: report what a previous run already saved
//!   (`regharvest status NIST-2021-0006`)
//!
//! Runs are idempotent: items already in the table and files already on
//! disk are never fetched again, and a rate-limited or interrupted run
//! flushes its progress before exiting.

pub mod api;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod download;
pub mod harvest;
pub mod progress;
pub mod store;

// Re-export commonly used types
pub use api::RegulationsClient;
pub use config::RunConfig;
pub use harvest::{Harvester, RunOutcome, RunReport};
pub use regharvest_common::{HarvestError, Result};
pub use store::{RecordRow, RecordTable};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// regharvest - download public comments and attachments from regulations.gov
#[derive(Parser, Debug)]
#[command(name = "regharvest")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API key credential
    #[arg(
        long,
        env = "REGHARVEST_API_KEY",
        default_value = config::DEFAULT_API_KEY,
        global = true
    )]
    pub api_key: String,

    /// API base URL
    #[arg(
        long,
        env = "REGHARVEST_API_URL",
        default_value = api::client::DEFAULT_API_URL,
        global = true
    )]
    pub api_url: String,

    /// Root folder for harvested dockets
    #[arg(
        long,
        env = "REGHARVEST_DATA_DIR",
        default_value = config::DEFAULT_DATA_DIR,
        global = true
    )]
    pub data_dir: PathBuf,
}

impl Cli {
    /// Assemble the run configuration from the parsed arguments
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(
            self.api_key.clone(),
            self.api_url.clone(),
            self.data_dir.clone(),
        )
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest a docket's documents, comments, and attachments
    Pull {
        /// Docket ID to harvest (e.g., "NIST-2021-0006")
        docket_id: String,
    },

    /// Show what a previous run already saved for a docket
    Status {
        /// Docket ID to inspect
        docket_id: String,
    },
}
