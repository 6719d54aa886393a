//! regharvest - Main entry point

use clap::Parser;
use regharvest_cli::{Cli, Commands, HarvestError};
use regharvest_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

/// Exit code when the API is rate limited before any progress was made.
/// Distinct from a real failure: wait and re-run.
const EXIT_RATE_LIMITED: i32 = 3;

#[tokio::main]
async fn main() {
    // Parse command-line arguments (a missing docket argument exits 2)
    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("regharvest".to_string())
            .build()
    } else {
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("regharvest".to_string())
            .build()
    };

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as the CLI should work without it)
    let _ = init_logging(&log_config);

    // Execute command
    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);

        let code = match e {
            // Quota exhausted before anything was persisted this run
            HarvestError::RateLimited => EXIT_RATE_LIMITED,
            _ => 1,
        };
        process::exit(code);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> regharvest_cli::Result<()> {
    let config = cli.run_config();

    match &cli.command {
        Commands::Pull { docket_id } => {
            regharvest_cli::commands::pull::run(config, docket_id).await
        },
        Commands::Status { docket_id } => {
            regharvest_cli::commands::status::run(config, docket_id).await
        },
    }
}
