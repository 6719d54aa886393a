//! `regharvest pull` command implementation
//!
//! Harvests one docket: discovery, delta, per-item fetch, durable flush.
//! Ctrl-C is routed to the orchestrator's interrupt flag so a manual stop
//! still saves progress.

use std::sync::atomic::Ordering;

use colored::Colorize;
use regharvest_common::Result;
use tracing::debug;

use crate::api::RegulationsClient;
use crate::config::RunConfig;
use crate::harvest::{Harvester, RunOutcome};

/// Harvest a docket into the configured data directory
pub async fn run(config: RunConfig, docket_id: &str) -> Result<()> {
    let client = RegulationsClient::new(config.base_url.clone(), config.api_key.clone())?;
    let harvester = Harvester::new(client, config);

    let flag = harvester.interrupt_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let report = harvester.run(docket_id).await?;
    debug!(?report, "run report");

    match report.outcome {
        RunOutcome::Completed => {
            println!(
                "\n{} Docket {} is up to date: {} new record(s), {} already saved, {} attachment(s) downloaded",
                "✓".green().bold(),
                docket_id,
                report.new_rows,
                report.already_saved,
                report.attachments_downloaded
            );
        },
        RunOutcome::RateLimited => {
            println!(
                "\n{} API rate limit reached after {} new record(s). Progress is saved; wait an hour and re-run to continue.",
                "⚠".yellow().bold(),
                report.new_rows
            );
        },
        RunOutcome::Interrupted => {
            println!(
                "\n{} Interrupted after {} new record(s). Progress is saved; re-run to continue.",
                "⚠".yellow().bold(),
                report.new_rows
            );
        },
    }

    Ok(())
}
