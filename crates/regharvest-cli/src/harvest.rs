//! Ingestion orchestrator
//!
//! Drives one docket run through discovery, delta computation, per-item
//! processing, and flushing. The loop is strictly sequential per item
//! (detail fetch, then attachments, then persistence) and the table is
//! flushed after every appended row, so neither a crash nor an interrupt
//! can lose more than the item in flight.
//!
//! Rate limiting is not a failure here. During discovery it aborts the run
//! before anything is persisted; during item processing it stops the loop
//! and flushes whatever was already appended. Re-running the same docket
//! later picks up exactly the items that are still missing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;
use regharvest_common::{HarvestError, Result};
use tracing::{debug, error, info, warn};

use crate::api::types::{Item, ItemKind};
use crate::api::RegulationsClient;
use crate::config::RunConfig;
use crate::discovery;
use crate::download::{self, FetchOutcome};
use crate::store::{RecordRow, RecordTable};

/// How a run ended. All three outcomes leave the durable table flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every pending item was processed
    Completed,
    /// The API quota ran out mid-processing; the remainder is left for a
    /// later run
    RateLimited,
    /// An external interrupt was routed to a clean stop
    Interrupted,
}

/// Summary of one docket run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Items discovered on the remote side
    pub candidates: usize,
    /// Items skipped because their link was already in the table
    pub already_saved: usize,
    /// Rows appended by this run
    pub new_rows: usize,
    pub attachments_downloaded: usize,
    pub attachments_skipped: usize,
}

/// Orchestrates a resumable harvest of one docket
pub struct Harvester {
    client: RegulationsClient,
    http: reqwest::Client,
    config: RunConfig,
    interrupt: Arc<AtomicBool>,
}

impl Harvester {
    pub fn new(client: RegulationsClient, config: RunConfig) -> Self {
        let http = client.http().clone();
        Self {
            client,
            http,
            config,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag that routes an external interrupt to a clean stop; set
    /// it from a signal handler
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// Run the full pipeline for one docket
    pub async fn run(&self, docket_id: &str) -> Result<RunReport> {
        std::fs::create_dir_all(self.config.docket_dir(docket_id))?;

        // Discovering
        println!(
            "{} Discovering documents and comments for docket {}...",
            "→".cyan(),
            docket_id.bold()
        );
        let discovered = discovery::discover(&self.client, docket_id).await?;

        // ComputingDelta: pending documents first, then pending comments,
        // both in discovery order
        let table_path = self.config.table_path(docket_id);
        let mut table = RecordTable::load(&table_path)?;

        let pending: Vec<Item> = discovered
            .documents
            .iter()
            .chain(discovered.comments.iter())
            .filter(|item| !table.contains(&item.self_link))
            .cloned()
            .collect();

        let mut report = RunReport {
            outcome: RunOutcome::Completed,
            candidates: discovered.candidate_count(),
            already_saved: discovered.candidate_count() - pending.len(),
            new_rows: 0,
            attachments_downloaded: 0,
            attachments_skipped: 0,
        };

        println!(
            "{} Found {} item(s): {} previously saved, {} to fetch",
            "✓".green(),
            report.candidates,
            report.already_saved,
            pending.len()
        );

        // ProcessingItem
        for item in &pending {
            if self.interrupted() {
                info!(next = %item.id, "interrupt received, stopping");
                report.outcome = RunOutcome::Interrupted;
                break;
            }

            match self.process_item(docket_id, item, &mut report).await {
                Ok(Some(row)) => {
                    if table.append(row) {
                        report.new_rows += 1;
                        // Incremental flush; a crash loses at most the item in flight
                        table.flush(&table_path)?;
                    } else {
                        debug!(link = %item.self_link, "link already recorded, resume in progress");
                    }
                },
                Ok(None) => {},
                Err(HarvestError::RateLimited) => {
                    warn!(item = %item.id, "rate limit reached, stopping with progress saved");
                    report.outcome = RunOutcome::RateLimited;
                    break;
                },
                Err(e) => {
                    let _ = table.flush(&table_path);
                    return Err(e);
                },
            }
        }

        // Flushing
        table.flush(&table_path)?;
        info!(
            docket_id,
            outcome = ?report.outcome,
            new_rows = report.new_rows,
            "run finished"
        );

        Ok(report)
    }

    /// Process one pending item. `Ok(None)` means the item was skipped for
    /// this run (transport trouble) and stays pending; `Err(RateLimited)`
    /// tells the loop to stop gracefully.
    async fn process_item(
        &self,
        docket_id: &str,
        item: &Item,
        report: &mut RunReport,
    ) -> Result<Option<RecordRow>> {
        println!("{} Working on {} {}", "→".cyan(), item.kind, item.id);

        let detail = match self.client.fetch_detail(&item.self_link).await {
            Ok(detail) => detail,
            Err(HarvestError::RateLimited) => return Err(HarvestError::RateLimited),
            Err(e) => {
                error!(item = %item.id, error = %e, "detail fetch failed, leaving item for a later run");
                return Ok(None);
            },
        };

        // Documents carry their file as part of the detail record; comments
        // have a dedicated attachments endpoint.
        let attachments = match item.kind {
            ItemKind::Document => detail.content_attachment().into_iter().collect(),
            ItemKind::Comment => match self.client.fetch_attachments(&item.self_link).await {
                Ok(attachments) => attachments,
                Err(HarvestError::RateLimited) => return Err(HarvestError::RateLimited),
                Err(e) => {
                    warn!(item = %item.id, error = %e, "attachment listing failed, saving record without attachments");
                    Vec::new()
                },
            },
        };

        if !attachments.is_empty() {
            let item_dir = self.config.item_dir(docket_id, &item.id);
            std::fs::create_dir_all(&item_dir)?;

            for attachment in &attachments {
                let file_name = download::attachment_file_name(&attachment.title, &attachment.url);
                let dest = item_dir.join(&file_name);

                match download::fetch(&self.http, &attachment.url, &dest).await {
                    Ok(FetchOutcome::Downloaded) => report.attachments_downloaded += 1,
                    Ok(FetchOutcome::AlreadyPresent) => {
                        report.attachments_skipped += 1;
                        println!("  {} {} was already downloaded", "✓".green(), file_name);
                    },
                    Err(e) => {
                        warn!(item = %item.id, url = %attachment.url, error = %e, "attachment undownloadable");
                    },
                }
            }
        }

        Ok(Some(RecordRow::from_detail(item.kind, detail, attachments)))
    }
}
