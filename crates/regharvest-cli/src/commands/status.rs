//! `regharvest status` command implementation
//!
//! Reports what a previous run already saved for a docket.

use chrono::{DateTime, Local};
use colored::Colorize;
use regharvest_common::Result;

use crate::api::types::ItemKind;
use crate::config::RunConfig;
use crate::store::RecordTable;

/// Show the saved state for a docket
pub async fn run(config: RunConfig, docket_id: &str) -> Result<()> {
    let table_path = config.table_path(docket_id);
    if !table_path.exists() {
        println!(
            "No saved records for docket {} (no table at {})",
            docket_id,
            table_path.display()
        );
        return Ok(());
    }

    let table = RecordTable::load(&table_path)?;
    let documents = table
        .rows()
        .iter()
        .filter(|r| r.kind == ItemKind::Document)
        .count();
    let comments = table.len() - documents;
    let attachments: usize = table.rows().iter().map(|r| r.attachments.len()).sum();

    println!("Docket {}", docket_id.bold());
    println!("  Table:       {}", table_path.display());
    println!("  Documents:   {}", documents);
    println!("  Comments:    {}", comments);
    println!("  Attachments: {}", attachments);

    if let Ok(modified) = std::fs::metadata(&table_path).and_then(|m| m.modified()) {
        let modified: DateTime<Local> = modified.into();
        println!("  Last saved:  {}", modified.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}
