//! Durable record table
//!
//! One CSV file per docket holds every document/comment record saved so
//! far, keyed by the item's canonical `link`. The table is the resume
//! state: a link present in the table is an item that never needs fetching
//! again. Flushes go through a temp file and an atomic rename, so a crash
//! mid-write can never corrupt the previous durable copy.

use crate::api::types::{Attachment, ItemDetail, ItemKind};
use regharvest_common::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// File name of the record table inside a docket folder
pub const TABLE_FILE_NAME: &str = "comment_details.csv";

/// One persisted document/comment record. Field order defines the CSV
/// column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    #[serde(rename = "commentOrDocument")]
    pub kind: ItemKind,

    #[serde(rename = "modifyDate")]
    pub modify_date: Option<String>,

    #[serde(rename = "docketId")]
    pub docket_id: Option<String>,

    #[serde(rename = "commentOnDocumentId")]
    pub comment_on_document_id: Option<String>,

    pub id: String,

    pub organization: Option<String>,

    #[serde(rename = "firstName")]
    pub first_name: Option<String>,

    #[serde(rename = "lastName")]
    pub last_name: Option<String>,

    pub title: Option<String>,

    pub comment: Option<String>,

    /// JSON-encoded list of `{title, url}` pairs in a single CSV cell
    #[serde(with = "attachments_cell")]
    pub attachments: Vec<Attachment>,

    /// Canonical self link; the dedup key, unique within a table
    pub link: String,
}

impl RecordRow {
    /// Flatten a fetched detail plus its resolved attachment list
    pub fn from_detail(kind: ItemKind, detail: ItemDetail, attachments: Vec<Attachment>) -> Self {
        Self {
            kind,
            modify_date: detail.modify_date,
            docket_id: detail.docket_id,
            comment_on_document_id: detail.comment_on_document_id,
            id: detail.id,
            organization: detail.organization,
            first_name: detail.first_name,
            last_name: detail.last_name,
            title: detail.title,
            comment: detail.comment,
            attachments,
            link: detail.self_link,
        }
    }
}

/// The persisted state for one docket: an ordered, append-only sequence of
/// rows with unique links
#[derive(Debug, Default)]
pub struct RecordTable {
    rows: Vec<RecordRow>,
    links: HashSet<String>,
}

impl RecordTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from disk; a missing file yields an empty table
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| HarvestError::table(format!("cannot open {}: {}", path.display(), e)))?;

        let mut table = Self::new();
        for row in reader.deserialize() {
            let row: RecordRow = row
                .map_err(|e| HarvestError::table(format!("bad row in {}: {}", path.display(), e)))?;
            if !table.append(row) {
                return Err(HarvestError::table(format!(
                    "duplicate link in {}",
                    path.display()
                )));
            }
        }

        Ok(table)
    }

    /// Whether a link has already been recorded
    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Append a row. Returns false (and leaves the table untouched) when
    /// the link is already present; that is a resume in progress, not a
    /// failure.
    pub fn append(&mut self, row: RecordRow) -> bool {
        if !self.links.insert(row.link.clone()) {
            return false;
        }
        self.rows.push(row);
        true
    }

    /// Write the full table durably: serialize to a sibling temp file,
    /// then rename over the target so the swap is all-or-nothing.
    pub fn flush(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp_path).map_err(|e| {
                HarvestError::table(format!("cannot write {}: {}", tmp_path.display(), e))
            })?;
            for row in &self.rows {
                writer.serialize(row).map_err(|e| {
                    HarvestError::table(format!("cannot serialize row {}: {}", row.link, e))
                })?;
            }
            writer
                .flush()
                .map_err(|e| HarvestError::table(format!("flush failed: {}", e)))?;
        }
        std::fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Rows in insertion order
    pub fn rows(&self) -> &[RecordRow] {
        &self.rows
    }

    /// Number of recorded rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Serde adapter packing the attachment list into one JSON-encoded CSV cell
mod attachments_cell {
    use crate::api::types::Attachment;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(attachments: &[Attachment], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let json = serde_json::to_string(attachments).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&json)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Attachment>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cell = String::deserialize(deserializer)?;
        if cell.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&cell).map_err(serde::de::Error::custom)
    }
}
