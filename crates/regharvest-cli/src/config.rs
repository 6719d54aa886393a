//! Run configuration
//!
//! The credential, API base URL, and storage root are threaded explicitly
//! through the pipeline as one struct; nothing reads process-wide state
//! after argument parsing.

use std::path::{Path, PathBuf};

use crate::store::TABLE_FILE_NAME;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default storage root for harvested dockets
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Placeholder credential accepted by the API with a tight quota
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";

/// Configuration for one harvest run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// API credential embedded in every request
    pub api_key: String,

    /// API base URL (override for testing against a local fixture server)
    pub base_url: String,

    /// Root folder under which each docket gets its own subfolder
    pub data_dir: PathBuf,
}

impl RunConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Folder holding everything saved for a docket
    pub fn docket_dir(&self, docket_id: &str) -> PathBuf {
        self.data_dir.join(docket_id)
    }

    /// Path of the durable record table for a docket
    pub fn table_path(&self, docket_id: &str) -> PathBuf {
        self.docket_dir(docket_id).join(TABLE_FILE_NAME)
    }

    /// Folder holding one item's downloaded attachments
    pub fn item_dir(&self, docket_id: &str, item_id: &str) -> PathBuf {
        self.docket_dir(docket_id).join(item_id)
    }

    /// Storage root
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_layout() {
        let config = RunConfig::new("KEY", "https://api.example.gov/v4", "/tmp/data");

        assert_eq!(
            config.docket_dir("NIST-2021-0006"),
            PathBuf::from("/tmp/data/NIST-2021-0006")
        );
        assert_eq!(
            config.table_path("NIST-2021-0006"),
            PathBuf::from("/tmp/data/NIST-2021-0006/comment_details.csv")
        );
        assert_eq!(
            config.item_dir("NIST-2021-0006", "NIST-2021-0006-0002"),
            PathBuf::from("/tmp/data/NIST-2021-0006/NIST-2021-0006-0002")
        );
    }
}
