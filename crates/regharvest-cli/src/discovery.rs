//! Docket discovery
//!
//! Enumerates the full candidate item set for a docket: its documents,
//! then every comment filed against each document. Kept apart from the raw
//! client so discovery policy (pagination limits, filtering) can evolve
//! independently of the transport.

use crate::api::types::Item;
use crate::api::RegulationsClient;
use regharvest_common::Result;
use tracing::{info, warn};

/// The full candidate set discovered for one docket
#[derive(Debug, Default)]
pub struct Discovery {
    pub documents: Vec<Item>,
    pub comments: Vec<Item>,
}

impl Discovery {
    /// Total number of candidate items
    pub fn candidate_count(&self) -> usize {
        self.documents.len() + self.comments.len()
    }
}

/// Resolve the documents published under a docket
pub async fn resolve_documents(client: &RegulationsClient, docket_id: &str) -> Result<Vec<Item>> {
    client.list_documents(docket_id).await
}

/// Discover every document and comment under a docket. A rate-limit signal
/// from any listing aborts discovery; nothing has been persisted yet at
/// this point, so the caller can simply re-run later.
pub async fn discover(client: &RegulationsClient, docket_id: &str) -> Result<Discovery> {
    let documents = resolve_documents(client, docket_id).await?;

    let mut comments = Vec::new();
    for document in &documents {
        let Some(object_id) = document.object_id.as_deref() else {
            warn!(document = %document.id, "document listing carries no object id, cannot scan its comments");
            continue;
        };
        comments.extend(client.list_comments(object_id).await?);
    }

    info!(
        docket_id,
        documents = documents.len(),
        comments = comments.len(),
        "discovery complete"
    );

    Ok(Discovery {
        documents,
        comments,
    })
}
