//! API response types and the domain model they parse into
//!
//! Matches the regulations.gov v4 JSON:API structure. Every payload is read
//! through [`Envelope`], which distinguishes the three outcomes the rest of
//! the pipeline cares about: data, rate-limit signal, or malformed response.

use regharvest_common::{HarvestError, Result};
use serde::{Deserialize, Serialize};

/// Error code the API uses to signal an exhausted request quota
pub const RATE_LIMIT_CODE: &str = "OVER_RATE_LIMIT";

// ============================================================================
// Domain model
// ============================================================================

/// Kind of a harvestable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Top-level published item under a docket
    Document,
    /// Public submission responding to a document
    Comment,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Document => write!(f, "document"),
            ItemKind::Comment => write!(f, "comment"),
        }
    }
}

/// One discoverable remote entity, as returned by the list endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Identifier unique within its kind (e.g. "NIST-2021-0006-0001")
    pub id: String,

    /// Canonical per-item URL; globally unique, used as the dedup key
    pub self_link: String,

    pub kind: ItemKind,

    /// API-internal object id; carried by documents only, required to
    /// page that document's comments
    pub object_id: Option<String>,
}

/// Full record fetched for an item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetail {
    pub id: String,
    pub self_link: String,
    pub modify_date: Option<String>,
    pub docket_id: Option<String>,
    pub organization: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    /// Free-text comment body (comments only)
    pub comment: Option<String>,
    pub comment_on_document_id: Option<String>,
    /// The detail's own primary file reference, when the item carries one
    pub file_url: Option<String>,
}

impl ItemDetail {
    /// The attachment embedded in the detail record itself, if any.
    /// Documents publish their content this way rather than through the
    /// attachments sub-endpoint.
    pub fn content_attachment(&self) -> Option<Attachment> {
        let url = self.file_url.clone()?;
        Some(Attachment {
            title: self.title.clone().unwrap_or_else(|| self.id.clone()),
            url,
        })
    }
}

/// A downloadable file referenced by a document or comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    pub url: String,
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Error body embedded in an API payload
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Top-level API payload: either `data` or `error`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<ApiErrorBody>,
}

impl<T> Envelope<T> {
    /// Classify the payload: rate-limit signal, API-reported failure, a
    /// missing `data` field (malformed), or the data itself. A present but
    /// empty `data` array is a normal success.
    pub fn into_data(self) -> Result<T> {
        if let Some(err) = self.error {
            if err.code == RATE_LIMIT_CODE {
                return Err(HarvestError::RateLimited);
            }
            return Err(HarvestError::transport(format!(
                "API error {}: {}",
                err.code,
                err.message.unwrap_or_else(|| "no message".to_string())
            )));
        }

        self.data
            .ok_or_else(|| HarvestError::transport("response is missing the 'data' field"))
    }
}

/// Entry of a paginated document/comment listing
#[derive(Debug, Deserialize)]
pub struct ListedResource {
    pub id: String,
    #[serde(default)]
    pub attributes: Option<ListedAttributes>,
    pub links: ResourceLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedAttributes {
    #[serde(default)]
    pub object_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

impl ListedResource {
    pub fn into_item(self, kind: ItemKind) -> Item {
        Item {
            id: self.id,
            self_link: self.links.self_link,
            kind,
            object_id: self.attributes.and_then(|a| a.object_id),
        }
    }
}

/// Detail endpoint resource
#[derive(Debug, Deserialize)]
pub struct DetailResource {
    pub id: String,
    pub attributes: DetailAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailAttributes {
    #[serde(default)]
    pub modify_date: Option<String>,
    #[serde(default)]
    pub docket_id: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub comment_on_document_id: Option<String>,
    #[serde(default)]
    pub file_formats: Option<Vec<FileFormat>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFormat {
    #[serde(default)]
    pub file_url: Option<String>,
}

impl DetailResource {
    /// Flatten into the domain record, tagging it with the link it was
    /// fetched from. Names come from their own source fields.
    pub fn into_detail(self, self_link: &str) -> ItemDetail {
        let attrs = self.attributes;
        let file_url = attrs
            .file_formats
            .as_ref()
            .and_then(|formats| formats.first())
            .and_then(|f| f.file_url.clone());

        ItemDetail {
            id: self.id,
            self_link: self_link.to_string(),
            modify_date: attrs.modify_date,
            docket_id: attrs.docket_id,
            organization: attrs.organization,
            first_name: attrs.first_name,
            last_name: attrs.last_name,
            title: attrs.title,
            comment: attrs.comment,
            comment_on_document_id: attrs.comment_on_document_id,
            file_url,
        }
    }
}

/// Entry of an attachments sub-endpoint listing
#[derive(Debug, Deserialize)]
pub struct AttachmentResource {
    pub attributes: AttachmentAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentAttributes {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub restrict_reason_type: Option<String>,
    #[serde(default)]
    pub file_formats: Option<Vec<FileFormat>>,
}

/// Filter an attachments listing down to what can actually be fetched:
/// entries with a restriction reason are excluded outright, and entries
/// without a title or a file URL have nothing to download.
pub fn downloadable_attachments(resources: Vec<AttachmentResource>) -> Vec<Attachment> {
    resources
        .into_iter()
        .filter_map(|resource| {
            let attrs = resource.attributes;
            if attrs.restrict_reason_type.is_some() {
                tracing::debug!(
                    reason = attrs.restrict_reason_type.as_deref(),
                    "skipping restricted attachment"
                );
                return None;
            }

            let title = attrs.title?;
            let url = attrs
                .file_formats
                .as_ref()
                .and_then(|formats| formats.first())
                .and_then(|f| f.file_url.clone());
            match url {
                Some(url) => Some(Attachment { title, url }),
                None => {
                    tracing::warn!(title = %title, "attachment has no file URL, skipping");
                    None
                },
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_rate_limit() {
        let body = r#"{"error": {"code": "OVER_RATE_LIMIT", "message": "slow down"}}"#;
        let envelope: Envelope<Vec<ListedResource>> = serde_json::from_str(body).unwrap();
        assert!(matches!(
            envelope.into_data(),
            Err(HarvestError::RateLimited)
        ));
    }

    #[test]
    fn test_envelope_other_error_is_transport() {
        let body = r#"{"error": {"code": "NOT_FOUND", "message": "no such docket"}}"#;
        let envelope: Envelope<Vec<ListedResource>> = serde_json::from_str(body).unwrap();
        let err = envelope.into_data().unwrap_err();
        assert!(matches!(err, HarvestError::Transport(ref m) if m.contains("NOT_FOUND")));
    }

    #[test]
    fn test_envelope_missing_data_is_transport() {
        let envelope: Envelope<Vec<ListedResource>> = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            envelope.into_data(),
            Err(HarvestError::Transport(_))
        ));
    }

    #[test]
    fn test_envelope_empty_page_is_success() {
        let envelope: Envelope<Vec<ListedResource>> =
            serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(envelope.into_data().unwrap().is_empty());
    }

    #[test]
    fn test_listed_resource_into_item() {
        let body = r#"{
            "id": "NIST-2021-0006-0001",
            "attributes": {"objectId": "0900006480b1b632"},
            "links": {"self": "https://api.example.gov/v4/documents/NIST-2021-0006-0001"}
        }"#;
        let resource: ListedResource = serde_json::from_str(body).unwrap();
        let item = resource.into_item(ItemKind::Document);

        assert_eq!(item.id, "NIST-2021-0006-0001");
        assert_eq!(item.kind, ItemKind::Document);
        assert_eq!(item.object_id.as_deref(), Some("0900006480b1b632"));
        assert!(item.self_link.ends_with("/documents/NIST-2021-0006-0001"));
    }

    #[test]
    fn test_listed_resource_requires_self_link() {
        let body = r#"{"id": "X-1", "links": {}}"#;
        assert!(serde_json::from_str::<ListedResource>(body).is_err());
    }

    #[test]
    fn test_detail_into_detail_uses_own_name_fields() {
        let body = r#"{
            "id": "NIST-2021-0006-0002",
            "attributes": {
                "modifyDate": "2021-09-01T12:00:00Z",
                "docketId": "NIST-2021-0006",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "comment": "I support this.",
                "commentOnDocumentId": "NIST-2021-0006-0001"
            }
        }"#;
        let resource: DetailResource = serde_json::from_str(body).unwrap();
        let detail = resource.into_detail("https://api.example.gov/v4/comments/NIST-2021-0006-0002");

        assert_eq!(detail.first_name.as_deref(), Some("Ada"));
        assert_eq!(detail.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(detail.comment.as_deref(), Some("I support this."));
        assert_eq!(detail.file_url, None);
        assert!(detail.self_link.ends_with("-0002"));
    }

    #[test]
    fn test_content_attachment() {
        let body = r#"{
            "id": "NIST-2021-0006-0001",
            "attributes": {
                "title": "Draft Guidance",
                "fileFormats": [{"fileUrl": "https://downloads.example.gov/doc.pdf"}]
            }
        }"#;
        let resource: DetailResource = serde_json::from_str(body).unwrap();
        let detail = resource.into_detail("https://api.example.gov/v4/documents/NIST-2021-0006-0001");

        let attachment = detail.content_attachment().unwrap();
        assert_eq!(attachment.title, "Draft Guidance");
        assert_eq!(attachment.url, "https://downloads.example.gov/doc.pdf");
    }

    #[test]
    fn test_content_attachment_absent() {
        let body = r#"{"id": "X-1", "attributes": {"title": "No file here"}}"#;
        let resource: DetailResource = serde_json::from_str(body).unwrap();
        let detail = resource.into_detail("https://api.example.gov/v4/documents/X-1");
        assert!(detail.content_attachment().is_none());
    }

    #[test]
    fn test_restricted_attachments_filtered() {
        let body = r#"[
            {"attributes": {
                "title": "Public exhibit",
                "restrictReasonType": null,
                "fileFormats": [{"fileUrl": "https://downloads.example.gov/a.pdf"}]
            }},
            {"attributes": {
                "title": "Sealed exhibit",
                "restrictReasonType": "copyright",
                "fileFormats": [{"fileUrl": "https://downloads.example.gov/b.pdf"}]
            }}
        ]"#;
        let resources: Vec<AttachmentResource> = serde_json::from_str(body).unwrap();
        let attachments = downloadable_attachments(resources);

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].title, "Public exhibit");
    }

    #[test]
    fn test_attachment_without_file_url_skipped() {
        let body = r#"[{"attributes": {"title": "Empty", "fileFormats": []}}]"#;
        let resources: Vec<AttachmentResource> = serde_json::from_str(body).unwrap();
        assert!(downloadable_attachments(resources).is_empty());
    }
}
