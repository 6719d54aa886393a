//! HTTP client for the regulations.gov v4 API
//!
//! Every method resolves to one of three outcomes the orchestrator drives
//! on: data, `HarvestError::RateLimited` (the API's quota signal, carried
//! in the body of an otherwise well-formed response), or
//! `HarvestError::Transport` (network failure or a malformed payload). A
//! well-formed empty page is plain success with zero items.

use crate::api::endpoints;
use crate::api::types::{
    downloadable_attachments, Attachment, AttachmentResource, DetailResource, Envelope, Item,
    ItemDetail, ItemKind, ListedResource,
};
use regharvest_common::{HarvestError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via REGHARVEST_API_TIMEOUT_SECS environment variable.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Default regulations.gov API base URL
pub const DEFAULT_API_URL: &str = "https://api.regulations.gov/v4";

/// Items requested per listing page
pub const PAGE_SIZE: usize = 250;

/// Hard cap on listing pages per parent, bounding worst-case cost at
/// PAGE_SIZE * MAX_PAGES items
pub const MAX_PAGES: usize = 20;

/// API client for regulations.gov
pub struct RegulationsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RegulationsClient {
    /// Create a new API client with the given base URL and credential
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let timeout_secs = std::env::var("REGHARVEST_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| HarvestError::transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// The underlying HTTP client, shared with the file fetcher
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List all documents published under a docket, paging until the first
    /// empty page or the page cap
    pub async fn list_documents(&self, docket_id: &str) -> Result<Vec<Item>> {
        let items = self
            .list_paged(ItemKind::Document, |page| {
                endpoints::documents_url(&self.base_url, docket_id, page, &self.api_key)
            })
            .await?;

        info!(docket_id, count = items.len(), "retrieved document listing");
        Ok(items)
    }

    /// List all comments filed against a document, identified by the
    /// document's API-internal object id
    pub async fn list_comments(&self, document_object_id: &str) -> Result<Vec<Item>> {
        let items = self
            .list_paged(ItemKind::Comment, |page| {
                endpoints::comments_url(&self.base_url, document_object_id, page, &self.api_key)
            })
            .await?;

        debug!(
            object_id = document_object_id,
            count = items.len(),
            "retrieved comment listing"
        );
        Ok(items)
    }

    /// Fetch the full record behind an item's canonical self link
    pub async fn fetch_detail(&self, self_link: &str) -> Result<ItemDetail> {
        let url = endpoints::detail_url(self_link, &self.api_key);
        let resource: DetailResource = self.get_data(&url).await?;
        Ok(resource.into_detail(self_link))
    }

    /// Fetch an item's attachment list, excluding restricted entries
    pub async fn fetch_attachments(&self, self_link: &str) -> Result<Vec<Attachment>> {
        let url = endpoints::attachments_url(self_link, &self.api_key);
        let resources: Vec<AttachmentResource> = self.get_data(&url).await?;
        Ok(downloadable_attachments(resources))
    }

    /// Page through a listing endpoint. Stops at the first empty page;
    /// MAX_PAGES bounds a parent that never runs dry.
    async fn list_paged<F>(&self, kind: ItemKind, url_for_page: F) -> Result<Vec<Item>>
    where
        F: Fn(usize) -> String,
    {
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let resources: Vec<ListedResource> = self.get_data(&url_for_page(page)).await?;
            if resources.is_empty() {
                break;
            }
            items.extend(resources.into_iter().map(|r| r.into_item(kind)));
        }

        Ok(items)
    }

    /// Issue a GET and classify the payload. The rate-limit signal arrives
    /// as an error body (with a 429 status), so the body is decoded before
    /// any status check.
    async fn get_data<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HarvestError::transport(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HarvestError::transport(format!("failed to read response body: {}", e)))?;

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            HarvestError::transport(format!("undecodable response (HTTP {}): {}", status, e))
        })?;

        envelope.into_data()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing_page(ids: &[&str], server_uri: &str) -> serde_json::Value {
        json!({
            "data": ids.iter().map(|id| json!({
                "id": id,
                "attributes": {"objectId": format!("obj-{}", id)},
                "links": {"self": format!("{}/documents/{}", server_uri, id)}
            })).collect::<Vec<_>>()
        })
    }

    #[test]
    fn test_client_creation() {
        let client = RegulationsClient::new("https://api.example.gov/v4", "KEY").unwrap();
        assert_eq!(client.base_url(), "https://api.example.gov/v4");
    }

    #[tokio::test]
    async fn test_list_documents_stops_at_empty_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/documents"))
            .and(query_param("page[number]", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(listing_page(&["D-1", "D-2"], &server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .and(query_param("page[number]", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RegulationsClient::new(server.uri(), "KEY").unwrap();
        let items = client.list_documents("X-1").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "D-1");
        assert_eq!(items[0].kind, ItemKind::Document);
        assert_eq!(items[0].object_id.as_deref(), Some("obj-D-1"));
    }

    #[tokio::test]
    async fn test_rate_limit_body_wins_over_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": "OVER_RATE_LIMIT", "message": "try later"}
            })))
            .mount(&server)
            .await;

        let client = RegulationsClient::new(server.uri(), "KEY").unwrap();
        let err = client.list_documents("X-1").await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transport() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = RegulationsClient::new(server.uri(), "KEY").unwrap();
        let err = client.list_documents("X-1").await.unwrap_err();
        assert!(matches!(err, HarvestError::Transport(ref m) if m.contains("502")));
    }

    #[tokio::test]
    async fn test_fetch_detail_embeds_credential() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/comments/C-1"))
            .and(query_param("api_key", "SECRET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": "C-1",
                    "attributes": {"firstName": "Grace", "lastName": "Hopper"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RegulationsClient::new(server.uri(), "SECRET").unwrap();
        let self_link = format!("{}/comments/C-1", server.uri());
        let detail = client.fetch_detail(&self_link).await.unwrap();

        assert_eq!(detail.id, "C-1");
        assert_eq!(detail.first_name.as_deref(), Some("Grace"));
        assert_eq!(detail.last_name.as_deref(), Some("Hopper"));
        assert_eq!(detail.self_link, self_link);
    }

    #[tokio::test]
    async fn test_fetch_attachments_filters_restricted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/comments/C-1/attachments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"attributes": {
                        "title": "Letter",
                        "restrictReasonType": null,
                        "fileFormats": [{"fileUrl": "https://downloads.example.gov/letter.pdf"}]
                    }},
                    {"attributes": {
                        "title": "Sealed",
                        "restrictReasonType": "privacy",
                        "fileFormats": [{"fileUrl": "https://downloads.example.gov/sealed.pdf"}]
                    }}
                ]
            })))
            .mount(&server)
            .await;

        let client = RegulationsClient::new(server.uri(), "KEY").unwrap();
        let self_link = format!("{}/comments/C-1", server.uri());
        let attachments = client.fetch_attachments(&self_link).await.unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].title, "Letter");
    }
}
