//! API endpoint URL builders
//!
//! Helper functions to construct regulations.gov v4 endpoint URLs. Every
//! call embeds the API key credential; list endpoints take an explicit
//! 1-based page number.

use crate::api::client::PAGE_SIZE;

/// Build a paginated document listing URL for a docket
pub fn documents_url(base_url: &str, docket_id: &str, page: usize, api_key: &str) -> String {
    format!(
        "{}/documents?filter[docketId]={}&page[size]={}&page[number]={}&api_key={}",
        base_url,
        urlencoding::encode(docket_id),
        PAGE_SIZE,
        page,
        api_key
    )
}

/// Build a paginated comment listing URL for a document's object id
pub fn comments_url(base_url: &str, object_id: &str, page: usize, api_key: &str) -> String {
    format!(
        "{}/comments?filter[commentOnId]={}&page[size]={}&page[number]={}&api_key={}",
        base_url,
        urlencoding::encode(object_id),
        PAGE_SIZE,
        page,
        api_key
    )
}

/// Build a detail URL from an item's canonical self link
pub fn detail_url(self_link: &str, api_key: &str) -> String {
    format!("{}?api_key={}", self_link, api_key)
}

/// Build the attachments sub-endpoint URL from an item's canonical self link
pub fn attachments_url(self_link: &str, api_key: &str) -> String {
    format!("{}/attachments?api_key={}", self_link, api_key)
}
