//! Attachment file fetcher
//!
//! Streams a remote file to local storage, skipping the network entirely
//! when the destination already exists so re-runs are free. Bodies stream
//! through a `.part` file that is renamed into place on success; a failed
//! transfer never leaves a partial file that would shadow a future retry.

use futures::StreamExt;
use regharvest_common::{HarvestError, Result};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

use crate::progress;

/// What the fetcher did for one attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was transferred
    Downloaded,
    /// The destination already existed; no network call was made
    AlreadyPresent,
}

/// Fetch `url` into `dest`, reporting byte progress when the server
/// announces a total size. An unknown size is written in one pass without
/// progress reporting.
pub async fn fetch(http: &Client, url: &str, dest: &Path) -> Result<FetchOutcome> {
    if dest.exists() {
        debug!(dest = %dest.display(), "file already downloaded, skipping");
        return Ok(FetchOutcome::AlreadyPresent);
    }

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| HarvestError::transport(format!("download request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(HarvestError::transport(format!(
            "download of {} failed: HTTP {}",
            url,
            response.status()
        )));
    }

    let part_path = dest.with_extension(part_extension(dest));
    let result = write_body(response, &part_path, dest).await;
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(&part_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %part_path.display(), error = %e, "could not remove partial download");
            }
        }
        return result;
    }

    std::fs::rename(&part_path, dest)?;
    Ok(FetchOutcome::Downloaded)
}

async fn write_body(
    response: reqwest::Response,
    part_path: &Path,
    dest: &Path,
) -> Result<FetchOutcome> {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    match response.content_length() {
        Some(total) => {
            let pb = progress::create_download_progress(total, &file_name);
            let mut file = std::fs::File::create(part_path)?;
            let mut downloaded = 0u64;
            let mut stream = response.bytes_stream();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk
                    .map_err(|e| HarvestError::transport(format!("download interrupted: {}", e)))?;
                file.write_all(&chunk)?;
                downloaded += chunk.len() as u64;
                pb.set_position(downloaded);
            }

            pb.finish_with_message(format!(
                "Downloaded {} ({})",
                file_name,
                progress::format_bytes(downloaded)
            ));
        },
        None => {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| HarvestError::transport(format!("download interrupted: {}", e)))?;
            std::fs::write(part_path, &bytes)?;
            debug!(file = %file_name, bytes = bytes.len(), "downloaded without length header");
        },
    }

    Ok(FetchOutcome::Downloaded)
}

/// Local file name for an attachment: the title (path separators replaced)
/// plus the extension inferred from the download URL, when it has one.
pub fn attachment_file_name(title: &str, url: &str) -> String {
    let stem = title.replace(['/', '\\'], "_");

    let ext = url
        .rsplit_once('.')
        .map(|(_, e)| e.split(['?', '#']).next().unwrap_or(""))
        .filter(|e| !e.is_empty() && !e.contains('/'));

    match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

fn part_extension(dest: &Path) -> String {
    match dest.extension() {
        Some(ext) => format!("{}.part", ext.to_string_lossy()),
        None => "part".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_attachment_file_name_infers_extension() {
        assert_eq!(
            attachment_file_name("Letter", "https://downloads.example.gov/files/letter.pdf"),
            "Letter.pdf"
        );
        assert_eq!(
            attachment_file_name("Data", "https://downloads.example.gov/d.csv?download=1"),
            "Data.csv"
        );
    }

    #[test]
    fn test_attachment_file_name_without_extension() {
        assert_eq!(
            attachment_file_name("Raw dump", "https://example/gov/no-dot-after-path"),
            "Raw dump"
        );
    }

    #[test]
    fn test_attachment_file_name_sanitizes_separators() {
        assert_eq!(
            attachment_file_name("a/b\\c", "https://downloads.example.gov/x.pdf"),
            "a_b_c.pdf"
        );
    }

    #[tokio::test]
    async fn test_fetch_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/letter.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PDF BYTES".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("Letter.pdf");
        let http = Client::new();

        let outcome = fetch(&http, &format!("{}/letter.pdf", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::Downloaded);
        assert_eq!(std::fs::read(&dest).unwrap(), b"PDF BYTES");
    }

    #[tokio::test]
    async fn test_fetch_skips_existing_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("Letter.pdf");
        std::fs::write(&dest, b"ORIGINAL").unwrap();
        let http = Client::new();

        let outcome = fetch(&http, &format!("{}/letter.pdf", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::AlreadyPresent);
        assert_eq!(std::fs::read(&dest).unwrap(), b"ORIGINAL");
    }

    #[tokio::test]
    async fn test_fetch_http_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("Gone.pdf");
        let http = Client::new();

        let err = fetch(&http, &format!("{}/gone.pdf", server.uri()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, HarvestError::Transport(_)));
        assert!(!dest.exists());
    }
}
