//! Remote image download for `GET /download`.
//!
//! Each request streams the upstream body into its own anonymous temporary
//! file (unlinked at creation), so concurrent downloads never share a path
//! and the bytes disappear as soon as the response body is dropped.

use std::io::SeekFrom;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info};

const FALLBACK_FILE_NAME: &str = "image.png";

/// Errors that can occur while fetching a remote image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The `url` parameter is not an absolute http(s) URL.
    #[error("invalid download URL: {0}")]
    InvalidUrl(String),

    /// The request failed before a complete body arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned {0}")]
    Status(StatusCode),

    /// Writing or rewinding the temporary file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A downloaded image, positioned at the start of its temporary file.
#[derive(Debug)]
pub struct FetchedImage {
    pub file: File,
    pub len: u64,
    pub content_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: Client,
}

impl ImageFetcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedImage, FetchError> {
        let url = parse_download_url(raw_url)?;
        let file_name = file_name_for(&url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_owned();

        let std_file = tokio::task::spawn_blocking(tempfile::tempfile)
            .await
            .map_err(std::io::Error::other)??;
        let mut file = File::from_std(std_file);

        let mut len = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            len += chunk.len() as u64;
        }
        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;

        info!(bytes = len, content_type = %content_type, "image downloaded");
        Ok(FetchedImage { file, len, content_type, file_name })
    }
}

fn parse_download_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme {other:?}"))),
    }
}

/// Last path segment restricted to a header-safe character set.
fn file_name_for(url: &Url) -> String {
    let name: String = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        debug!(%url, "no usable file name in URL");
        FALLBACK_FILE_NAME.to_owned()
    } else {
        name
    }
}
