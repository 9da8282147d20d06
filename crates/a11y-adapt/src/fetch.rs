//! Remote media retrieval for images and videos.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::types::FetchError;

/// Image bytes plus the content type the server declared.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Result of streaming a remote file to disk.
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes_written: u64,
    pub content_type: Option<String>,
}

/// Source of remote media referenced by a document.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch a small resource fully into memory.
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError>;
    /// Stream a resource to `dest`, creating or truncating it.
    async fn download(&self, url: &str, dest: &Path) -> Result<Download, FetchError>;
}

/// [`MediaFetcher`] over plain HTTP(S).
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("a11y-adapt/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError> {
        let resp = self.get(url).await?;
        let content_type = header_content_type(&resp)
            .unwrap_or_else(|| guess_mime(url, "application/octet-stream").to_string());
        let bytes = resp.bytes().await?.to_vec();
        tracing::debug!("Fetched {} bytes ({content_type}) from {url}", bytes.len());
        Ok(FetchedMedia {
            bytes,
            content_type,
        })
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<Download, FetchError> {
        let mut resp = self.get(url).await?;
        let content_type = header_content_type(&resp);
        let mut file = tokio::fs::File::create(dest).await?;
        let mut bytes_written = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;
        tracing::debug!("Downloaded {bytes_written} bytes from {url} to {}", dest.display());
        Ok(Download {
            bytes_written,
            content_type,
        })
    }
}

fn header_content_type(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Best-effort MIME type from a URL's file extension.
pub fn guess_mime<'a>(url: &str, fallback: &'a str) -> &'a str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" | "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        _ => fallback,
    }
}
