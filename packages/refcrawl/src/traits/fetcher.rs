//! Downloading candidate PDF links.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Per-download timeout. Institutional repositories can be slow.
pub const PDF_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Downloads a candidate link if, and only if, it serves a PDF.
#[async_trait]
pub trait PaperFetcher: Send + Sync {
    /// Fetch the URL. `Ok(Some(bytes))` for a served PDF, `Ok(None)` when
    /// the URL responds but is not a PDF (wrong content type or non-200),
    /// `Err` for transport failures.
    async fn fetch_pdf(&self, url: &str) -> FetchResult<Option<Vec<u8>>>;
}

/// HTTP fetcher that accepts only `200 OK` responses with an
/// `application/pdf` content type.
pub struct HttpPaperFetcher {
    client: reqwest::Client,
}

impl HttpPaperFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PDF_FETCH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for HttpPaperFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaperFetcher for HttpPaperFetcher {
    async fn fetch_pdf(&self, url: &str) -> FetchResult<Option<Vec<u8>>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        if response.status() != reqwest::StatusCode::OK {
            debug!(url = %url, status = %response.status(), "skipping non-200 response");
            return Ok(None);
        }

        let is_pdf = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .eq_ignore_ascii_case("application/pdf")
            })
            .unwrap_or(false);

        if !is_pdf {
            debug!(url = %url, "skipping non-PDF content type");
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        Ok(Some(bytes.to_vec()))
    }
}
