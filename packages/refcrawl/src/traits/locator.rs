//! Web search for published copies of a cited paper.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::error::{PipelineError, Result};
use crate::security::SecretString;
use crate::types::reference::SearchHit;

/// Candidate links kept per search.
pub const LOCATOR_RESULT_CAP: usize = 5;

/// Finds candidate PDF links for a citation.
#[async_trait]
pub trait PaperLocator: Send + Sync {
    /// Search the web for the cited paper, returning up to
    /// [`LOCATOR_RESULT_CAP`] candidate links.
    async fn locate(&self, citation: &str) -> Result<Vec<SearchHit>>;
}

/// A canned locator for tests: returns pre-registered hits per query,
/// empty for anything unknown.
#[derive(Default)]
pub struct MockPaperLocator {
    hits: RwLock<HashMap<String, Vec<SearchHit>>>,
    calls: RwLock<Vec<String>>,
}

impl MockPaperLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register hits for a query.
    pub fn with_hits(self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.write().unwrap().insert(query.into(), hits);
        self
    }

    /// Register bare URLs for a query.
    pub fn with_urls(self, query: impl Into<String>, urls: &[&str]) -> Self {
        let hits = urls.iter().map(|u| SearchHit::new(*u)).collect();
        self.with_hits(query, hits)
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PaperLocator for MockPaperLocator {
    async fn locate(&self, citation: &str) -> Result<Vec<SearchHit>> {
        self.calls.write().unwrap().push(citation.to_string());
        Ok(self
            .hits
            .read()
            .unwrap()
            .get(citation)
            .cloned()
            .unwrap_or_default())
    }
}

/// Google Custom Search backed locator.
///
/// Queries are suffixed with ` filetype:pdf` so the engine favors direct
/// PDF links.
pub struct GoogleCseLocator {
    api_key: SecretString,
    cse_id: SecretString,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CseResponse {
    items: Option<Vec<CseItem>>,
}

#[derive(Deserialize)]
struct CseItem {
    link: String,
    title: Option<String>,
}

impl GoogleCseLocator {
    pub fn new(api_key: impl Into<SecretString>, cse_id: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            cse_id: cse_id.into(),
            client: reqwest::Client::new(),
            base_url: "https://www.googleapis.com".to_string(),
        }
    }

    /// Read `GOOGLE_API_KEY` and `GOOGLE_CSE_ID` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| PipelineError::Config("GOOGLE_API_KEY not set".to_string()))?;
        let cse_id = std::env::var("GOOGLE_CSE_ID")
            .map_err(|_| PipelineError::Config("GOOGLE_CSE_ID not set".to_string()))?;
        Ok(Self::new(api_key, cse_id))
    }

    /// Override the API endpoint (tests point this at a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PaperLocator for GoogleCseLocator {
    async fn locate(&self, citation: &str) -> Result<Vec<SearchHit>> {
        let query = format!("{citation} filetype:pdf");
        debug!(query = %query, "searching for cited paper");

        let num = LOCATOR_RESULT_CAP.to_string();
        let response = self
            .client
            .get(format!("{}/customsearch/v1", self.base_url))
            .query(&[
                ("key", self.api_key.expose()),
                ("cx", self.cse_id.expose()),
                ("q", query.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::Ai(Box::new(e)))?
            .error_for_status()
            .map_err(|e| PipelineError::Ai(Box::new(e)))?;

        let body: CseResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Ai(Box::new(e)))?;

        let hits = body
            .items
            .unwrap_or_default()
            .into_iter()
            .filter(|item| Url::parse(&item.link).is_ok())
            .take(LOCATOR_RESULT_CAP)
            .map(|item| {
                let mut hit = SearchHit::new(item.link);
                if let Some(title) = item.title {
                    let title = title.replace(" PDF", "");
                    let title = title.trim();
                    if !title.is_empty() {
                        hit = hit.with_title(title);
                    }
                }
                hit
            })
            .collect();

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_registered_hits() {
        let locator = MockPaperLocator::new().with_urls("Smith 2020", &["https://a.example/p.pdf"]);

        let hits = locator.locate("Smith 2020").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://a.example/p.pdf");

        let none = locator.locate("unknown").await.unwrap();
        assert!(none.is_empty());
        assert_eq!(locator.queries(), vec!["Smith 2020", "unknown"]);
    }
}
