//! Mock capability implementations for tests.
//!
//! Each mock returns canned responses and records calls, so pipeline tests
//! run without network access or a real model.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{FetchError, FetchResult, PipelineError, Result};
use crate::traits::ai::{Qualifier, ReferenceExtractor, TripletMiner};
use crate::traits::extractor::TextExtractor;
use crate::traits::fetcher::PaperFetcher;
use crate::types::qualification::Qualification;
use crate::types::reference::Citation;
use crate::types::triplet::{ContextTriplet, Triplet};

/// Text extractor that treats PDF bytes as UTF-8 text.
///
/// Tests store plain text as "PDF" bytes and get the same text back. Input
/// containing the failure marker errors instead, simulating a corrupt file.
#[derive(Default)]
pub struct MockTextExtractor {
    failure_marker: Option<String>,
    calls: AtomicUsize,
}

impl MockTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail extraction for any input containing `marker`.
    pub fn with_failure_marker(mut self, marker: impl Into<String>) -> Self {
        self.failure_marker = Some(marker.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for MockTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = String::from_utf8_lossy(bytes).into_owned();
        if let Some(marker) = &self.failure_marker {
            if text.contains(marker.as_str()) {
                return Err(PipelineError::TextExtraction(
                    "simulated corrupt PDF".to_string(),
                ));
            }
        }
        Ok(text)
    }
}

/// Qualifier with a fixed verdict, optionally keyed by text content.
pub struct MockQualifier {
    default_verdict: Qualification,
    verdicts: RwLock<HashMap<String, Qualification>>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl Default for MockQualifier {
    fn default() -> Self {
        Self {
            default_verdict: Qualification {
                is_relevant: true,
                confidence: 0.9,
                topics_found: vec!["consumer psychology".to_string()],
                reasoning: "mock verdict".to_string(),
            },
            verdicts: RwLock::new(HashMap::new()),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockQualifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default verdict.
    pub fn with_verdict(mut self, verdict: Qualification) -> Self {
        self.default_verdict = verdict;
        self
    }

    /// Return a specific verdict when the text contains `marker`.
    pub fn with_verdict_for(self, marker: impl Into<String>, verdict: Qualification) -> Self {
        self.verdicts.write().unwrap().insert(marker.into(), verdict);
        self
    }

    /// Fail every call with the given message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Qualifier for MockQualifier {
    async fn qualify(&self, text: &str) -> Result<Qualification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.error {
            return Err(PipelineError::Ai(message.clone().into()));
        }
        let verdicts = self.verdicts.read().unwrap();
        for (marker, verdict) in verdicts.iter() {
            if text.contains(marker.as_str()) {
                return Ok(verdict.clone());
            }
        }
        Ok(self.default_verdict.clone())
    }
}

/// Reference extractor returning canned citations keyed by text content.
///
/// Text matching no registered marker yields an empty list.
#[derive(Default)]
pub struct MockReferenceExtractor {
    citations: RwLock<HashMap<String, Vec<Citation>>>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockReferenceExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `citations` when the text contains `marker`.
    pub fn with_citations(self, marker: impl Into<String>, citations: Vec<Citation>) -> Self {
        self.citations
            .write()
            .unwrap()
            .insert(marker.into(), citations);
        self
    }

    /// Fail every call with the given message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReferenceExtractor for MockReferenceExtractor {
    async fn extract_references(&self, text: &str) -> Result<Vec<Citation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.error {
            return Err(PipelineError::Ai(message.clone().into()));
        }
        let citations = self.citations.read().unwrap();
        for (marker, list) in citations.iter() {
            if text.contains(marker.as_str()) {
                return Ok(list.clone());
            }
        }
        Ok(Vec::new())
    }
}

/// Triplet miner returning fixed lists.
#[derive(Default)]
pub struct MockTripletMiner {
    triplets: Vec<Triplet>,
    context_triplets: Vec<ContextTriplet>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockTripletMiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_triplets(mut self, triplets: Vec<Triplet>) -> Self {
        self.triplets = triplets;
        self
    }

    pub fn with_context_triplets(mut self, triplets: Vec<ContextTriplet>) -> Self {
        self.context_triplets = triplets;
        self
    }

    /// Fail every call with the given message (a transport-level failure).
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TripletMiner for MockTripletMiner {
    async fn mine_triplets(&self, _text: &str) -> Result<Vec<Triplet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.error {
            return Err(PipelineError::Ai(message.clone().into()));
        }
        Ok(self.triplets.clone())
    }

    async fn mine_context_triplets(&self, _text: &str) -> Result<Vec<ContextTriplet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.error {
            return Err(PipelineError::Ai(message.clone().into()));
        }
        Ok(self.context_triplets.clone())
    }
}

/// Scripted outcome for one URL in [`MockPaperFetcher`].
#[derive(Debug, Clone)]
pub enum FetchScript {
    /// Serve these bytes as a PDF
    Pdf(Vec<u8>),

    /// Respond, but not with a PDF
    NotPdf,

    /// Time out
    Timeout,

    /// Fail with a transport error
    TransportError(String),
}

/// Fetcher with scripted per-URL outcomes. Unregistered URLs behave like
/// non-PDF responses.
#[derive(Default)]
pub struct MockPaperFetcher {
    scripts: RwLock<HashMap<String, FetchScript>>,
    calls: RwLock<Vec<String>>,
}

impl MockPaperFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, url: impl Into<String>, script: FetchScript) -> Self {
        self.scripts.write().unwrap().insert(url.into(), script);
        self
    }

    /// Shorthand: serve `bytes` as a PDF for `url`.
    pub fn with_pdf(self, url: impl Into<String>, bytes: &[u8]) -> Self {
        self.with_script(url, FetchScript::Pdf(bytes.to_vec()))
    }

    /// URLs fetched so far.
    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PaperFetcher for MockPaperFetcher {
    async fn fetch_pdf(&self, url: &str) -> FetchResult<Option<Vec<u8>>> {
        self.calls.write().unwrap().push(url.to_string());
        let script = self.scripts.read().unwrap().get(url).cloned();
        match script {
            Some(FetchScript::Pdf(bytes)) => Ok(Some(bytes)),
            Some(FetchScript::NotPdf) | None => Ok(None),
            Some(FetchScript::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            Some(FetchScript::TransportError(message)) => Err(FetchError::Http(message.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_extractor_passthrough() {
        let extractor = MockTextExtractor::new().with_failure_marker("CORRUPT");
        assert_eq!(extractor.extract_text(b"hello").await.unwrap(), "hello");
        assert!(extractor.extract_text(b"CORRUPT bytes").await.is_err());
        assert_eq!(extractor.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetcher_scripts() {
        let fetcher = MockPaperFetcher::new()
            .with_pdf("https://a.example/p.pdf", b"%PDF")
            .with_script("https://b.example/slow.pdf", FetchScript::Timeout);

        assert_eq!(
            fetcher.fetch_pdf("https://a.example/p.pdf").await.unwrap(),
            Some(b"%PDF".to_vec())
        );
        assert!(matches!(
            fetcher.fetch_pdf("https://b.example/slow.pdf").await,
            Err(FetchError::Timeout { .. })
        ));
        assert_eq!(
            fetcher.fetch_pdf("https://c.example/page").await.unwrap(),
            None
        );
        assert_eq!(fetcher.fetched_urls().len(), 3);
    }
}
