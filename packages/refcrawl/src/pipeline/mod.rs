//! Batch pipeline stages and the orchestrator facade.
//!
//! Every stage follows the same shape: select a bounded batch by status,
//! process each item independently, and report per-item outcomes. One bad
//! item never aborts its batch.

pub mod crawl;
pub mod extract;
pub mod qualify;
pub mod references;
pub mod triplets;

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::export::CorpusExport;
use crate::stats::{compute_stats, CorpusStats};
use crate::traits::ai::{Qualifier, ReferenceExtractor, TripletMiner};
use crate::traits::extractor::TextExtractor;
use crate::traits::fetcher::PaperFetcher;
use crate::traits::locator::PaperLocator;
use crate::traits::store::{ContentStore, DocumentStore, RecordStore, ReferenceStore};
use crate::types::document::{Document, DocumentStatus, DocumentUpdate, NewDocument};
use crate::types::triplet::TripletGroup;

/// One item that failed within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    /// The document file id or reference text that failed
    pub item: String,

    /// Error text
    pub error: String,
}

/// Outcome of one batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Items selected for this batch
    pub attempted: usize,

    /// Items that completed their transition
    pub succeeded: usize,

    /// Per-item failures
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, item: impl Into<String>, error: impl ToString) {
        self.failures.push(ItemFailure {
            item: item.into(),
            error: error.to_string(),
        });
    }

    /// Whether every attempted item succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns the capability set and drives the pipeline.
///
/// Batches run sequentially; the crawler is a single-operator tool and the
/// stores assume one writer.
pub struct Orchestrator {
    records: Arc<dyn RecordStore>,
    content: Arc<dyn ContentStore>,
    extractor: Arc<dyn TextExtractor>,
    qualifier: Arc<dyn Qualifier>,
    references: Arc<dyn ReferenceExtractor>,
    miner: Arc<dyn TripletMiner>,
    locator: Arc<dyn PaperLocator>,
    fetcher: Arc<dyn PaperFetcher>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        records: Arc<dyn RecordStore>,
        content: Arc<dyn ContentStore>,
        extractor: Arc<dyn TextExtractor>,
        qualifier: Arc<dyn Qualifier>,
        references: Arc<dyn ReferenceExtractor>,
        miner: Arc<dyn TripletMiner>,
        locator: Arc<dyn PaperLocator>,
        fetcher: Arc<dyn PaperFetcher>,
    ) -> Self {
        Self {
            records,
            content,
            extractor,
            qualifier,
            references,
            miner,
            locator,
            fetcher,
        }
    }

    /// Store a directly uploaded PDF and register it as a depth-1 seed.
    pub async fn upload_seed(&self, file_name: &str, pdf_bytes: &[u8]) -> Result<Document> {
        self.content.put_pdf(file_name, pdf_bytes).await?;
        let doc = self
            .records
            .insert_document(NewDocument::seed(file_name))
            .await?;
        Ok(doc)
    }

    /// Extract text for up to `limit` documents in `Initial`.
    pub async fn run_extract_batch(&self, limit: usize) -> Result<BatchReport> {
        extract::run_extract_batch(
            limit,
            self.records.as_ref(),
            self.content.as_ref(),
            self.extractor.as_ref(),
        )
        .await
    }

    /// Qualify up to `limit` documents with text but no verdict.
    pub async fn run_qualify_batch(&self, limit: usize) -> Result<BatchReport> {
        qualify::run_qualify_batch(
            limit,
            self.records.as_ref(),
            self.content.as_ref(),
            self.qualifier.as_ref(),
        )
        .await
    }

    /// Mine references for up to `limit` qualified documents.
    pub async fn run_reference_batch(&self, limit: usize) -> Result<BatchReport> {
        references::run_reference_batch(
            limit,
            self.records.as_ref(),
            self.content.as_ref(),
            self.references.as_ref(),
        )
        .await
    }

    /// Search and download candidates for up to `limit` new references.
    pub async fn run_crawl_batch(&self, limit: usize) -> Result<BatchReport> {
        crawl::run_crawl_batch(
            limit,
            self.records.as_ref(),
            self.content.as_ref(),
            self.locator.as_ref(),
            self.fetcher.as_ref(),
        )
        .await
    }

    /// Mine triplets of the given group for up to `limit` documents.
    pub async fn run_triplet_batch(&self, group: TripletGroup, limit: usize) -> Result<BatchReport> {
        triplets::run_triplet_batch(
            group,
            limit,
            self.records.as_ref(),
            self.content.as_ref(),
            self.miner.as_ref(),
        )
        .await
    }

    /// Operator reset: move a document to the given status and clear its
    /// recorded error. The only way out of `FailedProcessing`.
    pub async fn reset_document(&self, id: Uuid, status: DocumentStatus) -> Result<Document> {
        let doc = self
            .records
            .update_document(
                id,
                DocumentUpdate::new().with_status(status).clearing_error(),
            )
            .await?;
        Ok(doc)
    }

    /// Aggregate counts over the whole corpus.
    pub async fn stats(&self) -> Result<CorpusStats> {
        let documents = self.records.all_documents().await?;
        let references = self.records.all_references().await?;
        Ok(compute_stats(&documents, &references))
    }

    /// Snapshot every record for export.
    pub async fn export(&self) -> Result<CorpusExport> {
        let documents = self.records.all_documents().await?;
        let references = self.records.all_references().await?;
        Ok(CorpusExport::new(documents, references))
    }
}
