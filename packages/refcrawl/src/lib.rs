//! # refcrawl
//!
//! A reference-crawling pipeline for academic papers. Seed PDFs go in; the
//! pipeline extracts their text, judges topical relevance, mines their
//! bibliographies, searches the web for each cited paper, and downloads
//! what it finds as the next crawl generation. Documents can additionally
//! be annotated with cause-effect triplets for knowledge-graph work.
//!
//! ## Architecture
//!
//! Everything is written against capability traits, so storage and model
//! providers swap freely:
//!
//! - [`traits::store`] - record persistence ([`MemoryStore`], `SqliteStore`)
//!   and content blobs ([`FsContentStore`])
//! - [`traits::ai`] - qualification, reference extraction, and triplet
//!   mining ([`ai::OpenAi`])
//! - [`traits::locator`] - web search for cited papers ([`GoogleCseLocator`])
//! - [`traits::fetcher`] - candidate PDF downloads ([`HttpPaperFetcher`])
//! - [`traits::extractor`] - PDF text extraction ([`LopdfTextExtractor`])
//!
//! The [`Orchestrator`] wires a capability set together and exposes the
//! batch operations; [`testing`] provides mocks for all of them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use refcrawl::{Orchestrator, MemoryStore, MemoryContentStore, LopdfTextExtractor};
//! use refcrawl::ai::OpenAi;
//! use refcrawl::{GoogleCseLocator, HttpPaperFetcher};
//!
//! let ai = Arc::new(OpenAi::from_env()?);
//! let orchestrator = Orchestrator::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryContentStore::new()),
//!     Arc::new(LopdfTextExtractor::new()),
//!     ai.clone(),
//!     ai.clone(),
//!     ai,
//!     Arc::new(GoogleCseLocator::from_env()?),
//!     Arc::new(HttpPaperFetcher::new()),
//! );
//!
//! let seed = orchestrator.upload_seed("survey.pdf", &pdf_bytes).await?;
//! orchestrator.run_extract_batch(10).await?;
//! ```

pub mod ai;
pub mod error;
pub mod export;
pub mod pdf;
pub mod pipeline;
pub mod security;
pub mod stats;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{FetchError, PipelineError, Result, StoreError};
pub use export::CorpusExport;
pub use pdf::LopdfTextExtractor;
pub use pipeline::{BatchReport, ItemFailure, Orchestrator};
pub use security::SecretString;
pub use stats::{compute_stats, CorpusStats};
pub use stores::{FsContentStore, MemoryContentStore, MemoryStore};
pub use traits::fetcher::HttpPaperFetcher;
pub use traits::locator::GoogleCseLocator;
pub use traits::{
    ContentStore, DocumentStore, PaperFetcher, PaperLocator, Qualifier, RecordStore,
    ReferenceExtractor, ReferenceStore, TextExtractor, TripletMiner,
};
pub use types::document::{
    file_id_for_url, Document, DocumentStatus, DocumentUpdate, NewDocument,
};
pub use types::qualification::{Qualification, QUALIFICATION_CONFIDENCE_THRESHOLD};
pub use types::reference::{
    Citation, FailedDownload, NewReference, Reference, ReferenceStatus, ReferenceUpdate,
    SearchHit,
};
pub use types::triplet::{ContextTriplet, Triplet, TripletGroup};

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;
