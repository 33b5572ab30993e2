//! Typed errors for the reference crawler.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while driving the crawl pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Record or content store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// PDF download failed at the transport level
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// LLM service unavailable or failed
    #[error("AI service error: {0}")]
    Ai(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// PDF bytes could not be turned into text
    #[error("text extraction failed: {0}")]
    TextExtraction(String),

    /// Document not found in the record store
    #[error("document not found: {id}")]
    DocumentNotFound { id: String },

    /// Structured model output did not match the expected schema
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Errors that can occur inside a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend operation failed (connection, I/O, query)
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Record or blob not found
    #[error("not found: {key}")]
    NotFound { key: String },

    /// Stored value could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that can occur while downloading a candidate PDF.
///
/// These are recorded on the owning reference's `failed_downloads` and never
/// abort the candidate loop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Download exceeded the fetch timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for PDF download attempts.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
