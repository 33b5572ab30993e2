//! Reference types - citations extracted from documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle state of a citation.
///
/// `NewReference → ProcessedReference`; `FailedProcessing` only if the web
/// search itself throws. Individual download failures are recorded on the
/// reference but do not fail it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceStatus {
    /// Extracted, not yet searched
    NewReference,

    /// Searched and all candidates attempted, successfully or not
    ProcessedReference,

    /// The search step threw; requires manual reset
    FailedProcessing,
}

impl ReferenceStatus {
    /// Stable string form, used for persistence and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceStatus::NewReference => "NewReference",
            ReferenceStatus::ProcessedReference => "ProcessedReference",
            ReferenceStatus::FailedProcessing => "FailedProcessing",
        }
    }
}

impl fmt::Display for ReferenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NewReference" => Ok(ReferenceStatus::NewReference),
            "ProcessedReference" => Ok(ReferenceStatus::ProcessedReference),
            "FailedProcessing" => Ok(ReferenceStatus::FailedProcessing),
            other => Err(format!("unknown reference status: {other}")),
        }
    }
}

/// A citation as returned by the reference extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Verbatim citation text
    pub reference_text: String,

    /// Author list as written
    pub authors: String,

    /// Paper title
    pub title: String,

    /// Publication year as written (kept as text; citations are messy)
    pub year: String,
}

/// A candidate link returned by the paper locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Candidate PDF URL
    pub url: String,

    /// Result title, if the search provider gave one
    pub title: Option<String>,
}

impl SearchHit {
    /// Create a new hit for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A recorded download failure for one candidate link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDownload {
    /// The candidate URL that failed
    pub url: String,

    /// Transport error text
    pub error: String,

    /// When the attempt failed
    pub failed_at: DateTime<Utc>,
}

/// A citation extracted from a document's text, subject to its own crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Store-assigned record id
    pub id: Uuid,

    /// Verbatim citation text (the search query)
    pub full_reference_text: String,

    /// Author list as written
    pub authors: String,

    /// Paper title
    pub title: String,

    /// Publication year as written
    pub year: String,

    /// `file_id` of the document this citation was extracted from
    pub source_file: String,

    /// Lifecycle status
    pub status: ReferenceStatus,

    /// Source document's depth + 1
    pub depth: u32,

    /// Full candidate list from the last search
    pub search_results: Vec<SearchHit>,

    /// `file_id`s of documents created from this reference
    pub downloaded_files: Vec<String>,

    /// Append-only log of failed download attempts
    pub failed_downloads: Vec<FailedDownload>,

    /// Error text when the search step itself threw
    pub error_message: Option<String>,

    /// When the record was created (store-assigned)
    pub created_at: DateTime<Utc>,

    /// When the record was last written (store-assigned)
    pub updated_at: DateTime<Utc>,
}

/// Fields for a reference about to be inserted.
///
/// The store assigns `id`, `status = NewReference`, empty crawl outputs, and
/// the timestamps.
#[derive(Debug, Clone)]
pub struct NewReference {
    pub full_reference_text: String,
    pub authors: String,
    pub title: String,
    pub year: String,
    pub source_file: String,
    pub depth: u32,
}

impl NewReference {
    /// Build an insertable reference from an extracted citation.
    pub fn from_citation(citation: Citation, source_file: impl Into<String>, depth: u32) -> Self {
        Self {
            full_reference_text: citation.reference_text,
            authors: citation.authors,
            title: citation.title,
            year: citation.year,
            source_file: source_file.into(),
            depth,
        }
    }
}

/// A partial reference update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ReferenceUpdate {
    pub status: Option<ReferenceStatus>,
    pub search_results: Option<Vec<SearchHit>>,
    pub downloaded_files: Option<Vec<String>>,
    pub failed_downloads: Option<Vec<FailedDownload>>,
    pub error_message: Option<String>,
}

impl ReferenceUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lifecycle status.
    pub fn with_status(mut self, status: ReferenceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the candidate list from the last search.
    pub fn with_search_results(mut self, hits: Vec<SearchHit>) -> Self {
        self.search_results = Some(hits);
        self
    }

    /// Set the downloaded file ids.
    pub fn with_downloaded_files(mut self, files: Vec<String>) -> Self {
        self.downloaded_files = Some(files);
        self
    }

    /// Replace the failure log (callers append to the existing log before
    /// writing, keeping it accumulative across retries).
    pub fn with_failed_downloads(mut self, failures: Vec<FailedDownload>) -> Self {
        self.failed_downloads = Some(failures);
        self
    }

    /// Shorthand for the search-step failure transition.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut update = Self::new().with_status(ReferenceStatus::FailedProcessing);
        update.error_message = Some(message.into());
        update
    }

    /// Apply this update to a reference in place (timestamps excluded).
    pub fn apply_to(&self, reference: &mut Reference) {
        if let Some(status) = self.status {
            reference.status = status;
        }
        if let Some(ref hits) = self.search_results {
            reference.search_results = hits.clone();
        }
        if let Some(ref files) = self.downloaded_files {
            reference.downloaded_files = files.clone();
        }
        if let Some(ref failures) = self.failed_downloads {
            reference.failed_downloads = failures.clone();
        }
        if let Some(ref message) = self.error_message {
            reference.error_message = Some(message.clone());
        }
    }
}
