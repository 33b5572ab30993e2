//! Document types - tracked paper instances with lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::types::triplet::{ContextTriplet, Triplet};

/// Lifecycle state of a tracked paper.
///
/// `Initial → TextExtracted → TextProcessed`, with `FailedProcessing`
/// reachable from any in-flight transition. `FailedProcessing` is terminal:
/// no stage query re-selects it, and only an explicit operator reset leaves
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Uploaded or discovered; PDF bytes stored, no text yet
    Initial,

    /// Plain text extracted and stored alongside the PDF
    TextExtracted,

    /// References mined from the text
    TextProcessed,

    /// A stage threw for this document; requires manual reset
    FailedProcessing,
}

impl DocumentStatus {
    /// Stable string form, used for persistence and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Initial => "Initial",
            DocumentStatus::TextExtracted => "TextExtracted",
            DocumentStatus::TextProcessed => "TextProcessed",
            DocumentStatus::FailedProcessing => "FailedProcessing",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Initial" => Ok(DocumentStatus::Initial),
            "TextExtracted" => Ok(DocumentStatus::TextExtracted),
            "TextProcessed" => Ok(DocumentStatus::TextProcessed),
            "FailedProcessing" => Ok(DocumentStatus::FailedProcessing),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// A tracked paper instance (seed upload or crawl-discovered).
///
/// Annotation fields are `Option` so that "field absent" is distinguishable
/// from "field set to a default" - the qualification batch query depends on
/// this distinction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned record id
    pub id: Uuid,

    /// Stable content identifier; for crawl-discovered documents this is
    /// derived from the source URL, for seeds it is caller-supplied
    pub file_id: String,

    /// Lifecycle status
    pub status: DocumentStatus,

    /// Discovery distance from a seed upload (seed = 1)
    pub depth: u32,

    /// Topic relevance verdict; absent until the qualification stage runs
    pub qualified: Option<bool>,

    /// Paper title, when known (from search results)
    pub title: Option<String>,

    /// URL the PDF was downloaded from; absent for direct uploads
    pub source_url: Option<String>,

    /// The reference record that led to discovery; absent for seeds
    pub source_reference: Option<Uuid>,

    /// Locator of the extracted text blob
    pub txt_file_location: Option<String>,

    /// Number of references mined from this document
    pub reference_count: Option<u32>,

    /// Error text from the stage that moved this document to
    /// `FailedProcessing`
    pub error_message: Option<String>,

    /// Open-form cause-effect triplets; absent until mined
    pub triplets: Option<Vec<Triplet>>,

    /// Vocabulary-constrained triplets with frequency/context; absent until
    /// mined
    pub context_triplets: Option<Vec<ContextTriplet>>,

    /// When the record was created (store-assigned)
    pub created_at: DateTime<Utc>,

    /// When the record was last written (store-assigned)
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether this document is a root of the discovery graph.
    pub fn is_seed(&self) -> bool {
        self.source_reference.is_none()
    }
}

/// Fields for a document about to be inserted.
///
/// The store assigns `id`, `status = Initial`, and the timestamps.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub file_id: String,
    pub depth: u32,
    pub title: Option<String>,
    pub source_url: Option<String>,
    pub source_reference: Option<Uuid>,
}

impl NewDocument {
    /// A directly uploaded seed paper (depth 1, no provenance).
    pub fn seed(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            depth: 1,
            title: None,
            source_url: None,
            source_reference: None,
        }
    }

    /// A paper discovered by crawling a reference.
    pub fn discovered(
        file_id: impl Into<String>,
        depth: u32,
        source_url: impl Into<String>,
        source_reference: Uuid,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            depth,
            title: None,
            source_url: Some(source_url.into()),
            source_reference: Some(source_reference),
        }
    }

    /// Set the title (usually from the search hit).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A partial document update.
///
/// `None` fields are left untouched; the store stamps `updated_at` on every
/// write. `clear_error` explicitly removes `error_message` (used by operator
/// resets), since an `Option` field cannot express "unset".
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    pub status: Option<DocumentStatus>,
    pub qualified: Option<bool>,
    pub title: Option<String>,
    pub txt_file_location: Option<String>,
    pub reference_count: Option<u32>,
    pub error_message: Option<String>,
    pub triplets: Option<Vec<Triplet>>,
    pub context_triplets: Option<Vec<ContextTriplet>>,
    pub clear_error: bool,
}

impl DocumentUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lifecycle status.
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the qualification verdict.
    pub fn with_qualified(mut self, qualified: bool) -> Self {
        self.qualified = Some(qualified);
        self
    }

    /// Set the extracted text locator.
    pub fn with_txt_file_location(mut self, location: impl Into<String>) -> Self {
        self.txt_file_location = Some(location.into());
        self
    }

    /// Set the mined reference count.
    pub fn with_reference_count(mut self, count: u32) -> Self {
        self.reference_count = Some(count);
        self
    }

    /// Set the failure message.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set open-form triplets.
    pub fn with_triplets(mut self, triplets: Vec<Triplet>) -> Self {
        self.triplets = Some(triplets);
        self
    }

    /// Set vocabulary-constrained triplets.
    pub fn with_context_triplets(mut self, triplets: Vec<ContextTriplet>) -> Self {
        self.context_triplets = Some(triplets);
        self
    }

    /// Remove any recorded error message.
    pub fn clearing_error(mut self) -> Self {
        self.clear_error = true;
        self
    }

    /// Shorthand for the per-item failure transition: mark the document
    /// `FailedProcessing` and record the error text.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new()
            .with_status(DocumentStatus::FailedProcessing)
            .with_error_message(message)
    }

    /// Apply this update to a document in place (timestamps excluded; the
    /// store owns those).
    pub fn apply_to(&self, doc: &mut Document) {
        if let Some(status) = self.status {
            doc.status = status;
        }
        if let Some(qualified) = self.qualified {
            doc.qualified = Some(qualified);
        }
        if let Some(ref title) = self.title {
            doc.title = Some(title.clone());
        }
        if let Some(ref location) = self.txt_file_location {
            doc.txt_file_location = Some(location.clone());
        }
        if let Some(count) = self.reference_count {
            doc.reference_count = Some(count);
        }
        if let Some(ref message) = self.error_message {
            doc.error_message = Some(message.clone());
        }
        if let Some(ref triplets) = self.triplets {
            doc.triplets = Some(triplets.clone());
        }
        if let Some(ref triplets) = self.context_triplets {
            doc.context_triplets = Some(triplets.clone());
        }
        if self.clear_error {
            doc.error_message = None;
        }
    }
}

/// Derive a deterministic file id from a source URL.
///
/// Re-discovering the same URL yields the same id, so duplicate discoveries
/// are naturally collapsed.
pub fn file_id_for_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}.pdf", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_is_deterministic() {
        let a = file_id_for_url("https://example.com/paper.pdf");
        let b = file_id_for_url("https://example.com/paper.pdf");
        assert_eq!(a, b);
        assert!(a.ends_with(".pdf"));
        assert_eq!(a.len(), 64 + 4); // SHA-256 hex + extension
    }

    #[test]
    fn test_file_id_differs_by_url() {
        let a = file_id_for_url("https://example.com/a.pdf");
        let b = file_id_for_url("https://example.com/b.pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Initial,
            DocumentStatus::TextExtracted,
            DocumentStatus::TextProcessed,
            DocumentStatus::FailedProcessing,
        ] {
            assert_eq!(status.as_str().parse::<DocumentStatus>(), Ok(status));
        }
        assert!("Bogus".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn test_update_apply_is_partial() {
        let mut doc = Document {
            id: Uuid::new_v4(),
            file_id: "a.pdf".to_string(),
            status: DocumentStatus::TextExtracted,
            depth: 1,
            qualified: None,
            title: None,
            source_url: None,
            source_reference: None,
            txt_file_location: Some("txt_files/a.pdf.txt".to_string()),
            reference_count: None,
            error_message: None,
            triplets: None,
            context_triplets: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        DocumentUpdate::new().with_qualified(true).apply_to(&mut doc);

        // Qualification is additive: status and other fields untouched
        assert_eq!(doc.status, DocumentStatus::TextExtracted);
        assert_eq!(doc.qualified, Some(true));
        assert_eq!(
            doc.txt_file_location.as_deref(),
            Some("txt_files/a.pdf.txt")
        );
    }

    #[test]
    fn test_failed_update() {
        let update = DocumentUpdate::failed("boom");
        assert_eq!(update.status, Some(DocumentStatus::FailedProcessing));
        assert_eq!(update.error_message.as_deref(), Some("boom"));
    }
}
