//! Corpus export as a single JSON document.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::types::document::Document;
use crate::types::reference::Reference;

/// A full snapshot of the corpus: every document and reference record,
/// annotations included.
#[derive(Debug, Serialize)]
pub struct CorpusExport {
    pub documents: Vec<Document>,
    pub references: Vec<Reference>,
    pub exported_at: DateTime<Utc>,
}

impl CorpusExport {
    pub fn new(documents: Vec<Document>, references: Vec<Reference>) -> Self {
        Self {
            documents,
            references,
            exported_at: Utc::now(),
        }
    }

    /// Pretty-printed JSON for files and downloads.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_export_serializes() {
        let export = CorpusExport::new(vec![], vec![]);
        let json = export.to_json().unwrap();
        assert!(json.contains("\"documents\": []"));
        assert!(json.contains("\"references\": []"));
        assert!(json.contains("exported_at"));
    }
}
