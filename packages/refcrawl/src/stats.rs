//! Aggregate corpus statistics.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::document::Document;
use crate::types::reference::Reference;

/// Counts over the whole corpus, computed from a full record snapshot.
#[derive(Debug, Serialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub total_references: usize,

    /// Documents per lifecycle status
    pub documents_by_status: BTreeMap<String, usize>,

    /// Documents per crawl depth
    pub documents_by_depth: BTreeMap<u32, usize>,

    /// Positively qualified documents
    pub qualified: usize,

    /// Rejected documents
    pub rejected: usize,

    /// Documents with text but no verdict yet
    pub qualification_pending: usize,

    /// Deepest crawl level reached
    pub max_depth: u32,

    /// References per lifecycle status
    pub references_by_status: BTreeMap<String, usize>,

    /// Total candidate downloads that failed across all references
    pub failed_downloads: usize,
}

/// Compute stats from full document and reference snapshots.
pub fn compute_stats(documents: &[Document], references: &[Reference]) -> CorpusStats {
    let mut documents_by_status = BTreeMap::new();
    let mut documents_by_depth = BTreeMap::new();
    let mut qualified = 0;
    let mut rejected = 0;
    let mut qualification_pending = 0;
    let mut max_depth = 0;

    for doc in documents {
        *documents_by_status
            .entry(doc.status.as_str().to_string())
            .or_insert(0) += 1;
        *documents_by_depth.entry(doc.depth).or_insert(0) += 1;
        max_depth = max_depth.max(doc.depth);

        match doc.qualified {
            Some(true) => qualified += 1,
            Some(false) => rejected += 1,
            None => qualification_pending += 1,
        }
    }

    let mut references_by_status = BTreeMap::new();
    let mut failed_downloads = 0;
    for reference in references {
        *references_by_status
            .entry(reference.status.as_str().to_string())
            .or_insert(0) += 1;
        failed_downloads += reference.failed_downloads.len();
    }

    CorpusStats {
        total_documents: documents.len(),
        total_references: references.len(),
        documents_by_status,
        documents_by_depth,
        qualified,
        rejected,
        qualification_pending,
        max_depth,
        references_by_status,
        failed_downloads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemoryStore;
    use crate::traits::store::{DocumentStore, ReferenceStore};
    use crate::types::document::{DocumentStatus, DocumentUpdate, NewDocument};
    use crate::types::reference::NewReference;

    #[tokio::test]
    async fn test_compute_stats() {
        let store = MemoryStore::new();

        let a = store.insert_document(NewDocument::seed("a.pdf")).await.unwrap();
        store
            .update_document(
                a.id,
                DocumentUpdate::new()
                    .with_status(DocumentStatus::TextProcessed)
                    .with_qualified(true),
            )
            .await
            .unwrap();

        let b = store
            .insert_document(NewDocument::discovered(
                "b.pdf",
                2,
                "https://example.com/b.pdf",
                uuid::Uuid::new_v4(),
            ))
            .await
            .unwrap();
        store
            .update_document(
                b.id,
                DocumentUpdate::new()
                    .with_status(DocumentStatus::TextExtracted)
                    .with_qualified(false),
            )
            .await
            .unwrap();

        store
            .insert_references(vec![NewReference {
                full_reference_text: "Doe 2020".to_string(),
                authors: "Doe".to_string(),
                title: "T".to_string(),
                year: "2020".to_string(),
                source_file: "a.pdf".to_string(),
                depth: 2,
            }])
            .await
            .unwrap();

        let documents = store.all_documents().await.unwrap();
        let references = store.all_references().await.unwrap();
        let stats = compute_stats(&documents, &references);

        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_references, 1);
        assert_eq!(stats.qualified, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.qualification_pending, 0);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.documents_by_status["TextProcessed"], 1);
        assert_eq!(stats.documents_by_depth[&1], 1);
        assert_eq!(stats.references_by_status["NewReference"], 1);
    }
}
