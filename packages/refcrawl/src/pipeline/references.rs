//! Reference mining stage: `TextExtracted` -> `TextProcessed`.
//!
//! Only positively qualified documents are selected. Extracted citations
//! are inserted as a single atomic batch before the document advances, so a
//! `TextProcessed` document always has its references on record.

use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::BatchReport;
use crate::traits::ai::ReferenceExtractor;
use crate::traits::store::{ContentStore, DocumentStore, RecordStore, ReferenceStore};
use crate::types::document::{Document, DocumentStatus, DocumentUpdate};
use crate::types::reference::NewReference;

/// Mine references for up to `limit` qualified documents.
pub async fn run_reference_batch(
    limit: usize,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    extractor: &dyn ReferenceExtractor,
) -> Result<BatchReport> {
    let batch = records.reference_ready_documents(limit).await?;
    let mut report = BatchReport {
        attempted: batch.len(),
        ..Default::default()
    };

    for doc in batch {
        match process_one(&doc, records, content, extractor).await {
            Ok(count) => {
                info!(file_id = %doc.file_id, references = count, "references mined");
                report.record_success();
            }
            Err(e) => {
                warn!(file_id = %doc.file_id, error = %e, "reference mining failed");
                records
                    .update_document(doc.id, DocumentUpdate::failed(e.to_string()))
                    .await?;
                report.record_failure(doc.file_id.as_str(), e);
            }
        }
    }

    Ok(report)
}

async fn process_one(
    doc: &Document,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    extractor: &dyn ReferenceExtractor,
) -> Result<u32> {
    let text = content.get_text(&doc.file_id).await?;
    let citations = extractor.extract_references(&text).await?;

    // Children sit one step further from the seed than their source
    let child_depth = doc.depth + 1;
    let new_references: Vec<NewReference> = citations
        .into_iter()
        .map(|c| NewReference::from_citation(c, doc.file_id.as_str(), child_depth))
        .collect();
    let count = new_references.len() as u32;

    if !new_references.is_empty() {
        records.insert_references(new_references).await?;
    }

    records
        .update_document(
            doc.id,
            DocumentUpdate::new()
                .with_status(DocumentStatus::TextProcessed)
                .with_reference_count(count),
        )
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::{MemoryContentStore, MemoryStore};
    use crate::testing::MockReferenceExtractor;
    use crate::types::document::NewDocument;
    use crate::types::reference::{Citation, ReferenceStatus};

    fn citation(title: &str) -> Citation {
        Citation {
            reference_text: format!("{title}, Journal of Things, 2020."),
            authors: "Doe, J.".to_string(),
            title: title.to_string(),
            year: "2020".to_string(),
        }
    }

    async fn ready_doc(
        records: &MemoryStore,
        content: &MemoryContentStore,
        file_id: &str,
        text: &str,
    ) -> uuid::Uuid {
        let doc = records
            .insert_document(NewDocument::seed(file_id))
            .await
            .unwrap();
        content.put_text(file_id, text).await.unwrap();
        records
            .update_document(
                doc.id,
                DocumentUpdate::new()
                    .with_status(DocumentStatus::TextExtracted)
                    .with_qualified(true),
            )
            .await
            .unwrap();
        doc.id
    }

    #[tokio::test]
    async fn test_references_inserted_and_document_advanced() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let extractor = MockReferenceExtractor::new()
            .with_citations("bibliography", vec![citation("A"), citation("B")]);

        let id = ready_doc(&records, &content, "a.pdf", "text with bibliography").await;

        let report = run_reference_batch(10, &records, &content, &extractor)
            .await
            .unwrap();
        assert_eq!(report.succeeded, 1);

        let doc = records.document(id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::TextProcessed);
        assert_eq!(doc.reference_count, Some(2));

        let refs = records
            .references_with_status(ReferenceStatus::NewReference, 10)
            .await
            .unwrap();
        assert_eq!(refs.len(), 2);
        for r in &refs {
            assert_eq!(r.source_file, "a.pdf");
            assert_eq!(r.depth, 2); // seed depth 1 + 1
        }
    }

    #[tokio::test]
    async fn test_zero_citations_still_advances() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let extractor = MockReferenceExtractor::new();

        let id = ready_doc(&records, &content, "a.pdf", "no bibliography here").await;

        run_reference_batch(10, &records, &content, &extractor)
            .await
            .unwrap();

        let doc = records.document(id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::TextProcessed);
        assert_eq!(doc.reference_count, Some(0));
        assert_eq!(records.reference_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_model_output_fails_the_document() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let extractor = MockReferenceExtractor::new().with_error("unparseable response");

        let id = ready_doc(&records, &content, "a.pdf", "text").await;

        let report = run_reference_batch(10, &records, &content, &extractor)
            .await
            .unwrap();
        assert_eq!(report.failures.len(), 1);

        let doc = records.document(id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::FailedProcessing);
        assert_eq!(records.reference_count(), 0);
    }

    #[tokio::test]
    async fn test_unqualified_documents_are_skipped() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let extractor = MockReferenceExtractor::new();

        let doc = records
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();
        content.put_text("a.pdf", "text").await.unwrap();
        records
            .update_document(
                doc.id,
                DocumentUpdate::new().with_status(DocumentStatus::TextExtracted),
            )
            .await
            .unwrap();

        let report = run_reference_batch(10, &records, &content, &extractor)
            .await
            .unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(extractor.call_count(), 0);
    }
}
