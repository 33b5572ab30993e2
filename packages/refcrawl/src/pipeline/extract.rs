//! Text extraction stage: `Initial` -> `TextExtracted`.

use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::BatchReport;
use crate::traits::extractor::TextExtractor;
use crate::traits::store::{ContentStore, DocumentStore, RecordStore};
use crate::types::document::{Document, DocumentStatus, DocumentUpdate};

/// Extract text for up to `limit` documents awaiting it.
pub async fn run_extract_batch(
    limit: usize,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    extractor: &dyn TextExtractor,
) -> Result<BatchReport> {
    let batch = records
        .documents_with_status(DocumentStatus::Initial, limit)
        .await?;
    let mut report = BatchReport {
        attempted: batch.len(),
        ..Default::default()
    };

    for doc in batch {
        match extract_one(&doc, records, content, extractor).await {
            Ok(()) => report.record_success(),
            Err(e) => {
                warn!(file_id = %doc.file_id, error = %e, "text extraction failed");
                records
                    .update_document(doc.id, DocumentUpdate::failed(e.to_string()))
                    .await?;
                report.record_failure(doc.file_id.as_str(), e);
            }
        }
    }

    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        "extract batch done"
    );
    Ok(report)
}

async fn extract_one(
    doc: &Document,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    extractor: &dyn TextExtractor,
) -> Result<()> {
    let pdf_bytes = content.get_pdf(&doc.file_id).await?;
    let text = extractor.extract_text(&pdf_bytes).await?;
    let location = content.put_text(&doc.file_id, &text).await?;

    records
        .update_document(
            doc.id,
            DocumentUpdate::new()
                .with_status(DocumentStatus::TextExtracted)
                .with_txt_file_location(location),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::{MemoryContentStore, MemoryStore};
    use crate::testing::MockTextExtractor;
    use crate::types::document::NewDocument;

    #[tokio::test]
    async fn test_extract_moves_document_forward() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let extractor = MockTextExtractor::new();

        let doc = records
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();
        content.put_pdf("a.pdf", b"paper text").await.unwrap();

        let report = run_extract_batch(10, &records, &content, &extractor)
            .await
            .unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 1);

        let updated = records.document(doc.id).await.unwrap().unwrap();
        assert_eq!(updated.status, DocumentStatus::TextExtracted);
        assert_eq!(
            updated.txt_file_location.as_deref(),
            Some("txt_files/a.pdf.txt")
        );
        assert_eq!(content.get_text("a.pdf").await.unwrap(), "paper text");
    }

    #[tokio::test]
    async fn test_one_bad_document_does_not_abort_the_batch() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let extractor = MockTextExtractor::new().with_failure_marker("CORRUPT");

        let good_a = records
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();
        let bad = records
            .insert_document(NewDocument::seed("b.pdf"))
            .await
            .unwrap();
        let good_c = records
            .insert_document(NewDocument::seed("c.pdf"))
            .await
            .unwrap();
        content.put_pdf("a.pdf", b"text a").await.unwrap();
        content.put_pdf("b.pdf", b"CORRUPT").await.unwrap();
        content.put_pdf("c.pdf", b"text c").await.unwrap();

        let report = run_extract_batch(10, &records, &content, &extractor)
            .await
            .unwrap();
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item, "b.pdf");

        for id in [good_a.id, good_c.id] {
            let doc = records.document(id).await.unwrap().unwrap();
            assert_eq!(doc.status, DocumentStatus::TextExtracted);
        }
        let failed = records.document(bad.id).await.unwrap().unwrap();
        assert_eq!(failed.status, DocumentStatus::FailedProcessing);
        assert!(failed.error_message.is_some());
    }

    #[tokio::test]
    async fn test_failed_documents_are_not_reselected() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let extractor = MockTextExtractor::new();

        let doc = records
            .insert_document(NewDocument::seed("missing.pdf"))
            .await
            .unwrap();
        // No PDF stored, so the first run fails the document

        let report = run_extract_batch(10, &records, &content, &extractor)
            .await
            .unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            records.document(doc.id).await.unwrap().unwrap().status,
            DocumentStatus::FailedProcessing
        );

        let rerun = run_extract_batch(10, &records, &content, &extractor)
            .await
            .unwrap();
        assert_eq!(rerun.attempted, 0);
    }
}
