//! Qualification stage: annotates documents with a topic relevance verdict.
//!
//! Runs orthogonally to the main lifecycle. It never changes `status`; it
//! only sets the `qualified` flag, which gates reference mining.

use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::BatchReport;
use crate::traits::ai::Qualifier;
use crate::traits::store::{ContentStore, DocumentStore, RecordStore};
use crate::types::document::{Document, DocumentUpdate};

/// Qualify up to `limit` documents with text but no verdict.
pub async fn run_qualify_batch(
    limit: usize,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    qualifier: &dyn Qualifier,
) -> Result<BatchReport> {
    let batch = records.unqualified_documents(limit).await?;
    let mut report = BatchReport {
        attempted: batch.len(),
        ..Default::default()
    };

    for doc in batch {
        match qualify_one(&doc, records, content, qualifier).await {
            Ok(accepted) => {
                info!(file_id = %doc.file_id, accepted, "paper qualified");
                report.record_success();
            }
            Err(e) => {
                warn!(file_id = %doc.file_id, error = %e, "qualification failed");
                records
                    .update_document(doc.id, DocumentUpdate::failed(e.to_string()))
                    .await?;
                report.record_failure(doc.file_id.as_str(), e);
            }
        }
    }

    Ok(report)
}

async fn qualify_one(
    doc: &Document,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    qualifier: &dyn Qualifier,
) -> Result<bool> {
    let text = content.get_text(&doc.file_id).await?;
    let verdict = qualifier.qualify(&text).await?;
    let accepted = verdict.accepted();

    records
        .update_document(doc.id, DocumentUpdate::new().with_qualified(accepted))
        .await?;
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::{MemoryContentStore, MemoryStore};
    use crate::testing::MockQualifier;
    use crate::types::document::{DocumentStatus, NewDocument};
    use crate::types::qualification::Qualification;

    async fn doc_with_text(
        records: &MemoryStore,
        content: &MemoryContentStore,
        file_id: &str,
        text: &str,
        status: DocumentStatus,
    ) -> uuid::Uuid {
        let doc = records
            .insert_document(NewDocument::seed(file_id))
            .await
            .unwrap();
        content.put_text(file_id, text).await.unwrap();
        records
            .update_document(doc.id, DocumentUpdate::new().with_status(status))
            .await
            .unwrap();
        doc.id
    }

    #[tokio::test]
    async fn test_accepts_confident_relevant_verdicts() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let qualifier = MockQualifier::new()
            .with_verdict_for(
                "off topic",
                Qualification {
                    is_relevant: false,
                    confidence: 0.95,
                    topics_found: vec![],
                    reasoning: String::new(),
                },
            )
            .with_verdict_for(
                "hesitant",
                Qualification {
                    is_relevant: true,
                    confidence: 0.5,
                    topics_found: vec![],
                    reasoning: String::new(),
                },
            );

        let on_topic = doc_with_text(
            &records,
            &content,
            "a.pdf",
            "persuasion study",
            DocumentStatus::TextExtracted,
        )
        .await;
        let off_topic = doc_with_text(
            &records,
            &content,
            "b.pdf",
            "off topic physics",
            DocumentStatus::TextExtracted,
        )
        .await;
        let hesitant = doc_with_text(
            &records,
            &content,
            "c.pdf",
            "hesitant match",
            DocumentStatus::TextExtracted,
        )
        .await;

        let report = run_qualify_batch(10, &records, &content, &qualifier)
            .await
            .unwrap();
        assert_eq!(report.succeeded, 3);

        assert_eq!(
            records.document(on_topic).await.unwrap().unwrap().qualified,
            Some(true)
        );
        // Negative and low-confidence verdicts both record a rejection
        assert_eq!(
            records.document(off_topic).await.unwrap().unwrap().qualified,
            Some(false)
        );
        assert_eq!(
            records.document(hesitant).await.unwrap().unwrap().qualified,
            Some(false)
        );
    }

    #[tokio::test]
    async fn test_qualification_is_additive_on_processed_documents() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let qualifier = MockQualifier::new();

        // Already fully processed, but never judged
        let id = doc_with_text(
            &records,
            &content,
            "late.pdf",
            "text",
            DocumentStatus::TextProcessed,
        )
        .await;

        run_qualify_batch(10, &records, &content, &qualifier)
            .await
            .unwrap();

        let doc = records.document(id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::TextProcessed);
        assert_eq!(doc.qualified, Some(true));
    }

    #[tokio::test]
    async fn test_model_failure_marks_document() {
        let records = MemoryStore::new();
        let content = MemoryContentStore::new();
        let qualifier = MockQualifier::new().with_error("model unavailable");

        let id = doc_with_text(
            &records,
            &content,
            "a.pdf",
            "text",
            DocumentStatus::TextExtracted,
        )
        .await;

        let report = run_qualify_batch(10, &records, &content, &qualifier)
            .await
            .unwrap();
        assert_eq!(report.failures.len(), 1);

        let doc = records.document(id).await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::FailedProcessing);
        assert!(doc.qualified.is_none());
    }
}
