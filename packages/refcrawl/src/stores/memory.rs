//! In-memory stores, used by tests and short-lived runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{pdf_key, txt_key, ContentStore, DocumentStore, ReferenceStore};
use crate::types::document::{Document, DocumentStatus, DocumentUpdate, NewDocument};
use crate::types::reference::{
    NewReference, Reference, ReferenceStatus, ReferenceUpdate,
};
use crate::types::triplet::TripletGroup;

/// In-memory record store backed by `RwLock<HashMap>`.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    references: RwLock<HashMap<Uuid, Reference>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held.
    pub fn document_count(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Number of references held.
    pub fn reference_count(&self) -> usize {
        self.references.read().unwrap().len()
    }
}

/// Sort by creation time so batch selection is deterministic.
fn sorted_documents(mut docs: Vec<Document>) -> Vec<Document> {
    docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    docs
}

fn sorted_references(mut refs: Vec<Reference>) -> Vec<Reference> {
    refs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    refs
}

fn has_text(status: DocumentStatus) -> bool {
    matches!(
        status,
        DocumentStatus::TextExtracted | DocumentStatus::TextProcessed
    )
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(&self, new: NewDocument) -> StoreResult<Document> {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4(),
            file_id: new.file_id,
            status: DocumentStatus::Initial,
            depth: new.depth,
            qualified: None,
            title: new.title,
            source_url: new.source_url,
            source_reference: new.source_reference,
            txt_file_location: None,
            reference_count: None,
            error_message: None,
            triplets: None,
            context_triplets: None,
            created_at: now,
            updated_at: now,
        };
        self.documents.write().unwrap().insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn document(&self, id: Uuid) -> StoreResult<Option<Document>> {
        Ok(self.documents.read().unwrap().get(&id).cloned())
    }

    async fn update_document(&self, id: Uuid, update: DocumentUpdate) -> StoreResult<Document> {
        let mut docs = self.documents.write().unwrap();
        let doc = docs.get_mut(&id).ok_or_else(|| StoreError::NotFound {
            key: id.to_string(),
        })?;
        update.apply_to(doc);
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn documents_with_status(
        &self,
        status: DocumentStatus,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let docs = self.documents.read().unwrap();
        let matching = docs.values().filter(|d| d.status == status).cloned().collect();
        Ok(sorted_documents(matching).into_iter().take(limit).collect())
    }

    async fn unqualified_documents(&self, limit: usize) -> StoreResult<Vec<Document>> {
        let docs = self.documents.read().unwrap();
        let matching = docs
            .values()
            .filter(|d| has_text(d.status) && d.qualified.is_none())
            .cloned()
            .collect();
        Ok(sorted_documents(matching).into_iter().take(limit).collect())
    }

    async fn reference_ready_documents(&self, limit: usize) -> StoreResult<Vec<Document>> {
        let docs = self.documents.read().unwrap();
        let matching = docs
            .values()
            .filter(|d| d.status == DocumentStatus::TextExtracted && d.qualified == Some(true))
            .cloned()
            .collect();
        Ok(sorted_documents(matching).into_iter().take(limit).collect())
    }

    async fn triplet_pending_documents(
        &self,
        group: TripletGroup,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let docs = self.documents.read().unwrap();
        let matching = docs
            .values()
            .filter(|d| {
                has_text(d.status)
                    && match group {
                        TripletGroup::Basic => d.triplets.is_none(),
                        TripletGroup::Contextual => d.context_triplets.is_none(),
                    }
            })
            .cloned()
            .collect();
        Ok(sorted_documents(matching).into_iter().take(limit).collect())
    }

    async fn find_by_source_url(&self, url: &str) -> StoreResult<Option<Document>> {
        let docs = self.documents.read().unwrap();
        Ok(docs
            .values()
            .find(|d| d.source_url.as_deref() == Some(url))
            .cloned())
    }

    async fn all_documents(&self) -> StoreResult<Vec<Document>> {
        Ok(sorted_documents(
            self.documents.read().unwrap().values().cloned().collect(),
        ))
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn insert_references(&self, new: Vec<NewReference>) -> StoreResult<Vec<Reference>> {
        let now = Utc::now();
        let records: Vec<Reference> = new
            .into_iter()
            .map(|n| Reference {
                id: Uuid::new_v4(),
                full_reference_text: n.full_reference_text,
                authors: n.authors,
                title: n.title,
                year: n.year,
                source_file: n.source_file,
                status: ReferenceStatus::NewReference,
                depth: n.depth,
                search_results: Vec::new(),
                downloaded_files: Vec::new(),
                failed_downloads: Vec::new(),
                error_message: None,
                created_at: now,
                updated_at: now,
            })
            .collect();

        // Single write-lock section, so the batch lands all at once
        let mut refs = self.references.write().unwrap();
        for record in &records {
            refs.insert(record.id, record.clone());
        }
        Ok(records)
    }

    async fn reference(&self, id: Uuid) -> StoreResult<Option<Reference>> {
        Ok(self.references.read().unwrap().get(&id).cloned())
    }

    async fn update_reference(&self, id: Uuid, update: ReferenceUpdate) -> StoreResult<Reference> {
        let mut refs = self.references.write().unwrap();
        let reference = refs.get_mut(&id).ok_or_else(|| StoreError::NotFound {
            key: id.to_string(),
        })?;
        update.apply_to(reference);
        reference.updated_at = Utc::now();
        Ok(reference.clone())
    }

    async fn references_with_status(
        &self,
        status: ReferenceStatus,
        limit: usize,
    ) -> StoreResult<Vec<Reference>> {
        let refs = self.references.read().unwrap();
        let matching = refs.values().filter(|r| r.status == status).cloned().collect();
        Ok(sorted_references(matching).into_iter().take(limit).collect())
    }

    async fn all_references(&self) -> StoreResult<Vec<Reference>> {
        Ok(sorted_references(
            self.references.read().unwrap().values().cloned().collect(),
        ))
    }
}

/// In-memory content store keyed by the shared `pdf_files/` and `txt_files/`
/// key scheme.
#[derive(Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put_pdf(&self, file_id: &str, bytes: &[u8]) -> StoreResult<String> {
        let key = pdf_key(file_id);
        self.blobs.write().unwrap().insert(key.clone(), bytes.to_vec());
        Ok(key)
    }

    async fn get_pdf(&self, file_id: &str) -> StoreResult<Vec<u8>> {
        let key = pdf_key(file_id);
        self.blobs
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound { key })
    }

    async fn put_text(&self, file_id: &str, text: &str) -> StoreResult<String> {
        let key = txt_key(file_id);
        self.blobs
            .write()
            .unwrap()
            .insert(key.clone(), text.as_bytes().to_vec());
        Ok(key)
    }

    async fn get_text(&self, file_id: &str) -> StoreResult<String> {
        let key = txt_key(file_id);
        let bytes = self
            .blobs
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound { key })?;
        String::from_utf8(bytes).map_err(|e| StoreError::Backend(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_initial_status() {
        let store = MemoryStore::new();
        let doc = store
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();
        assert_eq!(doc.status, DocumentStatus::Initial);
        assert_eq!(doc.depth, 1);
        assert!(doc.qualified.is_none());
    }

    #[tokio::test]
    async fn test_status_query_respects_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_document(NewDocument::seed(format!("{i}.pdf")))
                .await
                .unwrap();
        }
        let batch = store
            .documents_with_status(DocumentStatus::Initial, 3)
            .await
            .unwrap();
        assert_eq!(batch.len(), 3);
    }

    #[tokio::test]
    async fn test_unqualified_excludes_failed_and_judged() {
        let store = MemoryStore::new();
        let pending = store
            .insert_document(NewDocument::seed("pending.pdf"))
            .await
            .unwrap();
        let judged = store
            .insert_document(NewDocument::seed("judged.pdf"))
            .await
            .unwrap();
        let failed = store
            .insert_document(NewDocument::seed("failed.pdf"))
            .await
            .unwrap();

        for id in [pending.id, judged.id] {
            store
                .update_document(
                    id,
                    DocumentUpdate::new().with_status(DocumentStatus::TextExtracted),
                )
                .await
                .unwrap();
        }
        store
            .update_document(judged.id, DocumentUpdate::new().with_qualified(false))
            .await
            .unwrap();
        store
            .update_document(failed.id, DocumentUpdate::failed("corrupt"))
            .await
            .unwrap();

        let batch = store.unqualified_documents(10).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, pending.id);
    }

    #[tokio::test]
    async fn test_reference_ready_requires_positive_verdict() {
        let store = MemoryStore::new();
        let yes = store.insert_document(NewDocument::seed("yes.pdf")).await.unwrap();
        let no = store.insert_document(NewDocument::seed("no.pdf")).await.unwrap();
        let unjudged = store
            .insert_document(NewDocument::seed("unjudged.pdf"))
            .await
            .unwrap();

        for id in [yes.id, no.id, unjudged.id] {
            store
                .update_document(
                    id,
                    DocumentUpdate::new().with_status(DocumentStatus::TextExtracted),
                )
                .await
                .unwrap();
        }
        store
            .update_document(yes.id, DocumentUpdate::new().with_qualified(true))
            .await
            .unwrap();
        store
            .update_document(no.id, DocumentUpdate::new().with_qualified(false))
            .await
            .unwrap();

        let batch = store.reference_ready_documents(10).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, yes.id);
    }

    #[tokio::test]
    async fn test_reference_batch_insert() {
        let store = MemoryStore::new();
        let refs = store
            .insert_references(vec![
                NewReference {
                    full_reference_text: "Smith 2020".to_string(),
                    authors: "Smith".to_string(),
                    title: "A".to_string(),
                    year: "2020".to_string(),
                    source_file: "a.pdf".to_string(),
                    depth: 2,
                },
                NewReference {
                    full_reference_text: "Jones 2021".to_string(),
                    authors: "Jones".to_string(),
                    title: "B".to_string(),
                    year: "2021".to_string(),
                    source_file: "a.pdf".to_string(),
                    depth: 2,
                },
            ])
            .await
            .unwrap();

        assert_eq!(refs.len(), 2);
        assert!(refs
            .iter()
            .all(|r| r.status == ReferenceStatus::NewReference));
        assert_eq!(store.reference_count(), 2);
    }

    #[tokio::test]
    async fn test_find_by_source_url() {
        let store = MemoryStore::new();
        let reference_id = Uuid::new_v4();
        store
            .insert_document(NewDocument::discovered(
                "x.pdf",
                2,
                "https://example.com/x.pdf",
                reference_id,
            ))
            .await
            .unwrap();

        let found = store
            .find_by_source_url("https://example.com/x.pdf")
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(store
            .find_by_source_url("https://example.com/y.pdf")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_content_store_round_trip() {
        let store = MemoryContentStore::new();
        let key = store.put_pdf("a.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(key, "pdf_files/a.pdf");
        assert_eq!(store.get_pdf("a.pdf").await.unwrap(), b"%PDF-1.4");

        store.put_text("a.pdf", "hello").await.unwrap();
        assert_eq!(store.get_text("a.pdf").await.unwrap(), "hello");

        assert!(matches!(
            store.get_pdf("missing.pdf").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
