//! Storage traits: record persistence and content blobs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::types::document::{Document, DocumentStatus, DocumentUpdate, NewDocument};
use crate::types::reference::{NewReference, Reference, ReferenceStatus, ReferenceUpdate};
use crate::types::triplet::TripletGroup;

/// Key under which a document's PDF bytes are stored.
pub fn pdf_key(file_id: &str) -> String {
    format!("pdf_files/{file_id}")
}

/// Key under which a document's extracted text is stored.
pub fn txt_key(file_id: &str) -> String {
    format!("txt_files/{file_id}.txt")
}

/// Persistence for document records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document, assigning id, `Initial` status, and timestamps.
    async fn insert_document(&self, new: NewDocument) -> StoreResult<Document>;

    /// Fetch one document by id.
    async fn document(&self, id: Uuid) -> StoreResult<Option<Document>>;

    /// Apply a partial update; stamps `updated_at`.
    async fn update_document(&self, id: Uuid, update: DocumentUpdate) -> StoreResult<Document>;

    /// Documents in a given status, up to `limit`.
    async fn documents_with_status(
        &self,
        status: DocumentStatus,
        limit: usize,
    ) -> StoreResult<Vec<Document>>;

    /// Documents with text available but no qualification verdict yet.
    ///
    /// Matches status `TextExtracted` or `TextProcessed` where `qualified`
    /// is absent. Qualification runs orthogonally to the main lifecycle.
    async fn unqualified_documents(&self, limit: usize) -> StoreResult<Vec<Document>>;

    /// Documents ready for reference mining: `TextExtracted` and positively
    /// qualified.
    async fn reference_ready_documents(&self, limit: usize) -> StoreResult<Vec<Document>>;

    /// Documents with text available that have not yet been through the
    /// given triplet mining pass.
    async fn triplet_pending_documents(
        &self,
        group: TripletGroup,
        limit: usize,
    ) -> StoreResult<Vec<Document>>;

    /// Look up a document by the URL it was downloaded from.
    ///
    /// Used to make crawl discovery idempotent: a URL already tracked is
    /// never inserted twice.
    async fn find_by_source_url(&self, url: &str) -> StoreResult<Option<Document>>;

    /// Every document in the store (stats and export).
    async fn all_documents(&self) -> StoreResult<Vec<Document>>;
}

/// Persistence for reference records.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Insert a batch of references atomically: all inserted or none.
    async fn insert_references(&self, new: Vec<NewReference>) -> StoreResult<Vec<Reference>>;

    /// Fetch one reference by id.
    async fn reference(&self, id: Uuid) -> StoreResult<Option<Reference>>;

    /// Apply a partial update; stamps `updated_at`.
    async fn update_reference(&self, id: Uuid, update: ReferenceUpdate) -> StoreResult<Reference>;

    /// References in a given status, up to `limit`.
    async fn references_with_status(
        &self,
        status: ReferenceStatus,
        limit: usize,
    ) -> StoreResult<Vec<Reference>>;

    /// Every reference in the store (stats and export).
    async fn all_references(&self) -> StoreResult<Vec<Reference>>;
}

/// Combined record persistence. Implemented for free by anything that does
/// both halves.
pub trait RecordStore: DocumentStore + ReferenceStore {}

impl<T: DocumentStore + ReferenceStore> RecordStore for T {}

/// Blob storage for PDF bytes and extracted text, keyed by [`pdf_key`] /
/// [`txt_key`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a document's PDF bytes; returns the storage key.
    async fn put_pdf(&self, file_id: &str, bytes: &[u8]) -> StoreResult<String>;

    /// Fetch a document's PDF bytes.
    async fn get_pdf(&self, file_id: &str) -> StoreResult<Vec<u8>>;

    /// Store a document's extracted text; returns the storage key.
    async fn put_text(&self, file_id: &str, text: &str) -> StoreResult<String>;

    /// Fetch a document's extracted text.
    async fn get_text(&self, file_id: &str) -> StoreResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_keys() {
        assert_eq!(pdf_key("a.pdf"), "pdf_files/a.pdf");
        assert_eq!(txt_key("a.pdf"), "txt_files/a.pdf.txt");
    }
}
