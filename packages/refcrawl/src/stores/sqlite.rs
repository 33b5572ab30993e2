//! SQLite record store.
//!
//! A file-based backend for single-operator crawls. Record ids are stored as
//! UUID text, timestamps as RFC 3339 text, and list-valued fields as JSON
//! text columns.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{DocumentStore, ReferenceStore};
use crate::types::document::{Document, DocumentStatus, DocumentUpdate, NewDocument};
use crate::types::reference::{
    FailedDownload, NewReference, Reference, ReferenceStatus, ReferenceUpdate, SearchHit,
};
use crate::types::triplet::{ContextTriplet, Triplet, TripletGroup};

/// SQLite-backed document and reference store.
pub struct SqliteStore {
    pool: SqlitePool,
}

fn backend(e: impl std::error::Error + Send + Sync + 'static) -> StoreError {
    StoreError::Backend(Box::new(e))
}

impl SqliteStore {
    /// Create a store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://./refcrawl.db?mode=rwc` - File-based, create if missing
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(backend)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> StoreResult<Self> {
        Self::new("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                file_id TEXT NOT NULL,
                status TEXT NOT NULL,
                depth INTEGER NOT NULL,
                qualified INTEGER,
                title TEXT,
                source_url TEXT,
                source_reference TEXT,
                txt_file_location TEXT,
                reference_count INTEGER,
                error_message TEXT,
                triplets TEXT,
                context_triplets TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
            CREATE INDEX IF NOT EXISTS idx_documents_source_url ON documents(source_url);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        // "references" is a SQL keyword, hence the table name
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS paper_references (
                id TEXT PRIMARY KEY,
                full_reference_text TEXT NOT NULL,
                authors TEXT NOT NULL,
                title TEXT NOT NULL,
                year TEXT NOT NULL,
                source_file TEXT NOT NULL,
                status TEXT NOT NULL,
                depth INTEGER NOT NULL,
                search_results TEXT NOT NULL DEFAULT '[]',
                downloaded_files TEXT NOT NULL DEFAULT '[]',
                failed_downloads TEXT NOT NULL DEFAULT '[]',
                error_message TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_paper_references_status ON paper_references(status);
            CREATE INDEX IF NOT EXISTS idx_paper_references_source_file ON paper_references(source_file);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const DOCUMENT_COLUMNS: &str = "id, file_id, status, depth, qualified, title, source_url, \
     source_reference, txt_file_location, reference_count, error_message, triplets, \
     context_triplets, created_at, updated_at";

const REFERENCE_COLUMNS: &str = "id, full_reference_text, authors, title, year, source_file, \
     status, depth, search_results, downloaded_files, failed_downloads, error_message, \
     created_at, updated_at";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    file_id: String,
    status: String,
    depth: i64,
    qualified: Option<i64>,
    title: Option<String>,
    source_url: Option<String>,
    source_reference: Option<String>,
    txt_file_location: Option<String>,
    reference_count: Option<i64>,
    error_message: Option<String>,
    triplets: Option<String>,
    context_triplets: Option<String>,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(raw: &str) -> StoreResult<chrono::DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(backend)
}

fn parse_uuid(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(backend)
}

impl DocumentRow {
    fn into_document(self) -> StoreResult<Document> {
        let status: DocumentStatus = self
            .status
            .parse()
            .map_err(|e: String| StoreError::Backend(e.into()))?;

        let triplets: Option<Vec<Triplet>> = self
            .triplets
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let context_triplets: Option<Vec<ContextTriplet>> = self
            .context_triplets
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Document {
            id: parse_uuid(&self.id)?,
            file_id: self.file_id,
            status,
            depth: self.depth as u32,
            qualified: self.qualified.map(|q| q != 0),
            title: self.title,
            source_url: self.source_url,
            source_reference: self
                .source_reference
                .as_deref()
                .map(parse_uuid)
                .transpose()?,
            txt_file_location: self.txt_file_location,
            reference_count: self.reference_count.map(|c| c as u32),
            error_message: self.error_message,
            triplets,
            context_triplets,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReferenceRow {
    id: String,
    full_reference_text: String,
    authors: String,
    title: String,
    year: String,
    source_file: String,
    status: String,
    depth: i64,
    search_results: String,
    downloaded_files: String,
    failed_downloads: String,
    error_message: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ReferenceRow {
    fn into_reference(self) -> StoreResult<Reference> {
        let status: ReferenceStatus = self
            .status
            .parse()
            .map_err(|e: String| StoreError::Backend(e.into()))?;

        let search_results: Vec<SearchHit> = serde_json::from_str(&self.search_results)?;
        let downloaded_files: Vec<String> = serde_json::from_str(&self.downloaded_files)?;
        let failed_downloads: Vec<FailedDownload> = serde_json::from_str(&self.failed_downloads)?;

        Ok(Reference {
            id: parse_uuid(&self.id)?,
            full_reference_text: self.full_reference_text,
            authors: self.authors,
            title: self.title,
            year: self.year,
            source_file: self.source_file,
            status,
            depth: self.depth as u32,
            search_results,
            downloaded_files,
            failed_downloads,
            error_message: self.error_message,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl SqliteStore {
    async fn write_document(&self, doc: &Document) -> StoreResult<()> {
        let triplets = doc
            .triplets
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let context_triplets = doc
            .context_triplets
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            UPDATE documents SET
                status = ?, qualified = ?, title = ?, txt_file_location = ?,
                reference_count = ?, error_message = ?, triplets = ?,
                context_triplets = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(doc.status.as_str())
        .bind(doc.qualified.map(i64::from))
        .bind(&doc.title)
        .bind(&doc.txt_file_location)
        .bind(doc.reference_count.map(|c| c as i64))
        .bind(&doc.error_message)
        .bind(&triplets)
        .bind(&context_triplets)
        .bind(doc.updated_at.to_rfc3339())
        .bind(doc.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn fetch_documents(&self, sql: &str, binds: &[&str], limit: usize) -> StoreResult<Vec<Document>> {
        let mut query = sqlx::query_as::<_, DocumentRow>(sql);
        for bind in binds {
            query = query.bind(bind.to_string());
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(|r| r.into_document()).collect()
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert_document(&self, new: NewDocument) -> StoreResult<Document> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO documents (id, file_id, status, depth, title, source_url,
                                   source_reference, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&new.file_id)
        .bind(DocumentStatus::Initial.as_str())
        .bind(new.depth as i64)
        .bind(&new.title)
        .bind(&new.source_url)
        .bind(new.source_reference.map(|r| r.to_string()))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(Document {
            id,
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
        })
    }

    async fn document(&self, id: Uuid) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(|r| r.into_document()).transpose()
    }

    async fn update_document(&self, id: Uuid, update: DocumentUpdate) -> StoreResult<Document> {
        let mut doc = self
            .document(id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                key: id.to_string(),
            })?;
        update.apply_to(&mut doc);
        doc.updated_at = Utc::now();
        self.write_document(&doc).await?;
        Ok(doc)
    }

    async fn documents_with_status(
        &self,
        status: DocumentStatus,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        self.fetch_documents(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE status = ? \
                 ORDER BY created_at, id LIMIT ?"
            ),
            &[status.as_str()],
            limit,
        )
        .await
    }

    async fn unqualified_documents(&self, limit: usize) -> StoreResult<Vec<Document>> {
        self.fetch_documents(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents \
                 WHERE status IN (?, ?) AND qualified IS NULL \
                 ORDER BY created_at, id LIMIT ?"
            ),
            &[
                DocumentStatus::TextExtracted.as_str(),
                DocumentStatus::TextProcessed.as_str(),
            ],
            limit,
        )
        .await
    }

    async fn reference_ready_documents(&self, limit: usize) -> StoreResult<Vec<Document>> {
        self.fetch_documents(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents \
                 WHERE status = ? AND qualified = 1 \
                 ORDER BY created_at, id LIMIT ?"
            ),
            &[DocumentStatus::TextExtracted.as_str()],
            limit,
        )
        .await
    }

    async fn triplet_pending_documents(
        &self,
        group: TripletGroup,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let column = match group {
            TripletGroup::Basic => "triplets",
            TripletGroup::Contextual => "context_triplets",
        };
        self.fetch_documents(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents \
                 WHERE status IN (?, ?) AND {column} IS NULL \
                 ORDER BY created_at, id LIMIT ?"
            ),
            &[
                DocumentStatus::TextExtracted.as_str(),
                DocumentStatus::TextProcessed.as_str(),
            ],
            limit,
        )
        .await
    }

    async fn find_by_source_url(&self, url: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE source_url = ? LIMIT 1"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(|r| r.into_document()).transpose()
    }

    async fn all_documents(&self) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(|r| r.into_document()).collect()
    }
}

#[async_trait]
impl ReferenceStore for SqliteStore {
    async fn insert_references(&self, new: Vec<NewReference>) -> StoreResult<Vec<Reference>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(backend)?;
        let mut records = Vec::with_capacity(new.len());

        for n in new {
            let id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO paper_references (id, full_reference_text, authors, title, year,
                                              source_file, status, depth, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id.to_string())
            .bind(&n.full_reference_text)
            .bind(&n.authors)
            .bind(&n.title)
            .bind(&n.year)
            .bind(&n.source_file)
            .bind(ReferenceStatus::NewReference.as_str())
            .bind(n.depth as i64)
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

            records.push(Reference {
                id,
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
            });
        }

        tx.commit().await.map_err(backend)?;
        Ok(records)
    }

    async fn reference(&self, id: Uuid) -> StoreResult<Option<Reference>> {
        let row = sqlx::query_as::<_, ReferenceRow>(&format!(
            "SELECT {REFERENCE_COLUMNS} FROM paper_references WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(|r| r.into_reference()).transpose()
    }

    async fn update_reference(&self, id: Uuid, update: ReferenceUpdate) -> StoreResult<Reference> {
        let mut reference = self
            .reference(id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                key: id.to_string(),
            })?;
        update.apply_to(&mut reference);
        reference.updated_at = Utc::now();

        let search_results = serde_json::to_string(&reference.search_results)?;
        let downloaded_files = serde_json::to_string(&reference.downloaded_files)?;
        let failed_downloads = serde_json::to_string(&reference.failed_downloads)?;

        sqlx::query(
            r#"
            UPDATE paper_references SET
                status = ?, search_results = ?, downloaded_files = ?,
                failed_downloads = ?, error_message = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(reference.status.as_str())
        .bind(&search_results)
        .bind(&downloaded_files)
        .bind(&failed_downloads)
        .bind(&reference.error_message)
        .bind(reference.updated_at.to_rfc3339())
        .bind(reference.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(reference)
    }

    async fn references_with_status(
        &self,
        status: ReferenceStatus,
        limit: usize,
    ) -> StoreResult<Vec<Reference>> {
        let rows = sqlx::query_as::<_, ReferenceRow>(&format!(
            "SELECT {REFERENCE_COLUMNS} FROM paper_references WHERE status = ? \
             ORDER BY created_at, id LIMIT ?"
        ))
        .bind(status.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(|r| r.into_reference()).collect()
    }

    async fn all_references(&self) -> StoreResult<Vec<Reference>> {
        let rows = sqlx::query_as::<_, ReferenceRow>(&format!(
            "SELECT {REFERENCE_COLUMNS} FROM paper_references ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(|r| r.into_reference()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteStore {
        SqliteStore::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        let store = test_store().await;
        let doc = store
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();

        let fetched = store.document(doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.file_id, "a.pdf");
        assert_eq!(fetched.status, DocumentStatus::Initial);
        assert_eq!(fetched.depth, 1);
        assert!(fetched.qualified.is_none());
    }

    #[tokio::test]
    async fn test_update_persists_annotations() {
        let store = test_store().await;
        let doc = store
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();

        store
            .update_document(
                doc.id,
                DocumentUpdate::new()
                    .with_status(DocumentStatus::TextExtracted)
                    .with_txt_file_location("txt_files/a.pdf.txt"),
            )
            .await
            .unwrap();
        store
            .update_document(doc.id, DocumentUpdate::new().with_qualified(true))
            .await
            .unwrap();

        let fetched = store.document(doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, DocumentStatus::TextExtracted);
        assert_eq!(fetched.qualified, Some(true));
        assert_eq!(
            fetched.txt_file_location.as_deref(),
            Some("txt_files/a.pdf.txt")
        );
    }

    #[tokio::test]
    async fn test_triplets_survive_serialization() {
        let store = test_store().await;
        let doc = store
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();

        store
            .update_document(
                doc.id,
                DocumentUpdate::new()
                    .with_status(DocumentStatus::TextExtracted)
                    .with_triplets(vec![Triplet {
                        subject: "Scarcity Message".to_string(),
                        predicate: "increases".to_string(),
                        object: "Impulsive Purchase".to_string(),
                    }]),
            )
            .await
            .unwrap();

        let fetched = store.document(doc.id).await.unwrap().unwrap();
        let triplets = fetched.triplets.unwrap();
        assert_eq!(triplets.len(), 1);
        assert_eq!(triplets[0].subject, "Scarcity Message");
        // Contextual pass still pending for this document
        let pending = store
            .triplet_pending_documents(TripletGroup::Contextual, 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert!(store
            .triplet_pending_documents(TripletGroup::Basic, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_reference_lifecycle() {
        let store = test_store().await;
        let refs = store
            .insert_references(vec![NewReference {
                full_reference_text: "Smith, J. (2020). A paper.".to_string(),
                authors: "Smith, J.".to_string(),
                title: "A paper".to_string(),
                year: "2020".to_string(),
                source_file: "a.pdf".to_string(),
                depth: 2,
            }])
            .await
            .unwrap();
        let id = refs[0].id;

        let pending = store
            .references_with_status(ReferenceStatus::NewReference, 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        store
            .update_reference(
                id,
                ReferenceUpdate::new()
                    .with_status(ReferenceStatus::ProcessedReference)
                    .with_search_results(vec![SearchHit::new("https://example.com/p.pdf")])
                    .with_downloaded_files(vec!["abc.pdf".to_string()]),
            )
            .await
            .unwrap();

        let fetched = store.reference(id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ReferenceStatus::ProcessedReference);
        assert_eq!(fetched.search_results.len(), 1);
        assert_eq!(fetched.downloaded_files, vec!["abc.pdf"]);
        assert!(store
            .references_with_status(ReferenceStatus::NewReference, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_qualification_queries() {
        let store = test_store().await;
        let doc = store
            .insert_document(NewDocument::seed("a.pdf"))
            .await
            .unwrap();
        store
            .update_document(
                doc.id,
                DocumentUpdate::new().with_status(DocumentStatus::TextExtracted),
            )
            .await
            .unwrap();

        assert_eq!(store.unqualified_documents(10).await.unwrap().len(), 1);
        assert!(store.reference_ready_documents(10).await.unwrap().is_empty());

        store
            .update_document(doc.id, DocumentUpdate::new().with_qualified(true))
            .await
            .unwrap();

        assert!(store.unqualified_documents(10).await.unwrap().is_empty());
        assert_eq!(store.reference_ready_documents(10).await.unwrap().len(), 1);
    }
}
