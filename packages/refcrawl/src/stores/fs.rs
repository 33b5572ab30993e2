//! Filesystem content store.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{pdf_key, txt_key, ContentStore};

/// Stores PDF and text blobs under a root directory, mirroring the shared
/// `pdf_files/` and `txt_files/` key scheme on disk.
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<String> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Backend(Box::new(e)))?;
        }
        fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Backend(Box::new(e))),
        }
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn put_pdf(&self, file_id: &str, bytes: &[u8]) -> StoreResult<String> {
        self.write(&pdf_key(file_id), bytes).await
    }

    async fn get_pdf(&self, file_id: &str) -> StoreResult<Vec<u8>> {
        self.read(&pdf_key(file_id)).await
    }

    async fn put_text(&self, file_id: &str, text: &str) -> StoreResult<String> {
        self.write(&txt_key(file_id), text.as_bytes()).await
    }

    async fn get_text(&self, file_id: &str) -> StoreResult<String> {
        let bytes = self.read(&txt_key(file_id)).await?;
        String::from_utf8(bytes).map_err(|e| StoreError::Backend(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_on_disk() {
        let dir = std::env::temp_dir().join(format!("refcrawl-fs-{}", uuid::Uuid::new_v4()));
        let store = FsContentStore::new(&dir);

        store.put_pdf("a.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(store.get_pdf("a.pdf").await.unwrap(), b"%PDF-1.4");

        store.put_text("a.pdf", "extracted text").await.unwrap();
        assert_eq!(store.get_text("a.pdf").await.unwrap(), "extracted text");

        assert!(matches!(
            store.get_pdf("missing.pdf").await,
            Err(StoreError::NotFound { .. })
        ));

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
