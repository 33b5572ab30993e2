//! Text extraction from PDF bytes.

use async_trait::async_trait;

use crate::error::Result;

/// Turns raw PDF bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of a PDF. Corrupt or unparseable input is an
    /// error; the caller decides what to do with the document.
    async fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}
