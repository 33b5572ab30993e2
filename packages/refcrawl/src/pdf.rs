//! PDF text extraction backed by lopdf.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::traits::extractor::TextExtractor;

/// Extracts text page by page with lopdf, joining pages with blank lines.
///
/// Parsing runs on the blocking pool; lopdf is synchronous and large papers
/// can take a while.
#[derive(Default)]
pub struct LopdfTextExtractor;

impl LopdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn extract_sync(bytes: &[u8]) -> Result<String> {
    let pdf = lopdf::Document::load_mem(bytes)
        .map_err(|e| PipelineError::TextExtraction(format!("failed to parse PDF: {e}")))?;

    let pages = pdf.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for page_num in pages.keys() {
        match pdf.extract_text(&[*page_num]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                // One unreadable page does not sink the document
                debug!(page = page_num, error = %e, "skipping unreadable page");
            }
        }
    }

    if texts.is_empty() {
        return Err(PipelineError::TextExtraction(
            "no readable pages in PDF".to_string(),
        ));
    }

    Ok(texts.join("\n\n"))
}

#[async_trait]
impl TextExtractor for LopdfTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || extract_sync(&bytes))
            .await
            .map_err(|e| PipelineError::TextExtraction(format!("extraction task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_bytes_are_an_error() {
        let extractor = LopdfTextExtractor::new();
        let result = extractor.extract_text(b"not a pdf at all").await;
        assert!(matches!(result, Err(PipelineError::TextExtraction(_))));
    }
}
