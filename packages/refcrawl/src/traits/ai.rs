//! Language-model capabilities: qualification, reference extraction, and
//! triplet mining.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::qualification::Qualification;
use crate::types::reference::Citation;
use crate::types::triplet::{ContextTriplet, Triplet};

/// How much document text the qualifier sees. The opening of a paper is
/// enough to judge topical relevance.
pub const QUALIFY_TEXT_BUDGET: usize = 2_000;

/// How much document text the extraction prompts see.
pub const EXTRACTION_TEXT_BUDGET: usize = 50_000;

/// Truncate `text` to at most `budget` characters, respecting char
/// boundaries.
pub fn clip_text(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Judges whether a paper is on-topic.
#[async_trait]
pub trait Qualifier: Send + Sync {
    /// Return a relevance verdict for the given document text.
    async fn qualify(&self, text: &str) -> Result<Qualification>;
}

/// Mines bibliography citations out of a paper's text.
///
/// A malformed model response is an error here; the caller marks the
/// document failed rather than silently recording zero references.
#[async_trait]
pub trait ReferenceExtractor: Send + Sync {
    async fn extract_references(&self, text: &str) -> Result<Vec<Citation>>;
}

/// Mines cause-effect triplets out of a paper's text.
///
/// Unlike reference extraction, a malformed model response yields an empty
/// list: triplet mining is an auxiliary pass and never blocks the crawl.
/// Transport errors still propagate.
#[async_trait]
pub trait TripletMiner: Send + Sync {
    /// Open-form subject/predicate/object triples.
    async fn mine_triplets(&self, text: &str) -> Result<Vec<Triplet>>;

    /// Controlled-vocabulary triples with frequency and context.
    async fn mine_context_triplets(&self, text: &str) -> Result<Vec<ContextTriplet>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_text_short_input_untouched() {
        assert_eq!(clip_text("hello", 10), "hello");
    }

    #[test]
    fn test_clip_text_counts_chars_not_bytes() {
        // Multi-byte chars must not be split
        let text = "日本語テキスト";
        assert_eq!(clip_text(text, 3), "日本語");
    }

    #[test]
    fn test_clip_text_exact_budget() {
        assert_eq!(clip_text("abcdef", 6), "abcdef");
        assert_eq!(clip_text("abcdef", 5), "abcde");
    }
}
