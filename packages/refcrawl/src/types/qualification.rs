//! Topic relevance verdicts returned by the qualifier.

use serde::{Deserialize, Serialize};

/// Minimum confidence for a positive verdict to count as qualified.
pub const QUALIFICATION_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// A relevance verdict for one paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qualification {
    /// Whether the model judged the paper on-topic
    pub is_relevant: bool,

    /// Model confidence in [0, 1]
    pub confidence: f32,

    /// Relevant topics the model found in the paper
    #[serde(default)]
    pub topics_found: Vec<String>,

    /// Brief explanation of the verdict
    #[serde(default)]
    pub reasoning: String,
}

impl Qualification {
    /// The final boolean written to the document record: relevant AND
    /// confident enough.
    pub fn accepted(&self) -> bool {
        self.is_relevant && self.confidence >= QUALIFICATION_CONFIDENCE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(is_relevant: bool, confidence: f32) -> Qualification {
        Qualification {
            is_relevant,
            confidence,
            topics_found: vec![],
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_accepted_requires_both() {
        assert!(verdict(true, 0.9).accepted());
        assert!(verdict(true, 0.7).accepted());
        assert!(!verdict(true, 0.69).accepted());
        assert!(!verdict(false, 0.99).accepted());
    }
}
