//! Cause-effect triplets mined from paper text.
//!
//! Two independently schema'd forms: open-form subject/predicate/object
//! triples, and vocabulary-constrained triples that additionally carry
//! frequency and context.

use serde::{Deserialize, Serialize};

/// An open-form cause-effect relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// A vocabulary-constrained relation with occurrence metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTriplet {
    pub subject: String,
    pub predicate: String,
    pub object: String,

    /// How many times the relationship appears in the text
    pub frequency: String,

    /// Setting the relationship was observed in, if the text gives one
    pub context: String,
}

/// Which mining pass to run over a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripletGroup {
    /// Open-form triples ([`Triplet`])
    Basic,

    /// Controlled-vocabulary triples with frequency/context
    /// ([`ContextTriplet`])
    Contextual,
}

/// Marketing cue (stimulus) vocabulary for contextual mining.
pub const CUE_VOCABULARY: &[&str] = &[
    "Countdown Timer",
    "Flash Sale Banner",
    "Scarcity Message",
    "Product Rating",
    "Urgency Tone",
    "Social Proof Message",
];

/// Customer trait / susceptibility vocabulary for contextual mining.
pub const TRAIT_VOCABULARY: &[&str] = &[
    "Impulsivity",
    "FOMO",
    "Cognitive Load",
    "Low Self-Regulation",
    "Trust in Authority",
    "Anxiety",
];

/// Behavioral outcome vocabulary for contextual mining.
pub const OUTCOME_VOCABULARY: &[&str] = &[
    "Impulsive Purchase",
    "Cart Abandonment",
    "Satisfaction",
    "Regret",
    "Return Behavior",
];
