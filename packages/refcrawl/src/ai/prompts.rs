//! Prompt templates and response schemas for the three model tasks.
//!
//! Each task pairs a prompt builder with a JSON schema handed to the model's
//! structured-output mode, so responses parse directly into domain types.

use serde_json::{json, Value};

/// System prompt for topic qualification.
pub const QUALIFY_SYSTEM: &str = "You analyze academic papers for topical relevance. \
Be factual and base your judgement only on the provided text.";

/// System prompt for reference extraction.
pub const REFERENCES_SYSTEM: &str = "You extract bibliographies from academic papers. \
Be thorough and precise; never invent references that are not in the text.";

/// System prompt for open-form triplet mining.
pub const TRIPLETS_SYSTEM: &str = "You extract cause-effect relationships from scientific \
text about consumer behavior in teens and young adults.";

/// System prompt for vocabulary-constrained triplet mining.
pub const CONTEXT_TRIPLETS_SYSTEM: &str = "You are a research assistant helping build a \
knowledge graph about consumer behavior in teens and young adults.";

/// Build the qualification user prompt around (already clipped) paper text.
pub fn qualify_prompt(text: &str) -> String {
    format!(
        "Analyze the following academic paper text and determine if it's relevant to \
consumer behavior and persuasion.\nFocus on topics like:\n\
- Consumer decision making\n\
- Persuasion techniques\n\
- Marketing influence\n\
- Social media influence\n\
- Behavioral economics\n\
- Consumer psychology\n\n\
Text of the paper:\n{text}"
    )
}

/// Build the reference-extraction user prompt.
pub fn references_prompt(text: &str) -> String {
    format!(
        "Extract all academic references from the following text.\n\
Format each reference as a separate item in a list with the following fields: \
reference_text, authors, title, year.\n\
If no references are found, return an empty list.\n\
Please double-check your work and ensure that every single reference is correctly \
extracted.\n\nText:\n{text}"
    )
}

/// Build the open-form triplet mining user prompt.
pub fn triplets_prompt(text: &str) -> String {
    format!(
        "From the text below, extract any cause-effect relationships involving marketing \
cues, psychological traits, and behaviors in teens or young adults. Format each as a \
triple:\nCue -> causes/influences -> Trait or Behavior [in Teens/Young Adults]\n\n\
For example, if the text says:\n\
\"Scarcity messages like 'Only 3 left!' have been shown to increase impulsive buying \
behavior, particularly in adolescents with high fear of missing out (FOMO).\"\n\n\
A triplet would be:\n\
  subject: \"Scarcity Message\", predicate: \"triggers\", object: \"FOMO\"\n\n\
Text of the paper:\n{text}"
    )
}

/// Build the vocabulary-constrained triplet mining user prompt.
pub fn context_triplets_prompt(text: &str) -> String {
    use crate::types::triplet::{CUE_VOCABULARY, OUTCOME_VOCABULARY, TRAIT_VOCABULARY};

    format!(
        "Your job is to extract triples from scientific text using the following \
controlled vocabulary:\n\
Marketing Cues (Stimuli): {cues}\n\
Customer Traits / Susceptibilities: {traits}\n\
Behavioral Outcomes (related to purchases): {outcomes}\n\n\
For each valid statement in the text, extract a triple like this:\n\
Subject -> Predicate -> Object [in Teens or Young Adults]\n\
Use only the vocabulary above. You can repeat the same type of triple if it appears \
multiple times.\n\n\
Also output:\n\
Frequency: How many times the relationship appears in the text\n\
Context: If available (e.g., mobile app, discount season)\n\n\
For example, if the text says:\n\
\"Scarcity messages like 'Only 3 left!' have been shown to increase impulsive buying \
behavior, particularly in adolescents with high fear of missing out (FOMO).\"\n\n\
A triplet would be:\n\
  subject: \"Scarcity Message\", predicate: \"triggers\", object: \"FOMO\", \
frequency: \"1\", context: \"Mobile e-commerce, back-to-school season\"\n\n\
Text of the paper:\n{text}",
        cues = CUE_VOCABULARY.join(", "),
        traits = TRAIT_VOCABULARY.join(", "),
        outcomes = OUTCOME_VOCABULARY.join(", "),
    )
}

/// Response schema for qualification verdicts.
pub fn qualification_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "is_relevant": {
                "type": "boolean",
                "description": "Whether the paper is relevant to consumer behavior and persuasion"
            },
            "confidence": {
                "type": "number",
                "description": "Confidence score between 0 and 1"
            },
            "topics_found": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of relevant topics found in the paper"
            },
            "reasoning": {
                "type": "string",
                "description": "Brief explanation of why the paper is or isn't relevant"
            }
        },
        "required": ["is_relevant", "confidence", "topics_found", "reasoning"],
        "additionalProperties": false
    })
}

/// Response schema for the reference list.
pub fn references_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "references": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "reference_text": { "type": "string" },
                        "authors": { "type": "string" },
                        "title": { "type": "string" },
                        "year": { "type": "string" }
                    },
                    "required": ["reference_text", "authors", "title", "year"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["references"],
        "additionalProperties": false
    })
}

/// Response schema for open-form triplets.
pub fn triplets_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "triplets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "subject": { "type": "string" },
                        "predicate": { "type": "string" },
                        "object": { "type": "string" }
                    },
                    "required": ["subject", "predicate", "object"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["triplets"],
        "additionalProperties": false
    })
}

/// Response schema for vocabulary-constrained triplets.
pub fn context_triplets_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "triplets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "subject": { "type": "string" },
                        "predicate": { "type": "string" },
                        "object": { "type": "string" },
                        "frequency": { "type": "string" },
                        "context": { "type": "string" }
                    },
                    "required": ["subject", "predicate", "object", "frequency", "context"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["triplets"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_text() {
        assert!(qualify_prompt("PAPER BODY").contains("PAPER BODY"));
        assert!(references_prompt("PAPER BODY").contains("PAPER BODY"));
        assert!(triplets_prompt("PAPER BODY").contains("PAPER BODY"));
        assert!(context_triplets_prompt("PAPER BODY").contains("PAPER BODY"));
    }

    #[test]
    fn test_context_prompt_lists_vocabulary() {
        let prompt = context_triplets_prompt("x");
        assert!(prompt.contains("Countdown Timer"));
        assert!(prompt.contains("Impulsivity"));
        assert!(prompt.contains("Cart Abandonment"));
    }
}
