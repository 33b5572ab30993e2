//! OpenAI implementation of the model-backed capabilities.
//!
//! One client implements all three traits: qualification, reference
//! extraction, and triplet mining. Every call uses OpenAI's `json_schema`
//! structured-output mode so responses parse directly into domain types.
//!
//! # Example
//!
//! ```rust,ignore
//! use refcrawl::ai::OpenAi;
//!
//! let ai = OpenAi::from_env()?.with_model("gpt-4o-mini");
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::prompts;
use crate::error::{PipelineError, Result};
use crate::security::SecretString;
use crate::traits::ai::{
    clip_text, Qualifier, ReferenceExtractor, TripletMiner, EXTRACTION_TEXT_BUDGET,
    QUALIFY_TEXT_BUDGET,
};
use crate::types::qualification::Qualification;
use crate::types::reference::Citation;
use crate::types::triplet::{ContextTriplet, Triplet};

/// OpenAI-backed qualifier, reference extractor, and triplet miner.
#[derive(Clone)]
pub struct OpenAi {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAi {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| PipelineError::Config("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Structured output with JSON schema (OpenAI's json_schema
    /// response_format). Returns the raw content string; callers parse.
    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        let request = StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: schema_name.to_string(),
                    strict: true,
                    schema,
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Ai(Box::new(e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Ai(
                format!("OpenAI API error: {error_text}").into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Ai(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::Ai("No response from OpenAI".into()))
    }
}

#[async_trait]
impl Qualifier for OpenAi {
    async fn qualify(&self, text: &str) -> Result<Qualification> {
        let clipped = clip_text(text, QUALIFY_TEXT_BUDGET);
        let raw = self
            .generate_structured(
                prompts::QUALIFY_SYSTEM,
                &prompts::qualify_prompt(clipped),
                "paper_qualification",
                prompts::qualification_schema(),
            )
            .await?;

        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Deserialize)]
struct ReferencesResponse {
    references: Vec<Citation>,
}

#[async_trait]
impl ReferenceExtractor for OpenAi {
    async fn extract_references(&self, text: &str) -> Result<Vec<Citation>> {
        let clipped = clip_text(text, EXTRACTION_TEXT_BUDGET);
        let raw = self
            .generate_structured(
                prompts::REFERENCES_SYSTEM,
                &prompts::references_prompt(clipped),
                "reference_list",
                prompts::references_schema(),
            )
            .await?;

        // A malformed response is a hard error here; the caller marks the
        // document failed instead of recording zero references
        let parsed: ReferencesResponse = serde_json::from_str(&raw)?;
        Ok(parsed.references)
    }
}

#[derive(Deserialize)]
struct TripletsResponse {
    triplets: Vec<Triplet>,
}

#[derive(Deserialize)]
struct ContextTripletsResponse {
    triplets: Vec<ContextTriplet>,
}

#[async_trait]
impl TripletMiner for OpenAi {
    async fn mine_triplets(&self, text: &str) -> Result<Vec<Triplet>> {
        let clipped = clip_text(text, EXTRACTION_TEXT_BUDGET);
        let raw = self
            .generate_structured(
                prompts::TRIPLETS_SYSTEM,
                &prompts::triplets_prompt(clipped),
                "triplet_list",
                prompts::triplets_schema(),
            )
            .await?;

        // Parse failures yield an empty list; mining never blocks the crawl
        match serde_json::from_str::<TripletsResponse>(&raw) {
            Ok(parsed) => Ok(parsed.triplets),
            Err(e) => {
                warn!(error = %e, "failed to parse triplet response, recording none");
                Ok(Vec::new())
            }
        }
    }

    async fn mine_context_triplets(&self, text: &str) -> Result<Vec<ContextTriplet>> {
        let clipped = clip_text(text, EXTRACTION_TEXT_BUDGET);
        let raw = self
            .generate_structured(
                prompts::CONTEXT_TRIPLETS_SYSTEM,
                &prompts::context_triplets_prompt(clipped),
                "context_triplet_list",
                prompts::context_triplets_schema(),
            )
            .await?;

        match serde_json::from_str::<ContextTripletsResponse>(&raw) {
            Ok(parsed) => Ok(parsed.triplets),
            Err(e) => {
                warn!(error = %e, "failed to parse context triplet response, recording none");
                Ok(Vec::new())
            }
        }
    }
}

// Request/Response types

#[derive(Serialize)]
struct StructuredRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_builder() {
        let ai = OpenAi::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_base_url("https://custom.api.com");

        assert_eq!(ai.model, "gpt-4o-mini");
        assert_eq!(ai.base_url, "https://custom.api.com");
    }

    #[test]
    fn test_api_key_not_in_debug() {
        let ai = OpenAi::new("sk-secret-value");
        let debug = format!("{:?}", ai.api_key);
        assert!(!debug.contains("sk-secret-value"));
    }
}
