use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::config::{ProviderSettings, ProvidersConfig};
use crate::credentials;
use crate::error::{Result, SentimentError};
use crate::models::{
    AnalysisResult, GeminiContent, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig,
    Post, ProviderAnalysis, ProviderIdentity, ProviderPost, SentimentLabel,
};
use crate::transport::{HttpCall, Transport};

use super::{SentimentProvider, check_status, non_empty_prose, parse_json, posts_from_items, prompts};

const PROVIDER: ProviderIdentity = ProviderIdentity::Gemini;

/// Structured-output adapter: the backend validates replies against a response schema.
pub struct GeminiProvider {
    tx: Arc<dyn Transport>,
    api_key: String,
    settings: ProviderSettings,
}

impl GeminiProvider {
    /// Fails with `MissingCredential` if `settings.api_key` is blank or a placeholder.
    pub fn new(tx: Arc<dyn Transport>, settings: ProviderSettings) -> Result<Self> {
        let api_key = credentials::usable_key(&settings.api_key)
            .ok_or(SentimentError::MissingCredential { provider: PROVIDER })?
            .to_string();
        Ok(Self {
            tx,
            api_key,
            settings,
        })
    }

    pub fn from_config(tx: Arc<dyn Transport>, providers: &ProvidersConfig) -> Result<Self> {
        Self::new(tx, providers.gemini.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// One generateContent round trip; returns the concatenated candidate text.
    async fn generate(&self, prompt: String, schema: Option<Value>) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_tokens,
                response_mime_type: schema.as_ref().map(|_| "application/json".to_string()),
                response_schema: schema,
            },
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| SentimentError::Config(format!("Failed to encode Gemini request: {e}")))?;

        let call = HttpCall::post(self.endpoint(), body).header("x-goog-api-key", &self.api_key);
        let reply = self.tx.send(&call).await?;
        check_status(PROVIDER, &reply)?;

        let response: GeminiResponse = parse_json(PROVIDER, &reply.body)?;
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SentimentError::invalid(
                PROVIDER,
                "Gemini returned no candidate text",
            ));
        }
        Ok(text)
    }
}

fn analysis_properties() -> serde_json::Map<String, Value> {
    let labels: Vec<&str> = SentimentLabel::ALL.iter().map(|l| l.as_str()).collect();
    let props = json!({
        "sentiment": { "type": "STRING", "enum": labels },
        "confidence": { "type": "NUMBER", "description": "Confidence between 0.0 and 1.0" },
        "reasoning": { "type": "STRING" },
        "keywords": { "type": "ARRAY", "items": { "type": "STRING" } }
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Response schema for a single classification.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": analysis_properties(),
        "required": ["sentiment", "confidence", "reasoning", "keywords"]
    })
}

/// Response schema for a batch of generated posts.
pub fn batch_schema() -> Value {
    let mut properties = analysis_properties();
    properties.insert("text".to_string(), json!({ "type": "STRING" }));
    properties.insert("author".to_string(), json!({ "type": "STRING" }));
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": ["text", "author", "sentiment", "confidence", "reasoning", "keywords"]
        }
    })
}

#[async_trait]
impl SentimentProvider for GeminiProvider {
    fn identity(&self) -> ProviderIdentity {
        PROVIDER
    }

    async fn analyze_one(&self, text: &str) -> Result<AnalysisResult> {
        tracing::info!("Analyzing text with Gemini model {}", self.settings.model);
        let raw = self
            .generate(prompts::analyze_prompt(text), Some(analysis_schema()))
            .await?;
        let parsed: ProviderAnalysis = parse_json(PROVIDER, &raw)?;
        parsed.into_result(PROVIDER)
    }

    async fn analyze_batch(&self, topic: &str, count: usize) -> Result<Vec<Post>> {
        tracing::info!("Generating {} posts about '{}' with Gemini", count, topic);
        if count == 0 {
            return Ok(Vec::new());
        }
        let raw = self
            .generate(prompts::batch_prompt(topic, count), Some(batch_schema()))
            .await?;
        let items: Vec<ProviderPost> = parse_json(PROVIDER, &raw)?;
        posts_from_items(PROVIDER, items, count)
    }

    async fn explain_concept(&self, name: &str) -> Result<String> {
        tracing::info!("Explaining '{}' with Gemini", name);
        let raw = self.generate(prompts::explain_prompt(name), None).await?;
        non_empty_prose(PROVIDER, &raw)
    }
}
