use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ProviderSettings, ProvidersConfig};
use crate::credentials;
use crate::error::{Result, SentimentError};
use crate::models::{
    AnalysisResult, ChatMessage, GroqRequest, GroqResponse, Post, ProviderAnalysis,
    ProviderIdentity,
};
use crate::transport::{HttpCall, Transport};

use super::{
    SentimentProvider, check_status, non_empty_prose, parse_json, parse_post_array,
    posts_from_items, prompts,
};

const PROVIDER: ProviderIdentity = ProviderIdentity::Groq;

/// Chat-completion adapter. No schema enforcement, so the JSON shape lives in the
/// system prompt and replies are parsed defensively.
pub struct GroqProvider {
    tx: Arc<dyn Transport>,
    api_key: String,
    settings: ProviderSettings,
}

impl GroqProvider {
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
        Self::new(tx, providers.groq.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// One chat completion; returns the assistant message content.
    async fn chat(&self, system: String, user: String, json_mode: bool) -> Result<String> {
        let request = GroqRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: json_mode.then(|| serde_json::json!({"type": "json_object"})),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| SentimentError::Config(format!("Failed to encode Groq request: {e}")))?;

        let call = HttpCall::post(self.endpoint(), body)
            .header("Authorization", format!("Bearer {}", self.api_key));
        let reply = self.tx.send(&call).await?;
        check_status(PROVIDER, &reply)?;

        let groq_response: GroqResponse = parse_json(PROVIDER, &reply.body)?;
        if let Some(choice) = groq_response.choices.into_iter().next() {
            Ok(choice.message.content)
        } else {
            Err(SentimentError::invalid(
                PROVIDER,
                "Groq API returned empty choices",
            ))
        }
    }
}

#[async_trait]
impl SentimentProvider for GroqProvider {
    fn identity(&self) -> ProviderIdentity {
        PROVIDER
    }

    async fn analyze_one(&self, text: &str) -> Result<AnalysisResult> {
        tracing::info!("Analyzing text with Groq model {}", self.settings.model);
        let content = self
            .chat(
                prompts::analyze_system_message(),
                prompts::analyze_prompt(text),
                true,
            )
            .await?;
        let parsed: ProviderAnalysis = parse_json(PROVIDER, &content)?;
        parsed.into_result(PROVIDER)
    }

    async fn analyze_batch(&self, topic: &str, count: usize) -> Result<Vec<Post>> {
        tracing::info!("Generating {} posts about '{}' with Groq", count, topic);
        if count == 0 {
            return Ok(Vec::new());
        }
        let content = self
            .chat(
                prompts::batch_system_message(),
                prompts::batch_prompt(topic, count),
                true,
            )
            .await?;
        let items = parse_post_array(PROVIDER, &content)?;
        posts_from_items(PROVIDER, items, count)
    }

    async fn explain_concept(&self, name: &str) -> Result<String> {
        tracing::info!("Explaining '{}' with Groq", name);
        let content = self
            .chat(
                prompts::explain_system_message(),
                prompts::explain_prompt(name),
                false,
            )
            .await?;
        non_empty_prose(PROVIDER, &content)
    }
}
