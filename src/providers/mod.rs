//! Live LLM adapters behind one capability set.

pub mod gemini;
pub mod groq;
pub mod prompts;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ProvidersConfig;
use crate::error::{Result, SentimentError};
use crate::models::{AnalysisResult, Post, ProviderIdentity, ProviderPost};
use crate::transport::{HttpReply, Transport};

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;

/// Key under which chat backends are told to wrap generated post arrays.
pub const BATCH_ENVELOPE_KEY: &str = "tweets";

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    fn identity(&self) -> ProviderIdentity;

    async fn analyze_one(&self, text: &str) -> Result<AnalysisResult>;

    /// Asks for `count` posts. Returns at most `count`; fewer is accepted.
    async fn analyze_batch(&self, topic: &str, count: usize) -> Result<Vec<Post>>;

    async fn explain_concept(&self, name: &str) -> Result<String>;
}

/// Builds the adapter for `identity`. Fails with `MissingCredential` before any I/O.
pub fn build_provider(
    identity: ProviderIdentity,
    providers: &ProvidersConfig,
    tx: Arc<dyn Transport>,
) -> Result<Arc<dyn SentimentProvider>> {
    Ok(match identity {
        ProviderIdentity::Gemini => Arc::new(GeminiProvider::from_config(tx, providers)?),
        ProviderIdentity::Groq => Arc::new(GroqProvider::from_config(tx, providers)?),
    })
}

/// Maps a non-2xx reply to `ProviderRequestFailed`, preferring the provider's own message.
pub(crate) fn check_status(provider: ProviderIdentity, reply: &HttpReply) -> Result<()> {
    if reply.is_success() {
        return Ok(());
    }

    let message = provider_error_message(&reply.body)
        .or_else(|| reply.reason.clone())
        .unwrap_or_else(|| format!("HTTP {}", reply.status));
    tracing::warn!(
        "{} returned HTTP {}: {}",
        provider,
        reply.status,
        message
    );

    Err(SentimentError::ProviderRequestFailed {
        provider,
        status: reply.status,
        message,
    })
}

// Both backends use {"error": {"message": "..."}}; some proxies send {"error": "..."}.
fn provider_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_json<T: DeserializeOwned>(provider: ProviderIdentity, raw: &str) -> Result<T> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|e| {
        SentimentError::invalid(
            provider,
            format!("failed to deserialize JSON: {e}. Raw: {}", truncate(raw, 200)),
        )
    })
}

/// Drops a surrounding ```json ... ``` fence if the model added one.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn truncate(raw: &str, max_chars: usize) -> String {
    if raw.chars().count() <= max_chars {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

/// Accepts a bare array or an object carrying the array under [`BATCH_ENVELOPE_KEY`].
pub(crate) fn parse_post_array(provider: ProviderIdentity, raw: &str) -> Result<Vec<ProviderPost>> {
    let value: Value = parse_json(provider, raw)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(BATCH_ENVELOPE_KEY) {
            Some(Value::Array(items)) => items,
            _ => {
                let keys: Vec<&String> = map.keys().collect();
                return Err(SentimentError::invalid(
                    provider,
                    format!(
                        "expected an array or an object with a '{BATCH_ENVELOPE_KEY}' array, got keys {keys:?}"
                    ),
                ));
            }
        },
        other => {
            return Err(SentimentError::invalid(
                provider,
                format!("expected an array of posts, got {other}"),
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| {
                SentimentError::invalid(provider, format!("post {i} is malformed: {e}"))
            })
        })
        .collect()
}

/// Validates raw items into posts, keeping at most `count`.
pub(crate) fn posts_from_items(
    provider: ProviderIdentity,
    items: Vec<ProviderPost>,
    count: usize,
) -> Result<Vec<Post>> {
    if items.len() != count {
        tracing::warn!(
            "{} returned {} posts for a request of {}",
            provider,
            items.len(),
            count
        );
    }

    let mut rng = rand::thread_rng();
    items
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, item)| -> Result<Post> {
            let text = item
                .text
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| SentimentError::invalid(provider, format!("post {i} has no text")))?;
            let author = item
                .author
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| crate::mock::corpus::random_handle(&mut rng));
            let analysis = item.analysis.into_result(provider)?;
            Ok(Post::new(text, author, analysis))
        })
        .collect()
}

pub(crate) fn non_empty_prose(provider: ProviderIdentity, raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(SentimentError::invalid(provider, "empty explanation"));
    }
    Ok(text.to_string())
}
