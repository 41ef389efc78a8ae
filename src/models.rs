use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SentimentError;

/// Sentiment classes. Nothing outside these three is ever returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown sentiment label '{other}'")),
        }
    }
}

// Providers are inconsistent about casing ("positive", "POSITIVE"), so accept any.
impl<'de> Deserialize<'de> for SentimentLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single classification, from either a live provider or the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub rationale: String,
    pub keywords: Vec<String>,
}

impl AnalysisResult {
    /// Rationale prefix carried by every simulated result.
    pub const SIMULATED_RATIONALE_PREFIX: &'static str = "[Simulated]";

    pub fn is_simulated(&self) -> bool {
        self.rationale.starts_with(Self::SIMULATED_RATIONALE_PREFIX)
    }
}

/// A short social-media style message plus its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl Post {
    /// Builds a post with a fresh id and timestamp.
    pub fn new(text: String, author: String, analysis: AnalysisResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            author,
            created_at: Utc::now(),
            analysis: Some(analysis),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderIdentity {
    /// Structured-schema backend (Gemini `generateContent`).
    Gemini,
    /// Chat-completion backend (Groq, OpenAI-compatible).
    Groq,
}

impl ProviderIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Groq => "groq",
        }
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderIdentity {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "groq" => Ok(Self::Groq),
            other => Err(SentimentError::Config(format!(
                "unknown provider '{other}' (expected 'gemini' or 'groq')"
            ))),
        }
    }
}

/// How a request should be serviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMode {
    pub provider: ProviderIdentity,
    pub simulate: bool,
}

impl AnalysisMode {
    pub fn live(provider: ProviderIdentity) -> Self {
        Self {
            provider,
            simulate: false,
        }
    }

    pub fn simulated(provider: ProviderIdentity) -> Self {
        Self {
            provider,
            simulate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub topic: String,
    pub count: usize,
    pub provider: ProviderIdentity,
    pub simulate: bool,
}

impl BatchRequest {
    pub fn mode(&self) -> AnalysisMode {
        AnalysisMode {
            provider: self.provider,
            simulate: self.simulate,
        }
    }
}

/// Accepts a number, or a number encoded as a string, from provider JSON.
fn deserialize_flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleFloat {
        Float(f64),
        String(String),
        Null,
    }

    match Option::<FlexibleFloat>::deserialize(deserializer)? {
        Some(FlexibleFloat::Float(f)) => Ok(Some(f)),
        Some(FlexibleFloat::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(FlexibleFloat::Null) | None => Ok(None),
    }
}

/// Analysis fields as a provider returns them, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderAnalysis {
    #[serde(alias = "label")]
    pub sentiment: Option<SentimentLabel>,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    pub confidence: Option<f64>,
    #[serde(alias = "rationale")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

impl ProviderAnalysis {
    /// Validates into a complete result; a missing core field is an error.
    pub fn into_result(self, provider: ProviderIdentity) -> Result<AnalysisResult, SentimentError> {
        let label = self
            .sentiment
            .ok_or_else(|| SentimentError::invalid(provider, "missing 'sentiment' field"))?;
        let confidence = self
            .confidence
            .filter(|c| c.is_finite())
            .ok_or_else(|| SentimentError::invalid(provider, "missing 'confidence' field"))?;
        let rationale = self
            .reasoning
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| SentimentError::invalid(provider, "missing 'reasoning' field"))?;

        Ok(AnalysisResult {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            rationale,
            keywords: self.keywords.unwrap_or_default(),
        })
    }
}

/// One generated post as a provider returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPost {
    pub text: Option<String>,
    #[serde(default, alias = "handle", alias = "username")]
    pub author: Option<String>,
    #[serde(flatten)]
    pub analysis: ProviderAnalysis,
}

// Chat-completion message format (Groq, OpenAI-compatible)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// Chat-completion request format
#[derive(Debug, Serialize, Clone)]
pub struct GroqRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

// Chat-completion response format
#[derive(Debug, Deserialize)]
pub struct GroqResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

// Gemini generateContent request format
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

// Gemini generateContent response format
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<GeminiContent>,
}
