use async_trait::async_trait;
use reqwest::Client;
use std::fmt;

use crate::config::HttpConfig;
use crate::error::{Result, SentimentError};

#[cfg(test)]
use mockall::automock;

/// An outbound JSON POST. Adapters build these; the transport only ships them.
#[derive(Clone)]
pub struct HttpCall {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl HttpCall {
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

// Header values carry API keys; keep them out of logs.
impl fmt::Debug for HttpCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, _)| (name.as_str(), "<redacted>"))
            .collect();
        f.debug_struct("HttpCall")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// Whatever came back, success or not. Status interpretation is left to adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fails only when no response was received at all.
    async fn send(&self, call: &HttpCall) -> Result<HttpReply>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(cfg: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| SentimentError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply> {
        tracing::debug!("POST {}", call.url);

        let mut request = self
            .client
            .post(&call.url)
            .header("Content-Type", "application/json")
            .json(&call.body);
        for (name, value) in &call.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed before a response: {}", call.url, e);
            SentimentError::ProviderUnreachable(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SentimentError::ProviderUnreachable(format!("Failed to read response body: {e}"))
        })?;

        tracing::debug!("{} -> HTTP {}", call.url, status.as_u16());
        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_header_values() {
        let call = HttpCall::post("https://example.test/v1", serde_json::json!({"a": 1}))
            .header("Authorization", "Bearer gsk_secret");
        let printed = format!("{call:?}");
        assert!(printed.contains("Authorization"));
        assert!(!printed.contains("gsk_secret"));
    }

    #[test]
    fn test_success_range() {
        let reply = |status| HttpReply {
            status,
            reason: None,
            body: String::new(),
        };
        assert!(reply(200).is_success());
        assert!(reply(204).is_success());
        assert!(!reply(301).is_success());
        assert!(!reply(429).is_success());
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let transport = HttpTransport::new(&HttpConfig {
            timeout_seconds: 2,
            user_agent: "sentiment-pulse-test".to_string(),
        })
        .unwrap();
        // Port 1 is reserved and nothing listens on it locally
        let call = HttpCall::post("http://127.0.0.1:1/chat/completions", serde_json::json!({}));
        let err = transport.send(&call).await.unwrap_err();
        assert!(matches!(err, SentimentError::ProviderUnreachable(_)));
    }
}
