use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::credentials;
use crate::error::{Result, SentimentError};
use crate::mock;
use crate::models::{AnalysisMode, AnalysisResult, BatchRequest, Post};
use crate::providers::{self, SentimentProvider};
use crate::transport::{HttpTransport, Transport};

/// Single entry point for callers: routes each request to the simulator or to
/// the configured live provider and hands back typed results.
pub struct SentimentService {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    rng: Mutex<StdRng>,
}

impl SentimentService {
    pub fn new(config: Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.http)?);
        Ok(Self::with_parts(config, transport, StdRng::from_entropy()))
    }

    /// Builds a service over an explicit transport and random source.
    pub fn with_parts(config: Config, transport: Arc<dyn Transport>, rng: StdRng) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn analyze_single(&self, text: &str, mode: AnalysisMode) -> Result<AnalysisResult> {
        if mode.simulate {
            tracing::info!("analyze_single: simulated");
            return Ok(self.simulate(|rng| mock::classify(text, rng)).await);
        }
        let provider = self.live_provider(mode)?;
        tracing::info!("analyze_single: routing to {}", provider.identity());
        provider.analyze_one(text).await
    }

    pub async fn analyze_topic(
        &self,
        topic: &str,
        count: usize,
        mode: AnalysisMode,
    ) -> Result<Vec<Post>> {
        if mode.simulate {
            tracing::info!("analyze_topic: simulating {} posts about '{}'", count, topic);
            return Ok(self
                .simulate(|rng| mock::generate_batch(topic, count, rng))
                .await);
        }
        let provider = self.live_provider(mode)?;
        tracing::info!(
            "analyze_topic: routing {} posts about '{}' to {}",
            count,
            topic,
            provider.identity()
        );
        provider.analyze_batch(topic, count).await
    }

    pub async fn analyze_request(&self, request: &BatchRequest) -> Result<Vec<Post>> {
        self.analyze_topic(&request.topic, request.count, request.mode())
            .await
    }

    pub async fn explain(&self, concept: &str, mode: AnalysisMode) -> Result<String> {
        if mode.simulate {
            tracing::info!("explain: simulated");
            return Ok(self.simulate(|_| mock::explain_concept(concept)).await);
        }
        let provider = self.live_provider(mode)?;
        tracing::info!("explain: routing to {}", provider.identity());
        provider.explain_concept(concept).await
    }

    fn live_provider(&self, mode: AnalysisMode) -> Result<Arc<dyn SentimentProvider>> {
        if !credentials::has_credential(&self.config.providers, mode.provider) {
            tracing::warn!("No credential for {}; refusing live call", mode.provider);
            return Err(SentimentError::MissingCredential {
                provider: mode.provider,
            });
        }
        providers::build_provider(
            mode.provider,
            &self.config.providers,
            Arc::clone(&self.transport),
        )
    }

    /// Runs `f` against the shared random source, then waits out the simulated latency.
    async fn simulate<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let (value, delay) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let value = f(&mut *rng);
            let delay = mock::latency(&self.config.mock, &mut *rng);
            (value, delay)
        };
        tokio::time::sleep(delay).await;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProviderIdentity, SentimentLabel};
    use crate::test_support::{ScriptedTransport, chat_body};
    use crate::transport::MockTransport;
    use std::time::{Duration, Instant};

    fn test_config() -> Config {
        Config::from_yaml_str("mock: { latency_ms: 5, jitter_ms: 5 }").unwrap()
    }

    fn no_io_transport() -> Arc<MockTransport> {
        let mut tx = MockTransport::new();
        tx.expect_send().times(0);
        Arc::new(tx)
    }

    fn service_with(config: Config, tx: Arc<dyn Transport>) -> SentimentService {
        SentimentService::with_parts(config, tx, StdRng::seed_from_u64(42))
    }

    #[tokio::test]
    async fn test_simulated_single_without_credentials() {
        let service = service_with(test_config(), no_io_transport());
        let result = service
            .analyze_single(
                "This update is absolutely terrible",
                AnalysisMode::simulated(ProviderIdentity::Groq),
            )
            .await
            .unwrap();

        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((0.70..=1.0).contains(&result.confidence));
        assert!(result.is_simulated());
        assert!(!result.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_simulate_ignores_present_credentials() {
        let mut config = test_config();
        config.providers.gemini.api_key = "gm-real".to_string();
        let service = service_with(config, no_io_transport());

        let posts = service
            .analyze_topic("Rust", 6, AnalysisMode::simulated(ProviderIdentity::Gemini))
            .await
            .unwrap();
        assert_eq!(posts.len(), 6);
        assert!(posts.iter().all(|p| p.analysis.is_some()));

        let text = service
            .explain("Polarity", AnalysisMode::simulated(ProviderIdentity::Gemini))
            .await
            .unwrap();
        assert!(text.contains("Polarity"));
    }

    #[tokio::test]
    async fn test_live_without_credential_never_touches_transport() {
        let service = service_with(test_config(), no_io_transport());
        for provider in [ProviderIdentity::Gemini, ProviderIdentity::Groq] {
            let mode = AnalysisMode::live(provider);
            let err = service.analyze_single("hi", mode).await.unwrap_err();
            assert!(matches!(err, SentimentError::MissingCredential { provider: p } if p == provider));

            let err = service.analyze_topic("x", 3, mode).await.unwrap_err();
            assert!(matches!(err, SentimentError::MissingCredential { .. }));

            let err = service.explain("x", mode).await.unwrap_err();
            assert!(err.is_recoverable_by_simulation());
        }
    }

    #[tokio::test]
    async fn test_live_routes_to_selected_provider() {
        let mut config = test_config();
        config.providers.groq.api_key = "gsk_live".to_string();
        let tx = Arc::new(ScriptedTransport::ok(chat_body(
            r#"{"sentiment": "positive", "confidence": 0.97, "reasoning": "Clear enthusiasm.", "keywords": ["launch"]}"#,
        )));
        let service = service_with(config, tx.clone());
        assert_eq!(service.config().providers.groq.api_key, "gsk_live");

        let result = service
            .analyze_single("Great launch!", AnalysisMode::live(ProviderIdentity::Groq))
            .await
            .unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(!result.is_simulated());
        assert_eq!(tx.call_count(), 1);
        assert!(tx.last_call().unwrap().url.ends_with("/chat/completions"));

        // Groq key does not unlock Gemini
        let err = service
            .analyze_single("Great launch!", AnalysisMode::live(ProviderIdentity::Gemini))
            .await
            .unwrap_err();
        assert!(matches!(err, SentimentError::MissingCredential { .. }));
        assert_eq!(tx.call_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_request_envelope_end_to_end() {
        let mut config = test_config();
        config.providers.groq.api_key = "gsk_live".to_string();
        let content = r#"{"tweets": [
            {"text": "Ferris is adorable", "author": "@crab", "sentiment": "Positive", "confidence": 0.9, "reasoning": "Affection."},
            {"text": "Borrow checker again", "author": "@dev", "sentiment": "Negative", "confidence": 0.8, "reasoning": "Frustration."}
        ]}"#;
        let tx = Arc::new(ScriptedTransport::ok(chat_body(content)));
        let service = service_with(config, tx);

        let request = BatchRequest {
            topic: "Rust".to_string(),
            count: 2,
            provider: ProviderIdentity::Groq,
            simulate: false,
        };
        let posts = service.analyze_request(&request).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].author, "@dev");
    }

    #[tokio::test]
    async fn test_malformed_explain_body_is_invalid_response() {
        let mut config = test_config();
        config.providers.groq.api_key = "gsk_live".to_string();
        let tx = Arc::new(ScriptedTransport::ok("not json at all".to_string()));
        let service = service_with(config, tx);

        let err = service
            .explain("Sarcasm", AnalysisMode::live(ProviderIdentity::Groq))
            .await
            .unwrap_err();
        assert!(matches!(err, SentimentError::ProviderResponseInvalid { .. }));
    }

    #[tokio::test]
    async fn test_seeded_services_simulate_identically() {
        let a = service_with(test_config(), no_io_transport());
        let b = service_with(test_config(), no_io_transport());
        let mode = AnalysisMode::simulated(ProviderIdentity::Gemini);

        let posts_a = a.analyze_topic("tea", 8, mode).await.unwrap();
        let posts_b = b.analyze_topic("tea", 8, mode).await.unwrap();
        let texts_a: Vec<_> = posts_a.iter().map(|p| (&p.text, &p.author)).collect();
        let texts_b: Vec<_> = posts_b.iter().map(|p| (&p.text, &p.author)).collect();
        assert_eq!(texts_a, texts_b);
    }

    #[tokio::test]
    async fn test_simulated_latency_is_awaited() {
        let config =
            Config::from_yaml_str("mock: { latency_ms: 30, jitter_ms: 0 }").unwrap();
        let service = service_with(config, no_io_transport());
        let started = Instant::now();
        service
            .analyze_single("hello", AnalysisMode::simulated(ProviderIdentity::Groq))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
