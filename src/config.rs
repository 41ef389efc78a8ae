use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SentimentError};
use crate::models::ProviderIdentity;

/// Placeholder written into defaults when no key is present in the environment.
pub const PLACEHOLDER_GEMINI_API_KEY: &str = "PLACEHOLDER_GEMINI_API_KEY";
pub const PLACEHOLDER_GROQ_API_KEY: &str = "PLACEHOLDER_GROQ_API_KEY";

/// Main configuration structure for sentiment-pulse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub mock: MockConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "ProviderSettings::gemini")]
    pub gemini: ProviderSettings,
    #[serde(default = "ProviderSettings::groq")]
    pub groq: ProviderSettings,
}

impl ProvidersConfig {
    pub fn settings(&self, provider: ProviderIdentity) -> &ProviderSettings {
        match provider {
            ProviderIdentity::Gemini => &self.gemini,
            ProviderIdentity::Groq => &self.groq,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            gemini: ProviderSettings::gemini(),
            groq: ProviderSettings::groq(),
        }
    }
}

/// Endpoint, model and sampling settings for one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: i32,
}

impl ProviderSettings {
    fn gemini() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.4,
            max_tokens: 4096,
        }
    }

    fn groq() -> Self {
        Self {
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            temperature: 0.4,
            max_tokens: 4096,
        }
    }
}

/// Simulated latency for the offline path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    pub latency_ms: u64,
    pub jitter_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_ms: 800,
            jitter_ms: 700,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub provider: ProviderIdentity,
    pub simulate: bool,
    pub batch_size: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: ProviderIdentity::Gemini,
            simulate: false,
            batch_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            user_agent: format!("sentiment-pulse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        // Try the working directory first, then its parent (for running from target/)
        let env_paths = [".env", "../.env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("SENTIMENT_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match Self::from_file(&config_path) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path);
                    config
                }
                Err(e) => {
                    tracing::error!("{} - using defaults", e);
                    Self::default()
                }
            }
        } else {
            tracing::debug!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Strict load of a YAML file; unlike [`Config::load`] this reports failures.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents).map_err(|e| {
            SentimentError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| SentimentError::Config(e.to_string()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Gemini overrides
        if let Some(api_key) = lookup("GEMINI_API_KEY") {
            self.providers.gemini.api_key = api_key;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.providers.gemini.model = model;
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            self.providers.gemini.base_url = base_url;
        }

        // Groq overrides
        if let Some(api_key) = lookup("GROQ_API_KEY") {
            self.providers.groq.api_key = api_key;
        }
        if let Some(model) = lookup("GROQ_MODEL") {
            self.providers.groq.model = model;
        }
        if let Some(base_url) = lookup("GROQ_BASE_URL") {
            self.providers.groq.base_url = base_url;
        }

        // Defaults
        if let Some(provider) = lookup("SENTIMENT_DEFAULT_PROVIDER") {
            match provider.parse() {
                Ok(p) => self.defaults.provider = p,
                Err(e) => tracing::warn!("Ignoring SENTIMENT_DEFAULT_PROVIDER: {}", e),
            }
        }
        if let Some(simulate) = lookup("SENTIMENT_SIMULATE") {
            self.defaults.simulate = matches!(
                simulate.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        // Mock latency overrides
        if let Some(latency) = lookup("SENTIMENT_MOCK_LATENCY_MS") {
            if let Ok(ms) = latency.parse() {
                self.mock.latency_ms = ms;
            }
        }
        if let Some(jitter) = lookup("SENTIMENT_MOCK_JITTER_MS") {
            if let Ok(ms) = jitter.parse() {
                self.mock.jitter_ms = ms;
            }
        }

        // HTTP overrides
        if let Some(timeout) = lookup("SENTIMENT_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.http.timeout_seconds = secs;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        for provider in [ProviderIdentity::Gemini, ProviderIdentity::Groq] {
            let settings = self.providers.settings(provider);
            if settings.model.trim().is_empty() {
                return Err(format!("{provider} model cannot be empty").into());
            }
            if !settings.base_url.starts_with("http") {
                return Err(format!("{provider} base_url must be an http(s) URL").into());
            }
            if !(0.0..=2.0).contains(&settings.temperature) {
                return Err(format!("{provider} temperature must be between 0.0 and 2.0").into());
            }
            if settings.max_tokens <= 0 {
                return Err(format!("{provider} max_tokens must be positive").into());
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err("HTTP timeout cannot be 0".into());
        }
        if self.defaults.batch_size == 0 {
            return Err("Default batch size cannot be 0".into());
        }

        if !crate::credentials::has_credential(&self.providers, self.defaults.provider)
            && !self.defaults.simulate
        {
            return Err(format!(
                "No API key for default provider {} - live calls will fail until one is set",
                self.defaults.provider
            )
            .into());
        }

        Ok(())
    }

    /// Mode built from the configured defaults.
    pub fn default_mode(&self) -> crate::models::AnalysisMode {
        crate::models::AnalysisMode {
            provider: self.defaults.provider,
            simulate: self.defaults.simulate,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = ProvidersConfig::default();
        providers.gemini.api_key = env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
            tracing::debug!("GEMINI_API_KEY not set, using placeholder");
            PLACEHOLDER_GEMINI_API_KEY.to_string()
        });
        providers.groq.api_key = env::var("GROQ_API_KEY").unwrap_or_else(|_| {
            tracing::debug!("GROQ_API_KEY not set, using placeholder");
            PLACEHOLDER_GROQ_API_KEY.to_string()
        });

        Self {
            providers,
            mock: MockConfig::default(),
            defaults: DefaultsConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn bare() -> Config {
        Config::from_yaml_str("{}").unwrap()
    }

    #[test]
    fn test_yaml_sections_default_when_absent() {
        let cfg = bare();
        assert_eq!(cfg.providers.groq.base_url, "https://api.groq.com/openai/v1");
        assert!(cfg.providers.gemini.api_key.is_empty());
        assert_eq!(cfg.defaults.provider, ProviderIdentity::Gemini);
        assert_eq!(cfg.mock.latency_ms, 800);
    }

    #[test]
    fn test_yaml_overrides() {
        let cfg = Config::from_yaml_str(
            r#"
providers:
  groq:
    api_key: gsk_test
    model: llama-3.1-8b-instant
    base_url: http://localhost:9999/v1
    temperature: 0.0
    max_tokens: 256
defaults:
  provider: groq
  simulate: true
  batch_size: 5
"#,
        )
        .unwrap();
        assert_eq!(cfg.providers.groq.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.providers.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.defaults.provider, ProviderIdentity::Groq);
        assert!(cfg.default_mode().simulate);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = Config::from_yaml_str("defaults: [not, a, map]").unwrap_err();
        assert!(matches!(err, SentimentError::Config(_)));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("GROQ_API_KEY", "gsk_live"),
            ("SENTIMENT_DEFAULT_PROVIDER", "groq"),
            ("SENTIMENT_SIMULATE", "yes"),
            ("SENTIMENT_MOCK_LATENCY_MS", "5"),
            ("SENTIMENT_MOCK_JITTER_MS", "not-a-number"),
            ("SENTIMENT_HTTP_TIMEOUT_SECS", "15"),
        ]
        .into_iter()
        .collect();

        let mut cfg = bare();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.providers.groq.api_key, "gsk_live");
        assert_eq!(cfg.defaults.provider, ProviderIdentity::Groq);
        assert!(cfg.defaults.simulate);
        assert_eq!(cfg.mock.latency_ms, 5);
        // Unparseable values keep the previous setting
        assert_eq!(cfg.mock.jitter_ms, 700);
        assert_eq!(cfg.http.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_validate_flags_missing_default_key() {
        let cfg = bare();
        assert!(cfg.validate().is_err());
    }
}
