//! Presence checks for provider API keys.
//!
//! Only the configuration value handed in is consulted, never the process
//! environment, so callers can test any mix of configured providers.

use crate::config::{PLACEHOLDER_GEMINI_API_KEY, PLACEHOLDER_GROQ_API_KEY, ProvidersConfig};
use crate::models::ProviderIdentity;

/// The usable secret for `provider`, if one is configured.
pub fn credential(providers: &ProvidersConfig, provider: ProviderIdentity) -> Option<&str> {
    usable_key(&providers.settings(provider).api_key)
}

/// Trims `raw` and rejects blank or placeholder keys.
pub fn usable_key(raw: &str) -> Option<&str> {
    let key = raw.trim();
    if key.is_empty() || key == PLACEHOLDER_GEMINI_API_KEY || key == PLACEHOLDER_GROQ_API_KEY {
        return None;
    }
    Some(key)
}

pub fn has_credential(providers: &ProvidersConfig, provider: ProviderIdentity) -> bool {
    credential(providers, provider).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_placeholder_keys_are_absent() {
        let mut providers = ProvidersConfig::default();
        assert!(!has_credential(&providers, ProviderIdentity::Gemini));

        providers.gemini.api_key = "   ".to_string();
        assert!(!has_credential(&providers, ProviderIdentity::Gemini));

        providers.groq.api_key = PLACEHOLDER_GROQ_API_KEY.to_string();
        assert!(!has_credential(&providers, ProviderIdentity::Groq));
    }

    #[test]
    fn test_keys_are_per_provider() {
        let mut providers = ProvidersConfig::default();
        providers.groq.api_key = " gsk_abc ".to_string();

        assert!(has_credential(&providers, ProviderIdentity::Groq));
        assert!(!has_credential(&providers, ProviderIdentity::Gemini));
        assert_eq!(credential(&providers, ProviderIdentity::Groq), Some("gsk_abc"));
    }
}
