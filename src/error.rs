use thiserror::Error;

use crate::models::ProviderIdentity;

pub type Result<T> = std::result::Result<T, SentimentError>;

/// Failure taxonomy surfaced to callers of the sentiment service.
///
/// The four provider variants are the whole contract for live calls; `Config`
/// and `Io` only come out of configuration loading.
#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("No API key configured for {provider}; set one or use simulate mode")]
    MissingCredential { provider: ProviderIdentity },

    #[error("Connection to provider failed: {0}")]
    ProviderUnreachable(String),

    #[error("{provider} request failed (HTTP {status}): {message}")]
    ProviderRequestFailed {
        provider: ProviderIdentity,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {detail}")]
    ProviderResponseInvalid {
        provider: ProviderIdentity,
        detail: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Payload-free tag for branching on a failure without matching its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    ProviderUnreachable,
    ProviderRequestFailed,
    ProviderResponseInvalid,
    Config,
}

impl SentimentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::ProviderUnreachable(_) => ErrorKind::ProviderUnreachable,
            Self::ProviderRequestFailed { .. } => ErrorKind::ProviderRequestFailed,
            Self::ProviderResponseInvalid { .. } => ErrorKind::ProviderResponseInvalid,
            Self::Config(_) | Self::Io(_) => ErrorKind::Config,
        }
    }

    /// Whether offering simulate mode is a sensible next step for the caller.
    pub fn is_recoverable_by_simulation(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::ProviderUnreachable(_)
        )
    }

    pub(crate) fn invalid(provider: ProviderIdentity, detail: impl Into<String>) -> Self {
        Self::ProviderResponseInvalid {
            provider,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        let err = SentimentError::MissingCredential {
            provider: ProviderIdentity::Groq,
        };
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        assert!(err.is_recoverable_by_simulation());

        let err = SentimentError::invalid(ProviderIdentity::Gemini, "empty candidates");
        assert_eq!(err.kind(), ErrorKind::ProviderResponseInvalid);
        assert!(!err.is_recoverable_by_simulation());
        assert_eq!(
            err.to_string(),
            "Invalid response from gemini: empty candidates"
        );
    }

    #[test]
    fn test_request_failed_message() {
        let err = SentimentError::ProviderRequestFailed {
            provider: ProviderIdentity::Groq,
            status: 401,
            message: "Invalid API Key".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ProviderRequestFailed);
        assert_eq!(
            err.to_string(),
            "groq request failed (HTTP 401): Invalid API Key"
        );
    }
}
