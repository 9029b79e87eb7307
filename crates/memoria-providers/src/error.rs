//! Error types for generation providers.

use thiserror::Error;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Provider error types.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication error (invalid or expired API key).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    /// Account quota exhausted. Retrying does not help.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Invalid request (bad parameters, unknown model, etc.).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-success answer from the provider.
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider could not be reached at all.
    #[error("Connection error: {0}")]
    Connection(String),


    /// Response was well-formed but missing the generated text.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a rate limit error.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Create a quota error.
    pub fn quota(message: impl Into<String>) -> Self {
        Self::QuotaExceeded(message.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a server error.
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the provider asked us to slow down.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }
}

impl From<memoria_core::ConfigError> for ProviderError {
    fn from(e: memoria_core::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ProviderError::auth("Invalid API key");
        assert!(matches!(err, ProviderError::Authentication(_)));

        let err = ProviderError::rate_limit("Too many requests");
        assert!(err.is_rate_limit());
        assert_eq!(err.to_string(), "Rate limit exceeded: Too many requests");
    }

    #[test]
    fn test_only_rate_limit_is_rate_limit() {
        assert!(!ProviderError::quota("insufficient_quota").is_rate_limit());
        assert!(!ProviderError::server_error(503, "").is_rate_limit());
        assert!(!ProviderError::auth("").is_rate_limit());
    }
}
