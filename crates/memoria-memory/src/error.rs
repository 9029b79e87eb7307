//! Memory error types.

use thiserror::Error;

/// Errors that can occur during memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network failure talking to a remote service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedding generation failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The vector store answered with a non-success status.
    #[error("Store error: HTTP {status}: {body}")]
    Store {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Missing credentials, endpoints, or an unusable dimension.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A vector cannot be reconciled.
    #[error("Dimension error: {0}")]
    Dimension(String),

    /// Caller passed an unusable argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MemoryError {
    /// Create an embedding error.
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a store error.
    pub fn store(status: u16, body: impl Into<String>) -> Self {
        Self::Store {
            status,
            body: body.into(),
        }
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<memoria_core::ConfigError> for MemoryError {
    fn from(e: memoria_core::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
