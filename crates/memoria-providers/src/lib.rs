//! Text generation providers for Memoria.
//!
//! This crate provides implementations for:
//! - Ollama (local models over `/api/chat`)
//! - OpenAI (`/chat/completions`)
//!
//! plus [`RetryingProvider`], which retries rate-limited calls after a fixed
//! delay.
//!
//! # Example
//!
//! ```rust,ignore
//! use memoria_providers::{OllamaProvider, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OllamaProvider::new("llama2");
//!     let reply = provider.complete("Why is the sky blue?").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod error;
pub mod ollama;
pub mod openai;
pub mod retry;

pub use error::{ProviderError, Result};
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use retry::RetryingProvider;

use async_trait::async_trait;
use memoria_core::config::{GenerationBackend, GenerationConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A model that turns a prompt into text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// Model used for completions.
    fn model(&self) -> &str;

    /// Generate a completion for a single user prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// A chat message in the shape both backends accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub(crate) fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Build the generation provider selected by configuration, wrapped in the
/// configured rate-limit retry policy.
pub fn from_config(config: &GenerationConfig, client: Client) -> Result<Arc<dyn Provider>> {
    let inner: Arc<dyn Provider> = match config.provider {
        GenerationBackend::Ollama => Arc::new(
            OllamaProvider::new(config.model_or_default())
                .with_base_url(config.base_url_or_default())
                .with_client(client),
        ),
        GenerationBackend::Openai => {
            let key = config
                .api_key
                .clone()
                .ok_or_else(|| ProviderError::config("generation.api_key (OPENAI_API_KEY) is not set"))?;
            Arc::new(
                OpenAIProvider::new(key)?
                    .with_model(config.model_or_default())
                    .with_base_url(config.base_url_or_default())
                    .with_client(client),
            )
        }
    };

    Ok(Arc::new(RetryingProvider::new(
        inner,
        config.retry.max_retries,
        Duration::from_millis(config.retry.delay_ms),
    )))
}
