//! Ollama provider implementation.
//!
//! Uses the non-streaming `/api/chat` endpoint of a local Ollama server.

use crate::{ChatMessage, Provider, ProviderError, Result};
use async_trait::async_trait;
use memoria_core::config::DEFAULT_OLLAMA_URL;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ollama chat provider.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// Create a provider for `model` on the default local server.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: model.into(),
        }
    }

    /// Set the server base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Sending request to Ollama: model={}", self.model);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage::user(prompt)],
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::Connection(format!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.base_url
                    ))
                } else {
                    ProviderError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => ProviderError::rate_limit(body),
                404 => ProviderError::invalid_request(format!(
                    "model '{}' not found: {}",
                    self.model, body
                )),
                code => ProviderError::server_error(code, body),
            });
        }

        let response: ChatResponse = response.json().await?;
        response
            .message
            .map(|m| m.content)
            .ok_or_else(|| ProviderError::malformed("No 'message' in Ollama response"))
    }
}
