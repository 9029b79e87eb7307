//! OpenAI provider implementation.
//!
//! Single-turn completions against `/chat/completions`.

use crate::{ChatMessage, Provider, ProviderError, Result};
use async_trait::async_trait;
use memoria_core::config::DEFAULT_OPENAI_URL;
use memoria_core::SecretString;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const QUOTA_MESSAGE: &str =
    "OpenAI API quota exceeded. Please check your billing details at https://platform.openai.com/account/billing";

/// OpenAI chat provider.
pub struct OpenAIProvider {
    /// HTTP client.
    client: Client,

    /// API key.
    api_key: SecretString,

    /// API base URL (including `/v1`).
    api_base: String,

    /// Model to use.
    model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with an API key.
    pub fn new(api_key: impl Into<SecretString>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_blank() {
            return Err(ProviderError::config(
                "OpenAI API key is not set. Please set the OPENAI_API_KEY environment variable.",
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            api_base: DEFAULT_OPENAI_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
        })
    }

    /// Set the API base URL (for compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl OpenAIErrorDetail {
    fn is_quota(&self) -> bool {
        self.error_type.as_deref() == Some("insufficient_quota")
            || self.code.as_deref() == Some("insufficient_quota")
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Sending request to OpenAI: model={}, prompt length={}",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&OpenAIRequest {
                model: &self.model,
                messages: vec![ChatMessage::user(prompt)],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<OpenAIError>(&body)
                .map(|e| e.error)
                .unwrap_or(OpenAIErrorDetail {
                    message: body,
                    error_type: None,
                    code: None,
                });

            // A 429 carrying insufficient_quota will not clear by waiting.
            if status.as_u16() == 402 || detail.is_quota() {
                error!("{}", QUOTA_MESSAGE);
                return Err(ProviderError::quota(QUOTA_MESSAGE));
            }

            return Err(match status.as_u16() {
                401 => ProviderError::auth("OpenAI API key is invalid or expired"),
                429 => ProviderError::rate_limit(detail.message),
                400 | 404 => ProviderError::invalid_request(detail.message),
                code => ProviderError::server_error(code, detail.message),
            });
        }

        let response: OpenAIResponse = response.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::malformed("No choices in response"))
    }
}
