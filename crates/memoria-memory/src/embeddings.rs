//! Embedding generation providers.

use crate::error::MemoryError;
use crate::Result;
use async_trait::async_trait;
use memoria_core::config::{EmbeddingBackend, EmbeddingsConfig};
use memoria_core::SecretString;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Trait for embedding providers.
///
/// Vectors come back at the provider's native length; callers reconcile them
/// to the store dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for diagnostics.
    fn model_name(&self) -> &str;

    /// Native output length.
    fn dimension(&self) -> usize;

    /// Generate an embedding for one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Build the embedding provider selected by configuration.
pub fn from_config(config: &EmbeddingsConfig, client: Client) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingBackend::Hash => Arc::new(HashEmbeddings::new(config.hash_dimension)),
        EmbeddingBackend::Ollama => {
            let mut embedder = OllamaEmbeddings::new(config.model_or_default())
                .with_base_url(config.base_url_or_default())
                .with_client(client);
            if let Some(dimension) = config.native_dimension {
                embedder = embedder.with_dimension(dimension);
            }
            Arc::new(embedder)
        }
        EmbeddingBackend::Openai => {
            let key = config
                .api_key
                .clone()
                .ok_or_else(|| MemoryError::config("embeddings.api_key (OPENAI_API_KEY) is not set"))?;
            Arc::new(
                OpenAIEmbeddings::new(key)?
                    .with_model(config.model_or_default())
                    .with_base_url(config.base_url_or_default())
                    .with_client(client),
            )
        }
    };
    Ok(provider)
}

/// Deterministic embeddings derived from the SHA-256 digest of the text.
///
/// No network access. Identical text maps to identical vectors, but there is
/// no semantic similarity between different texts.
#[derive(Debug, Clone)]
pub struct HashEmbeddings {
    dimension: usize,
}

impl HashEmbeddings {
    /// Create a hash embedder producing `dimension` values in `[0, 1]`.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbeddings {
    fn default() -> Self {
        Self::new(1536)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    fn model_name(&self) -> &str {
        "local-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let digest = Sha256::digest(text.as_bytes());
        Ok((0..self.dimension)
            .map(|i| digest[i % digest.len()] as f32 / 255.0)
            .collect())
    }
}

/// Ollama embeddings provider (`/api/embeddings`).
pub struct OllamaEmbeddings {
    client: Client,
    base_url: String,
    model: String,
    /// Updated from each response.
    dimension: AtomicUsize,
}

impl OllamaEmbeddings {
    /// Create a provider for `model` on the default local server.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: "http://localhost:11434".to_string(),
            model: model.into(),
            dimension: AtomicUsize::new(4096),
        }
    }

    /// Set the server URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Declare the model's native dimension.
    pub fn with_dimension(self, dimension: usize) -> Self {
        self.dimension.store(dimension, Ordering::Relaxed);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension.load(Ordering::Relaxed)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            embedding: Option<Vec<f32>>,
        }

        debug!("Requesting Ollama embedding for text of length {}", text.len());

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&Request {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    MemoryError::embedding(format!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.base_url
                    ))
                } else {
                    MemoryError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::embedding(format!("API error {}: {}", status, body)));
        }

        let response: Response = response.json().await?;
        let embedding = response
            .embedding
            .ok_or_else(|| MemoryError::embedding("No 'embedding' key in Ollama response"))?;
        debug!("Ollama returned embedding with dimension {}", embedding.len());
        self.dimension.store(embedding.len(), Ordering::Relaxed);
        Ok(embedding)
    }
}

/// OpenAI embeddings provider (`/embeddings`).
pub struct OpenAIEmbeddings {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAIEmbeddings {
    /// Create a new OpenAI embeddings provider.
    pub fn new(api_key: impl Into<SecretString>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_blank() {
            return Err(MemoryError::config("OpenAI API key is required"));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: "text-embedding-ada-002".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (including the `/v1` prefix).
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

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            input: [&'a str; 1],
        }

        #[derive(Deserialize)]
        struct Response {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&Request {
                model: &self.model,
                input: [text],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => MemoryError::embedding("OpenAI API key is invalid or expired"),
                402 => MemoryError::embedding(format!("OpenAI quota exceeded: {}", body)),
                _ => MemoryError::embedding(format!("API error {}: {}", status, body)),
            });
        }

        let response: Response = response.json().await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| MemoryError::embedding("No embedding returned"))
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
