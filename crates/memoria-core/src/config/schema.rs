//! Configuration schema definitions.

use crate::error::ConfigError;
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Ollama server URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Main Memoria configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Memory layer settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Embedding provider settings.
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Text generation provider settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Pinecone index settings.
    #[serde(default)]
    pub pinecone: PineconeConfig,

    /// Agent settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Memory layer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Fixed vector dimension of the store. Every stored or queried vector
    /// is reconciled to this length.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Value written to the `source` metadata field.
    #[serde(default = "default_source")]
    pub source: String,

    /// How `store` decides between insert and update.
    #[serde(default)]
    pub existence_check: ExistenceCheck,

    /// Vector store backend.
    #[serde(default)]
    pub store: StoreKind,

    /// File used by the local store. Defaults to `~/.memoria/memories.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

fn default_dimension() -> usize {
    1024
}

fn default_source() -> String {
    "agent".to_string()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            source: default_source(),
            existence_check: ExistenceCheck::default(),
            store: StoreKind::default(),
            local_path: None,
        }
    }
}

/// Strategy for detecting whether a memory already exists before writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistenceCheck {
    /// Fetch the content id directly.
    #[default]
    ExactId,
    /// Query with the vector being stored and treat any top-1 hit as existing.
    /// Near-duplicate content can match an unrelated record.
    Similarity,
}

/// Vector store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Remote Pinecone index.
    Pinecone,
    /// JSON file on local disk.
    #[default]
    Local,
    /// Process memory only; lost on exit.
    InMemory,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Provider backend.
    #[serde(default)]
    pub provider: EmbeddingBackend,

    /// Model name. Backend default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API base URL. Backend default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key (OpenAI only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Output length of the hash embedder.
    #[serde(default = "default_hash_dimension")]
    pub hash_dimension: usize,

    /// Native output length of the Ollama model. Learned from the first
    /// response when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_dimension: Option<usize>,
}

fn default_hash_dimension() -> usize {
    1536
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::default(),
            model: None,
            base_url: None,
            api_key: None,
            hash_dimension: default_hash_dimension(),
            native_dimension: None,
        }
    }
}

impl EmbeddingsConfig {
    /// Model name, falling back to the backend default.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.provider {
                EmbeddingBackend::Hash => "local-hash",
                EmbeddingBackend::Ollama => "llama2",
                EmbeddingBackend::Openai => "text-embedding-ada-002",
            }
            .to_string()
        })
    }

    /// Base URL, falling back to the backend default.
    pub fn base_url_or_default(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            match self.provider {
                EmbeddingBackend::Openai => DEFAULT_OPENAI_URL,
                _ => DEFAULT_OLLAMA_URL,
            }
            .to_string()
        })
    }
}

/// Embedding backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Deterministic SHA-256 based vectors, no network.
    Hash,
    #[default]
    Ollama,
    Openai,
}

/// Text generation provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider backend.
    #[serde(default)]
    pub provider: GenerationBackend,

    /// Model name. Backend default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API base URL. Backend default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key (OpenAI only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Rate limit retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl GenerationConfig {
    /// Model name, falling back to the backend default.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.provider {
                GenerationBackend::Ollama => "llama2",
                GenerationBackend::Openai => "gpt-3.5-turbo",
            }
            .to_string()
        })
    }

    /// Base URL, falling back to the backend default.
    pub fn base_url_or_default(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            match self.provider {
                GenerationBackend::Ollama => DEFAULT_OLLAMA_URL,
                GenerationBackend::Openai => DEFAULT_OPENAI_URL,
            }
            .to_string()
        })
    }
}

/// Generation backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackend {
    #[default]
    Ollama,
    Openai,
}

impl GenerationBackend {
    /// Backend name as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Openai => "openai",
        }
    }
}

/// Fixed-delay retry policy for rate-limited generation calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Pinecone index configuration.
///
/// The index endpoint is either `host` verbatim or is derived as
/// `https://{index_name}-{project_id}.svc.{environment}.pinecone.io`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PineconeConfig {
    /// API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Full index host URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Index name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// Project identifier in the index host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Environment, e.g. `us-east-1-aws`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Namespace within the index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl PineconeConfig {
    /// Resolve the index endpoint.
    pub fn base_url(&self) -> Result<String, ConfigError> {
        if let Some(host) = &self.host {
            let host = if host.starts_with("http://") || host.starts_with("https://") {
                host.clone()
            } else {
                format!("https://{}", host)
            };
            url::Url::parse(&host)
                .map_err(|e| ConfigError::invalid_endpoint(&host, e.to_string()))?;
            return Ok(host.trim_end_matches('/').to_string());
        }

        match (&self.index_name, &self.project_id, &self.environment) {
            (Some(index), Some(project), Some(environment)) => Ok(format!(
                "https://{}-{}.svc.{}.pinecone.io",
                index, project, environment
            )),
            _ => Err(ConfigError::Validation(
                "Pinecone host, or index_name, project_id and environment, must be configured"
                    .to_string(),
            )),
        }
    }

    /// The API key, failing if it is missing or blank.
    pub fn require_api_key(&self) -> Result<&SecretString, ConfigError> {
        self.api_key
            .as_ref()
            .filter(|k| !k.is_blank())
            .ok_or_else(|| ConfigError::missing_credential("pinecone.api_key (PINECONE_API_KEY)"))
    }
}

/// Agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Memories retrieved as context for each task.
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,

    /// Run tasks one at a time instead of letting them race.
    #[serde(default)]
    pub serialize_tasks: bool,
}

fn default_context_limit() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            context_limit: default_context_limit(),
            serialize_tasks: false,
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string for an `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
