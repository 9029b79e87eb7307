//! Configuration loading, environment overrides, and validation.

use super::{Config, EmbeddingBackend, GenerationBackend, StoreKind};
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use crate::secret::SecretString;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// if present and built-in defaults otherwise. Environment overrides are
    /// applied last.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::load_default() {
                Ok(config) => config,
                Err(ConfigError::NotFound(path)) => {
                    tracing::debug!("No config file at {}, using defaults", path.display());
                    Self::default()
                }
                Err(e) => return Err(e),
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(env::get_var);
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(vars::PINECONE_API_KEY) {
            self.pinecone.api_key = Some(SecretString::new(key));
        }
        if let Some(host) = lookup(vars::PINECONE_HOST) {
            self.pinecone.host = Some(host);
        }
        if let Some(index) = lookup(vars::PINECONE_INDEX) {
            self.pinecone.index_name = Some(index);
        }
        if let Some(environment) = lookup(vars::PINECONE_ENVIRONMENT) {
            self.pinecone.environment = Some(environment);
        }

        if let Some(key) = lookup(vars::OPENAI_API_KEY) {
            if self.embeddings.provider == EmbeddingBackend::Openai {
                self.embeddings.api_key = Some(SecretString::new(key.clone()));
            }
            if self.generation.provider == GenerationBackend::Openai {
                self.generation.api_key = Some(SecretString::new(key));
            }
        }

        if let Some(url) = lookup(vars::OLLAMA_BASE_URL) {
            if self.embeddings.provider == EmbeddingBackend::Ollama {
                self.embeddings.base_url = Some(url.clone());
            }
            if self.generation.provider == GenerationBackend::Ollama {
                self.generation.base_url = Some(url);
            }
        }
        if let Some(model) = lookup(vars::OLLAMA_MODEL) {
            if self.embeddings.provider == EmbeddingBackend::Ollama {
                self.embeddings.model = Some(model.clone());
            }
            if self.generation.provider == GenerationBackend::Ollama {
                self.generation.model = Some(model);
            }
        }
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Dimensions
        if self.memory.dimension == 0 {
            errors.push("memory.dimension must be greater than 0".to_string());
        }
        if self.embeddings.provider == EmbeddingBackend::Hash && self.embeddings.hash_dimension == 0
        {
            errors.push("embeddings.hash_dimension must be greater than 0".to_string());
        }

        // 2. Agent and transport limits
        if self.agent.context_limit == 0 {
            errors.push("agent.context_limit must be greater than 0".to_string());
        }
        if self.http.timeout_secs == 0 {
            errors.push("http.timeout_secs must be greater than 0".to_string());
        }

        // 3. Pinecone endpoint and credentials
        if self.memory.store == StoreKind::Pinecone {
            if let Err(e) = self.pinecone.require_api_key() {
                errors.push(e.to_string());
            }
            if let Err(e) = self.pinecone.base_url() {
                errors.push(e.to_string());
            }
        }

        // 4. Provider credentials
        if self.embeddings.provider == EmbeddingBackend::Openai
            && self.embeddings.api_key.as_ref().map_or(true, |k| k.is_blank())
        {
            errors.push("embeddings.api_key is required for the openai backend".to_string());
        }
        if self.generation.provider == GenerationBackend::Openai
            && self.generation.api_key.as_ref().map_or(true, |k| k.is_blank())
        {
            errors.push("generation.api_key is required for the openai backend".to_string());
        }

        // 5. Endpoint syntax
        if self.embeddings.provider != EmbeddingBackend::Hash {
            check_url("embeddings.base_url", &self.embeddings.base_url_or_default(), &mut errors);
        }
        check_url("generation.base_url", &self.generation.base_url_or_default(), &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

fn check_url(field: &str, value: &str, errors: &mut Vec<String>) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!("{}: unsupported scheme '{}'", field, url.scheme())),
        Err(e) => errors.push(format!("{}: invalid URL '{}': {}", field, value, e)),
    }
}
