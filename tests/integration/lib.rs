//! Shared fixtures for the integration tests.

use memoria_core::config::{Config, EmbeddingBackend, StoreKind};
use std::path::Path;

/// A configuration that needs no network for memory: hash embeddings and a
/// file-backed local store under `dir`.
pub fn offline_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.embeddings.provider = EmbeddingBackend::Hash;
    config.memory.store = StoreKind::Local;
    config.memory.local_path = Some(dir.join("memories.json"));
    config.memory.dimension = 128;
    config.generation.retry.delay_ms = 0;
    config
}

/// Point text generation at a mock Ollama server.
pub fn with_generation_at(mut config: Config, base_url: &str) -> Config {
    config.generation.base_url = Some(base_url.to_string());
    config
}
