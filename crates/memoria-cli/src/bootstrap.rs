//! Building the configured components.

use anyhow::Context;
use memoria_agent::Agent;
use memoria_core::config::{Config, HttpConfig};
use memoria_memory::MemoryService;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Load and validate the effective configuration.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::resolve(path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Shared HTTP client carrying the transport timeout.
pub fn http_client(config: &HttpConfig) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")
}

/// Build the memory service: embeddings, store, and reconciliation.
pub fn build_memory(config: &Config, client: &Client) -> anyhow::Result<Arc<MemoryService>> {
    let embedder = memoria_memory::embeddings::from_config(&config.embeddings, client.clone())?;
    let store = memoria_memory::store::from_config(
        config.memory.store,
        config.memory.local_path.as_deref(),
        &config.pinecone,
        client.clone(),
    )?;
    debug!(
        "Using {} embeddings with the {} store",
        embedder.model_name(),
        store.name()
    );

    Ok(Arc::new(MemoryService::new(embedder, store, &config.memory)?))
}

/// Build a fully wired agent.
pub fn build_agent(config: &Config) -> anyhow::Result<Agent> {
    let client = http_client(&config.http)?;
    let memory = build_memory(config, &client)?;
    let provider = memoria_providers::from_config(&config.generation, client)?;
    Ok(Agent::new(memory, provider, &config.agent)?)
}
