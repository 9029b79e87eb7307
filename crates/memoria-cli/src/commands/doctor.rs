//! Diagnostic commands.

use crate::bootstrap;
use console::{style, Emoji};
use memoria_core::config::{Config, StoreKind};
use memoria_core::error::ConfigError;
use std::path::Path;

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");
static WARN: Emoji = Emoji("⚠", "!");

const PROBE_TEXT: &str = "memoria health check";

/// Run the doctor command.
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("Memoria Doctor\n");

    let mut errors = 0;

    // Check config
    println!("Checking configuration...");

    let config = match Config::resolve(config_path) {
        Ok(config) => {
            println!("  {} Configuration loaded", style(CHECK).green());
            config
        }
        Err(ConfigError::NotFound(path)) => {
            println!("  {} Configuration file not found: {:?}", style(CROSS).red(), path);
            anyhow::bail!("configuration not found");
        }
        Err(e) => {
            println!("  {} Configuration error: {}", style(CROSS).red(), e);
            anyhow::bail!("configuration could not be loaded");
        }
    };

    if let Err(e) = config.validate() {
        println!("  {} Configuration invalid: {}", style(CROSS).red(), e);
        anyhow::bail!("configuration is invalid");
    }
    println!("  {} Configuration valid", style(CHECK).green());

    let client = bootstrap::http_client(&config.http)?;
    let memory = match bootstrap::build_memory(&config, &client) {
        Ok(memory) => memory,
        Err(e) => {
            println!("  {} Failed to build memory service: {:#}", style(CROSS).red(), e);
            anyhow::bail!("memory service unavailable");
        }
    };

    // Check embeddings
    println!("\nChecking embeddings...");
    let embedder = memory.embedder();
    match embedder.embed(PROBE_TEXT).await {
        Ok(vector) => println!(
            "  {} Embeddings up: {} ({} dimensions, reconciled to {})",
            style(CHECK).green(),
            embedder.model_name(),
            vector.len(),
            memory.dimension()
        ),
        Err(e) => {
            println!("  {} Embeddings down: {}: {}", style(CROSS).red(), embedder.model_name(), e);
            errors += 1;
        }
    }

    // Check vector store
    println!("\nChecking vector store...");
    let store = memory.vector_store();
    let target = match config.memory.store {
        StoreKind::Pinecone => config
            .pinecone
            .index_name
            .clone()
            .or_else(|| config.pinecone.host.clone())
            .unwrap_or_default(),
        _ => store.name().to_string(),
    };
    let zero = vec![0.0; memory.dimension()];
    match store.query(&zero, 1).await {
        Ok(_) => println!("  {} Vector store up: {}", style(CHECK).green(), target),
        Err(e) => {
            println!("  {} Vector store down: {}: {}", style(CROSS).red(), target, e);
            errors += 1;
        }
    }

    // Reported only
    println!("\nGeneration provider...");
    println!(
        "  {} {} / {} (not probed)",
        style(WARN).yellow(),
        config.generation.provider.as_str(),
        config.generation.model_or_default()
    );

    // Summary
    println!("\n{}", style("Summary").bold());
    println!("  Errors: {}", if errors > 0 { style(errors).red() } else { style(errors).green() });

    if errors > 0 {
        anyhow::bail!("{} error(s) found", errors);
    }

    Ok(())
}
