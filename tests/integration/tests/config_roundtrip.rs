//! Config load/save and environment override integration tests.

use memoria_core::config::{Config, EmbeddingBackend, ExistenceCheck, GenerationBackend, StoreKind};
use memoria_integration_tests::offline_config;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memoria.json5");

    let config = offline_config(dir.path());
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_handwritten_json5() {
    let config = Config::parse(
        r#"{
            // Pinecone-backed memory with OpenAI generation
            memory: { dimension: 1536, existence_check: "similarity", store: "pinecone" },
            embeddings: { provider: "openai", api_key: "sk-embed" },
            generation: { provider: "openai", retry: { max_retries: 5 } },
            pinecone: {
                api_key: "pk-123",
                index_name: "agent",
                project_id: "abc123",
                environment: "us-east-1-aws",
            },
            agent: { context_limit: 3 },
        }"#,
    )
    .unwrap();

    assert_eq!(config.memory.dimension, 1536);
    assert_eq!(config.memory.existence_check, ExistenceCheck::Similarity);
    assert_eq!(config.memory.store, StoreKind::Pinecone);
    assert_eq!(config.embeddings.provider, EmbeddingBackend::Openai);
    assert_eq!(config.generation.provider, GenerationBackend::Openai);
    assert_eq!(config.generation.retry.max_retries, 5);
    assert_eq!(config.generation.retry.delay_ms, 1000);
    assert_eq!(config.agent.context_limit, 3);
    assert_eq!(
        config.pinecone.base_url().unwrap(),
        "https://agent-abc123.svc.us-east-1-aws.pinecone.io"
    );

    // Generation has no key of its own yet
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("generation.api_key"), "{}", err);
}

#[test]
fn test_env_overrides_fill_credentials() {
    let mut config = Config::parse(r#"{ memory: { store: "pinecone" } }"#).unwrap();
    assert!(config.validate().is_err());

    config.apply_overrides_from(|name| match name {
        "PINECONE_API_KEY" => Some("pk-env".to_string()),
        "PINECONE_HOST" => Some("https://agent-abc.svc.pinecone.io".to_string()),
        _ => None,
    });

    assert!(config.validate().is_ok());
    assert_eq!(
        config.pinecone.api_key.as_ref().map(|k| k.expose_secret()),
        Some("pk-env")
    );
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/memoria.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json5").is_err());
}
