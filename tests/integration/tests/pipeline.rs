//! End-to-end task processing wired from configuration.
//!
//! Memory runs offline (hash embeddings, file-backed local store); text
//! generation and Pinecone are served by mock HTTP servers.

use memoria_agent::{AgentState, TaskStage};
use memoria_cli::bootstrap;
use memoria_core::config::{Config, StoreKind};
use memoria_core::SecretString;
use memoria_integration_tests::{offline_config, with_generation_at};
use memoria_memory::{content_id, keys, LocalVectorStore, VectorStore};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "llama2",
        "message": {"role": "assistant", "content": content},
        "done": true
    }))
}

#[tokio::test]
async fn test_task_uses_context_and_persists_result() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_string_contains("Relevant context:\\n- The sky is blue\\n"))
        .respond_with(chat_reply("Rayleigh scattering makes the sky blue."))
        .expect(1)
        .mount(&server)
        .await;

    let config = with_generation_at(offline_config(dir.path()), &server.uri());
    let agent = bootstrap::build_agent(&config).unwrap();

    agent.update_memory("The sky is blue").await.unwrap();
    let result = agent.process_task("Why is the sky blue?").await.unwrap();
    assert_eq!(result, "Rayleigh scattering makes the sky blue.");
    assert_eq!(agent.state(), AgentState::Idle);

    // The result survives a restart
    let store = LocalVectorStore::open(dir.path().join("memories.json")).unwrap();
    let stored = store.fetch(&[content_id(&result)]).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].metadata[keys::TYPE], "result");
    assert_eq!(stored[0].metadata[keys::TASK], "Why is the sky blue?");
    assert_eq!(stored[0].vector.len(), 128);
}

#[tokio::test]
async fn test_rate_limited_generation_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply("done"))
        .expect(1)
        .mount(&server)
        .await;

    let config = with_generation_at(offline_config(dir.path()), &server.uri());
    let agent = bootstrap::build_agent(&config).unwrap();

    assert_eq!(agent.process_task("anything").await.unwrap(), "done");
    assert_eq!(agent.state(), AgentState::Idle);
}

#[tokio::test]
async fn test_generation_failure_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let config = with_generation_at(offline_config(dir.path()), &server.uri());
    let agent = bootstrap::build_agent(&config).unwrap();

    let err = agent.process_task("anything").await.unwrap_err();
    assert_eq!(err.stage(), Some(TaskStage::Generate));
    assert!(err.to_string().contains("model crashed"));
    assert_eq!(agent.state(), AgentState::Error);
    assert!(agent.memory().retrieve_similar("anything", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_same_text_is_one_record_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());

    for _ in 0..2 {
        let client = bootstrap::http_client(&config.http).unwrap();
        let memory = bootstrap::build_memory(&config, &client).unwrap();
        let id = memory.store("The sky is blue", HashMap::new()).await.unwrap();
        assert_eq!(id, "Bmm0wdWmsUoMMB1TalF6yShZAlZM2548xNr/dqUPN+E=");
    }

    let store = LocalVectorStore::open(dir.path().join("memories.json")).unwrap();
    assert_eq!(store.len().await, 1);
}

fn pinecone_config(dir: &std::path::Path, host: String) -> Config {
    let mut config = offline_config(dir);
    config.memory.store = StoreKind::Pinecone;
    config.pinecone.api_key = Some(SecretString::new("pk-integration"));
    config.pinecone.host = Some(host);
    config
}

#[tokio::test]
async fn test_pinecone_new_memory_is_upserted() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let id = content_id("The sky is blue");

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .and(query_param("ids", id.as_str()))
        .and(header("Api-Key", "pk-integration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vectors": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .and(body_partial_json(json!({"vectors": [{"id": id, "metadata": {"text": "The sky is blue"}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let config = pinecone_config(dir.path(), server.uri());
    let client = bootstrap::http_client(&config.http).unwrap();
    let memory = bootstrap::build_memory(&config, &client).unwrap();

    assert_eq!(memory.store("The sky is blue", HashMap::new()).await.unwrap(), id);
}

#[tokio::test]
async fn test_pinecone_existing_memory_is_updated() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let id = content_id("The sky is blue");

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vectors": {(id.clone()): {"id": id, "values": [0.1], "metadata": {"text": "The sky is blue"}}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vectors/update"))
        .and(body_partial_json(json!({"id": id, "setMetadata": {"text": "The sky is blue", "type": "fact"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let config = pinecone_config(dir.path(), server.uri());
    let client = bootstrap::http_client(&config.http).unwrap();
    let memory = bootstrap::build_memory(&config, &client).unwrap();

    let extra = HashMap::from([("type".to_string(), "fact".to_string())]);
    memory.store("The sky is blue", extra).await.unwrap();
}

#[tokio::test]
async fn test_pinecone_failure_surfaces_status() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API Key"))
        .mount(&server)
        .await;

    let config = pinecone_config(dir.path(), server.uri());
    let client = bootstrap::http_client(&config.http).unwrap();
    let memory = bootstrap::build_memory(&config, &client).unwrap();

    match memory.retrieve_similar("sky", 3).await {
        Err(memoria_memory::MemoryError::Store { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "Invalid API Key");
        }
        other => panic!("Expected store error, got {:?}", other),
    }
}
