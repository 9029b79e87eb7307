//! Pinecone vector index client.
//!
//! Talks to the data-plane endpoints of one index. Every request carries the
//! `Api-Key` header; any non-2xx answer becomes [`MemoryError::Store`] with
//! the status and body.

use crate::error::MemoryError;
use crate::store::{QueryMatch, VectorStore};
use crate::{Memory, Result};
use async_trait::async_trait;
use memoria_core::config::PineconeConfig;
use memoria_core::SecretString;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Client for a single Pinecone index.
pub struct PineconeStore {
    client: Client,
    base_url: String,
    api_key: SecretString,
    namespace: Option<String>,
}

impl PineconeStore {
    /// Create a client for the index at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<SecretString>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_blank() {
            return Err(MemoryError::config("Pinecone API key must be configured"));
        }
        Ok(Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            namespace: None,
        })
    }

    /// Create a client from configuration, failing before any network call
    /// if the key or endpoint is missing.
    pub fn from_config(config: &PineconeConfig, client: Client) -> Result<Self> {
        let api_key = config.require_api_key()?.clone();
        let base_url = config.base_url()?;
        info!(
            "Pinecone store at {} (key {})",
            base_url,
            api_key.masked()
        );

        let mut store = Self::new(base_url, api_key)?.with_client(client);
        store.namespace = config.namespace.clone();
        Ok(store)
    }

    /// Scope all operations to a namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The index endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, endpoint))
            .header("Api-Key", self.api_key.expose_secret())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::store(status.as_u16(), body));
        }
        debug!("Pinecone responded {}", status);
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    fn name(&self) -> &str {
        "pinecone"
    }

    async fn upsert(&self, memories: &[Memory]) -> Result<()> {
        #[derive(Serialize)]
        struct Request<'a> {
            vectors: &'a [Memory],
            #[serde(skip_serializing_if = "Option::is_none")]
            namespace: Option<&'a str>,
        }

        let request = self.post("/vectors/upsert").json(&Request {
            vectors: memories,
            namespace: self.namespace.as_deref(),
        });
        let _: serde_json::Value = self.send(request).await?;
        info!("Upserted {} vectors", memories.len());
        Ok(())
    }

    async fn update(&self, memory: &Memory) -> Result<()> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Request<'a> {
            id: &'a str,
            values: &'a [f32],
            set_metadata: &'a HashMap<String, String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            namespace: Option<&'a str>,
        }

        let request = self.post("/vectors/update").json(&Request {
            id: &memory.id,
            values: &memory.vector,
            set_metadata: &memory.metadata,
            namespace: self.namespace.as_deref(),
        });
        let _: serde_json::Value = self.send(request).await?;
        info!("Updated vector {}", memory.id);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Request<'a> {
            vector: &'a [f32],
            top_k: usize,
            include_metadata: bool,
            include_values: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            namespace: Option<&'a str>,
        }

        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            matches: Vec<ApiMatch>,
        }

        #[derive(Deserialize)]
        struct ApiMatch {
            id: String,
            #[serde(default)]
            score: f32,
            #[serde(default)]
            metadata: Option<HashMap<String, serde_json::Value>>,
        }

        let request = self.post("/query").json(&Request {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        });
        let response: Response = self.send(request).await?;
        debug!("Pinecone returned {} matches", response.matches.len());

        Ok(response
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: stringify_metadata(m.metadata.unwrap_or_default()),
            })
            .collect())
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<Memory>> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            vectors: HashMap<String, ApiVector>,
        }

        #[derive(Deserialize)]
        struct ApiVector {
            id: String,
            #[serde(default)]
            values: Vec<f32>,
            #[serde(default)]
            metadata: Option<HashMap<String, serde_json::Value>>,
        }

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut params: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        if let Some(namespace) = &self.namespace {
            params.push(("namespace", namespace));
        }

        let request = self
            .client
            .get(format!("{}/vectors/fetch", self.base_url))
            .header("Api-Key", self.api_key.expose_secret())
            .query(&params);
        let response: Response = self.send(request).await?;

        // Keep the caller's id order
        let mut vectors = response.vectors;
        Ok(ids
            .iter()
            .filter_map(|id| vectors.remove(id))
            .map(|v| Memory {
                id: v.id,
                vector: v.values,
                metadata: stringify_metadata(v.metadata.unwrap_or_default()),
            })
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        #[derive(Serialize)]
        struct Request<'a> {
            ids: &'a [String],
            #[serde(skip_serializing_if = "Option::is_none")]
            namespace: Option<&'a str>,
        }

        if ids.is_empty() {
            return Ok(());
        }

        let request = self.post("/vectors/delete").json(&Request {
            ids,
            namespace: self.namespace.as_deref(),
        });
        let _: serde_json::Value = self.send(request).await?;
        info!("Deleted {} vectors", ids.len());
        Ok(())
    }
}

/// Pinecone metadata values may be strings, numbers, booleans or lists.
fn stringify_metadata(metadata: HashMap<String, serde_json::Value>) -> HashMap<String, String> {
    metadata
        .into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect()
}
