//! Memory service: content-addressed storage and similarity retrieval.

use crate::embeddings::EmbeddingProvider;
use crate::error::MemoryError;
use crate::reconcile::DimensionReconciler;
use crate::store::VectorStore;
use crate::{content_id, keys, Memory, Result, ScoredMemory};
use memoria_core::config::{ExistenceCheck, MemoryConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stores text as vectors and retrieves the most similar stored text.
pub struct MemoryService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    reconciler: DimensionReconciler,
    existence_check: ExistenceCheck,
    source: String,
}

impl MemoryService {
    /// Create a service over an embedder and a store.
    ///
    /// Fails if the configured dimension is zero.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: &MemoryConfig,
    ) -> Result<Self> {
        let reconciler = DimensionReconciler::new(config.dimension)?;
        debug!(
            "Memory service: {} embeddings ({}d) into {} store ({}d)",
            embedder.model_name(),
            embedder.dimension(),
            store.name(),
            reconciler.target()
        );

        Ok(Self {
            embedder,
            store,
            reconciler,
            existence_check: config.existence_check,
            source: config.source.clone(),
        })
    }

    /// The store dimension.
    pub fn dimension(&self) -> usize {
        self.reconciler.target()
    }

    /// The embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// The vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Embed `text` and reconcile it to the store dimension.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.embed(text).await?;
        self.reconciler.reconcile(vector)
    }

    /// Store `text` with caller metadata and return its content id.
    ///
    /// Storing the same text again rewrites the existing record; caller keys
    /// override the base `text`, `timestamp` and `source` fields.
    pub async fn store(
        &self,
        text: &str,
        extra_metadata: HashMap<String, String>,
    ) -> Result<String> {
        let id = content_id(text);
        let vector = self.embed(text).await?;

        let mut metadata = HashMap::from([
            (keys::TEXT.to_string(), text.to_string()),
            (keys::TIMESTAMP.to_string(), chrono::Utc::now().to_rfc3339()),
            (keys::SOURCE.to_string(), self.source.clone()),
        ]);
        metadata.extend(extra_metadata);

        let memory = Memory {
            id: id.clone(),
            vector,
            metadata,
        };

        if self.exists(&memory).await? {
            self.store.update(&memory).await?;
            info!("Updated memory {}", id);
        } else {
            self.store.upsert(std::slice::from_ref(&memory)).await?;
            info!("Stored memory {}", id);
        }

        Ok(id)
    }

    async fn exists(&self, memory: &Memory) -> Result<bool> {
        match self.existence_check {
            ExistenceCheck::ExactId => {
                let found = self.store.fetch(std::slice::from_ref(&memory.id)).await?;
                Ok(!found.is_empty())
            }
            ExistenceCheck::Similarity => {
                let matches = self.store.query(&memory.vector, 1).await?;
                Ok(!matches.is_empty())
            }
        }
    }

    /// Texts of the `limit` memories most similar to `query`, best first.
    pub async fn retrieve_similar(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .retrieve_matches(query, limit)
            .await?
            .into_iter()
            .map(|m| m.text)
            .collect())
    }

    /// The `limit` memories most similar to `query` with ids and scores.
    pub async fn retrieve_matches(&self, query: &str, limit: usize) -> Result<Vec<ScoredMemory>> {
        if limit == 0 {
            return Err(MemoryError::InvalidArgument(
                "limit must be greater than 0".to_string(),
            ));
        }

        let vector = self.embed(query).await?;
        let matches = self.store.query(&vector, limit).await?;
        debug!("Query returned {} matches", matches.len());

        Ok(matches
            .into_iter()
            .filter_map(|mut m| match m.metadata.remove(keys::TEXT) {
                Some(text) => Some(ScoredMemory {
                    id: m.id,
                    text,
                    score: m.score,
                    metadata: m.metadata,
                }),
                None => {
                    warn!("Skipping match {} without text metadata", m.id);
                    None
                }
            })
            .collect())
    }

    /// Delete a memory by id. Unknown ids succeed.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(&[id.to_string()]).await?;
        info!("Deleted memory {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbeddings;
    use crate::store::{LocalVectorStore, QueryMatch};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(dimension: usize) -> MemoryConfig {
        MemoryConfig {
            dimension,
            ..Default::default()
        }
    }

    fn service(store: Arc<dyn VectorStore>, config: &MemoryConfig) -> MemoryService {
        MemoryService::new(Arc::new(HashEmbeddings::new(32)), store, config).unwrap()
    }

    /// Counts write calls on top of an in-memory store.
    #[derive(Default)]
    struct CountingStore {
        inner: LocalVectorStore,
        upserts: AtomicUsize,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl VectorStore for CountingStore {
        fn name(&self) -> &str {
            "counting"
        }

        async fn upsert(&self, memories: &[Memory]) -> Result<()> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            self.inner.upsert(memories).await
        }

        async fn update(&self, memory: &Memory) -> Result<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update(memory).await
        }

        async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
            self.inner.query(vector, top_k).await
        }

        async fn fetch(&self, ids: &[String]) -> Result<Vec<Memory>> {
            self.inner.fetch(ids).await
        }

        async fn delete(&self, ids: &[String]) -> Result<()> {
            self.inner.delete(ids).await
        }
    }

    #[tokio::test]
    async fn test_store_returns_content_id() {
        let store = Arc::new(LocalVectorStore::in_memory());
        let service = service(store.clone(), &config(8));

        let id = service.store("The sky is blue", HashMap::new()).await.unwrap();
        assert_eq!(id, "Bmm0wdWmsUoMMB1TalF6yShZAlZM2548xNr/dqUPN+E=");

        let stored = store.fetch(&[id]).await.unwrap();
        assert_eq!(stored[0].vector.len(), 8);
        assert_eq!(stored[0].text(), Some("The sky is blue"));
        assert_eq!(stored[0].metadata[keys::SOURCE], "agent");
        assert!(chrono::DateTime::parse_from_rfc3339(&stored[0].metadata[keys::TIMESTAMP]).is_ok());
    }

    #[tokio::test]
    async fn test_store_same_text_twice_updates() {
        let store = Arc::new(CountingStore::default());
        let service = service(store.clone(), &config(8));

        let first = service.store("repeat me", HashMap::new()).await.unwrap();
        let extra = HashMap::from([("type".to_string(), "fact".to_string())]);
        let second = service.store("repeat me", extra).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.len().await, 1);

        let stored = store.fetch(&[first]).await.unwrap();
        assert_eq!(stored[0].metadata["type"], "fact");
    }

    #[tokio::test]
    async fn test_caller_metadata_wins() {
        let store = Arc::new(LocalVectorStore::in_memory());
        let service = service(store.clone(), &config(8));

        let extra = HashMap::from([("source".to_string(), "cli".to_string())]);
        let id = service.store("hello", extra).await.unwrap();

        let stored = store.fetch(&[id]).await.unwrap();
        assert_eq!(stored[0].metadata[keys::SOURCE], "cli");
    }

    #[tokio::test]
    async fn test_similarity_check_updates_on_any_match() {
        let store = Arc::new(CountingStore::default());
        let config = MemoryConfig {
            dimension: 8,
            existence_check: ExistenceCheck::Similarity,
            ..Default::default()
        };
        let service = service(store.clone(), &config);

        service.store("first", HashMap::new()).await.unwrap();
        service.store("something else", HashMap::new()).await.unwrap();

        // The second write sees a neighbour and issues an update for an id
        // the store does not have.
        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_retrieve_from_empty_store() {
        let service = service(Arc::new(LocalVectorStore::in_memory()), &config(8));
        assert!(service.retrieve_similar("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_zero_limit_is_invalid() {
        let service = service(Arc::new(LocalVectorStore::in_memory()), &config(8));
        assert!(matches!(
            service.retrieve_similar("anything", 0).await,
            Err(MemoryError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_retrieve_respects_limit() {
        let service = service(Arc::new(LocalVectorStore::in_memory()), &config(8));
        for text in ["one", "two", "three", "four"] {
            service.store(text, HashMap::new()).await.unwrap();
        }

        let results = service.retrieve_matches("two", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        // Identical text embeds to the identical vector
        assert_eq!(results[0].text, "two");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!results[0].metadata.contains_key(keys::TEXT));
    }

    #[tokio::test]
    async fn test_retrieve_single_memory() {
        let service = service(Arc::new(LocalVectorStore::in_memory()), &config(16));
        service.store("The sky is blue", HashMap::new()).await.unwrap();

        let results = service.retrieve_similar("sky color", 1).await.unwrap();
        assert_eq!(results, vec!["The sky is blue".to_string()]);
    }

    #[tokio::test]
    async fn test_matches_without_text_are_skipped() {
        let store = Arc::new(LocalVectorStore::in_memory());
        store
            .upsert(&[Memory {
                id: "bare".to_string(),
                vector: vec![1.0; 8],
                metadata: HashMap::new(),
            }])
            .await
            .unwrap();
        let service = service(store, &config(8));

        assert!(service.retrieve_similar("query", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_memory() {
        let service = service(Arc::new(LocalVectorStore::in_memory()), &config(8));
        let id = service.store("forget me", HashMap::new()).await.unwrap();

        service.delete(&id).await.unwrap();
        assert!(service.retrieve_similar("forget me", 5).await.unwrap().is_empty());

        // Unknown ids are fine
        service.delete(&id).await.unwrap();
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result = MemoryService::new(
            Arc::new(HashEmbeddings::new(32)),
            Arc::new(LocalVectorStore::in_memory()),
            &config(0),
        );
        assert!(matches!(result, Err(MemoryError::Config(_))));
    }
}
