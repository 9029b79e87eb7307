//! Vector store abstraction and the local implementation.

use crate::embeddings::cosine_similarity;
use crate::error::MemoryError;
use crate::pinecone::PineconeStore;
use crate::{Memory, Result};
use async_trait::async_trait;
use memoria_core::config::{PineconeConfig, StoreKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A similarity query hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A content-addressed vector index.
///
/// Mirrors the verbs of a remote index API: `upsert` creates or replaces
/// records, `update` rewrites an existing record in place, and deleting an
/// unknown id succeeds.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend name, for diagnostics.
    fn name(&self) -> &str;

    /// Insert or replace records.
    async fn upsert(&self, memories: &[Memory]) -> Result<()>;

    /// Overwrite the vector and merge metadata of an existing record.
    /// Updating an unknown id has no effect.
    async fn update(&self, memory: &Memory) -> Result<()>;

    /// The `top_k` nearest records, most similar first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>>;

    /// Records with the given ids; unknown ids are omitted.
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Memory>>;

    /// Remove records; unknown ids are ignored.
    async fn delete(&self, ids: &[String]) -> Result<()>;
}

/// Build the vector store selected by configuration.
pub fn from_config(
    kind: StoreKind,
    local_path: Option<&Path>,
    pinecone: &PineconeConfig,
    client: Client,
) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match kind {
        StoreKind::Pinecone => Arc::new(PineconeStore::from_config(pinecone, client)?),
        StoreKind::InMemory => Arc::new(LocalVectorStore::in_memory()),
        StoreKind::Local => {
            let path = match local_path {
                Some(path) => path.to_path_buf(),
                None => memoria_core::paths::local_store_file()?,
            };
            Arc::new(LocalVectorStore::open(path)?)
        }
    };
    Ok(store)
}

/// In-process vector store ranked by cosine similarity, optionally persisted
/// to a JSON file.
///
/// File mutations are written atomically (write to tmp, then rename).
pub struct LocalVectorStore {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, Memory>>,
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl LocalVectorStore {
    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Open a file-backed store, loading existing records if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn persist(&self, entries: &HashMap<String, Memory>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, serde_json::to_string_pretty(entries)?)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    fn name(&self) -> &str {
        if self.path.is_some() {
            "local"
        } else {
            "in-memory"
        }
    }

    async fn upsert(&self, memories: &[Memory]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for memory in memories {
            entries.insert(memory.id.clone(), memory.clone());
        }
        self.persist(&entries)
    }

    async fn update(&self, memory: &Memory) -> Result<()> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&memory.id) {
            Some(existing) => {
                existing.vector = memory.vector.clone();
                existing
                    .metadata
                    .extend(memory.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            None => {
                debug!("Update for unknown id {} ignored", memory.id);
                return Ok(());
            }
        }
        self.persist(&entries)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        if top_k == 0 {
            return Err(MemoryError::InvalidArgument("top_k must be greater than 0".to_string()));
        }
        let entries = self.entries.read().await;

        let mut results: Vec<QueryMatch> = entries
            .values()
            .map(|entry| QueryMatch {
                id: entry.id.clone(),
                score: cosine_similarity(vector, &entry.vector),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // Sort by score descending, ties by id for a stable order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<Memory>> {
        let entries = self.entries.read().await;
        Ok(ids.iter().filter_map(|id| entries.get(id).cloned()).collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        for id in ids {
            entries.remove(id);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.persist(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(id: &str, text: &str, vector: Vec<f32>) -> Memory {
        Memory {
            id: id.to_string(),
            vector,
            metadata: HashMap::from([("text".to_string(), text.to_string())]),
        }
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let store = LocalVectorStore::in_memory();
        store
            .upsert(&[
                memory("a", "first", vec![1.0, 0.0, 0.0]),
                memory("b", "second", vec![0.0, 1.0, 0.0]),
                memory("c", "third", vec![0.9, 0.1, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "c");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_query_empty_store() {
        let store = LocalVectorStore::in_memory();
        assert!(store.query(&[1.0, 0.0], 5).await.unwrap().is_empty());
        assert!(store.query(&[1.0, 0.0], 0).await.is_err());
    }

    #[tokio::test]
    async fn test_update_merges_metadata() {
        let store = LocalVectorStore::in_memory();
        let mut original = memory("a", "first", vec![1.0, 0.0]);
        original.metadata.insert("type".to_string(), "fact".to_string());
        store.upsert(&[original]).await.unwrap();

        let mut changed = memory("a", "first", vec![0.0, 1.0]);
        changed.metadata.insert("timestamp".to_string(), "later".to_string());
        store.update(&changed).await.unwrap();

        let fetched = store.fetch(&["a".to_string()]).await.unwrap();
        assert_eq!(fetched[0].vector, vec![0.0, 1.0]);
        assert_eq!(fetched[0].metadata["type"], "fact");
        assert_eq!(fetched[0].metadata["timestamp"], "later");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let store = LocalVectorStore::in_memory();
        store.update(&memory("ghost", "boo", vec![1.0])).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = LocalVectorStore::in_memory();
        store.upsert(&[memory("a", "first", vec![1.0])]).await.unwrap();

        store.delete(&["a".to_string()]).await.unwrap();
        store.delete(&["a".to_string()]).await.unwrap();
        assert!(store.fetch(&["a".to_string()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = LocalVectorStore::open(path.clone()).unwrap();
            store
                .upsert(&[memory("a", "persistent content", vec![1.0, 0.0])])
                .await
                .unwrap();
            assert_eq!(store.name(), "local");
        }

        let store = LocalVectorStore::open(path.clone()).unwrap();
        let loaded = store.fetch(&["a".to_string()]).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text(), Some("persistent content"));

        store.delete(&["a".to_string()]).await.unwrap();
        let reopened = LocalVectorStore::open(path).unwrap();
        assert_eq!(reopened.len().await, 0);
    }

    #[tokio::test]
    async fn test_file_store_new_empty_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVectorStore::open(dir.path().join("nested").join("absent.json")).unwrap();
        assert!(store.is_empty().await);

        // First write creates the parent directory.
        store.upsert(&[memory("a", "x", vec![1.0])]).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_from_config_in_memory() {
        let store = from_config(
            StoreKind::InMemory,
            None,
            &PineconeConfig::default(),
            Client::new(),
        )
        .unwrap();
        assert_eq!(store.name(), "in-memory");
    }

    #[test]
    fn test_from_config_pinecone_requires_key() {
        let result = from_config(
            StoreKind::Pinecone,
            None,
            &PineconeConfig::default(),
            Client::new(),
        );
        assert!(matches!(result, Err(MemoryError::Config(_))));
    }
}
