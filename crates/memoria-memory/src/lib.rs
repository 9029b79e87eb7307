//! Content-addressed vector memory for Memoria.
//!
//! This crate provides:
//! - Embedding generation (local hash, Ollama, OpenAI)
//! - Dimension reconciliation to a store's fixed vector length
//! - Vector stores (Pinecone, local) and the [`MemoryService`] on top of them

pub mod embeddings;
pub mod error;
pub mod pinecone;
pub mod reconcile;
pub mod service;
pub mod store;

pub use embeddings::{EmbeddingProvider, HashEmbeddings, OllamaEmbeddings, OpenAIEmbeddings};
pub use error::MemoryError;
pub use pinecone::PineconeStore;
pub use reconcile::{reconcile, DimensionReconciler};
pub use service::MemoryService;
pub use store::{LocalVectorStore, QueryMatch, VectorStore};

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Well-known metadata keys.
pub mod keys {
    /// The stored text.
    pub const TEXT: &str = "text";
    /// RFC 3339 time of the latest write.
    pub const TIMESTAMP: &str = "timestamp";
    /// Origin of the memory.
    pub const SOURCE: &str = "source";
    /// Kind of memory (`result`, `manual_update`, ...).
    pub const TYPE: &str = "type";
    /// Task that produced a result memory.
    pub const TASK: &str = "task";
}

/// Derive the content address of `text`: base64 of its SHA-256 digest.
pub fn content_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// A stored memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Content address of the text.
    pub id: String,

    /// Vector of exactly the store dimension.
    #[serde(rename = "values")]
    pub vector: Vec<f32>,

    /// Metadata, including `text`, `timestamp` and `source`.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Memory {
    /// The stored text, if present.
    pub fn text(&self) -> Option<&str> {
        self.metadata.get(keys::TEXT).map(String::as_str)
    }
}

/// A retrieved memory with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMemory {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}
