//! Agent error types.

use memoria_memory::MemoryError;
use memoria_providers::ProviderError;
use std::fmt;
use thiserror::Error;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Step of task processing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    /// Retrieving context memories.
    Retrieve,
    /// Generating the response.
    Generate,
    /// Storing the result.
    Store,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Retrieve => "retrieving context",
            Self::Generate => "generating response",
            Self::Store => "storing result",
        })
    }
}

/// Errors that can occur during agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Context retrieval failed.
    #[error("Task failed while retrieving context: {0}")]
    Retrieve(#[source] MemoryError),

    /// The generation provider failed.
    #[error("Task failed while generating response: {0}")]
    Generate(#[source] ProviderError),

    /// The result could not be stored. The generated text is lost.
    #[error("Task failed while storing result: {0}")]
    Store(#[source] MemoryError),

    /// Memory operation outside task processing.
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    /// The spawned task panicked or was cancelled by runtime shutdown.
    #[error("Task aborted: {0}")]
    Aborted(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The task stage that failed, if this is a task failure.
    pub fn stage(&self) -> Option<TaskStage> {
        match self {
            Self::Retrieve(_) => Some(TaskStage::Retrieve),
            Self::Generate(_) => Some(TaskStage::Generate),
            Self::Store(_) => Some(TaskStage::Store),
            _ => None,
        }
    }
}
