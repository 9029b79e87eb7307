//! The task-processing agent.

use crate::error::{AgentError, Result};
use crate::prompt::build_prompt;
use crate::state::{AgentState, StateCell};
use memoria_core::config::AgentConfig;
use memoria_memory::{keys, MemoryService};
use memoria_providers::Provider;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Retrieval-augmented task processor.
///
/// Cloning is cheap; clones share memory, provider and state.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

struct AgentInner {
    memory: Arc<MemoryService>,
    provider: Arc<dyn Provider>,
    state: StateCell,
    context_limit: usize,
    /// Present only when tasks run one at a time.
    task_lock: Option<Mutex<()>>,
}

impl Agent {
    /// Create an agent in the `Idle` state.
    pub fn new(
        memory: Arc<MemoryService>,
        provider: Arc<dyn Provider>,
        config: &AgentConfig,
    ) -> Result<Self> {
        if config.context_limit == 0 {
            return Err(AgentError::config("agent.context_limit must be greater than 0"));
        }

        Ok(Self {
            inner: Arc::new(AgentInner {
                memory,
                provider,
                state: StateCell::new(AgentState::Idle),
                context_limit: config.context_limit,
                task_lock: config.serialize_tasks.then(|| Mutex::new(())),
            }),
        })
    }

    /// Current state. Concurrent tasks may overwrite it at any moment.
    pub fn state(&self) -> AgentState {
        self.inner.state.get()
    }

    /// The memory service backing this agent.
    pub fn memory(&self) -> &Arc<MemoryService> {
        &self.inner.memory
    }

    /// The generation provider.
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.inner.provider
    }

    /// Start processing `task` on the runtime and return a handle to its
    /// result.
    ///
    /// Must be called from within a tokio runtime. Dropping the handle does
    /// not stop the task.
    pub fn process_task(&self, task: impl Into<String>) -> TaskHandle {
        let inner = self.inner.clone();
        let task = task.into();
        TaskHandle {
            handle: tokio::spawn(async move { inner.run(task).await }),
        }
    }

    /// Store `information` directly, whatever the current state.
    ///
    /// Returns the memory id.
    pub async fn update_memory(&self, information: &str) -> Result<String> {
        self.update_memory_with(information, HashMap::new()).await
    }

    /// Like [`Agent::update_memory`], with extra metadata. Caller keys
    /// override the default `type`.
    pub async fn update_memory_with(
        &self,
        information: &str,
        extra_metadata: HashMap<String, String>,
    ) -> Result<String> {
        let mut metadata =
            HashMap::from([(keys::TYPE.to_string(), "manual_update".to_string())]);
        metadata.extend(extra_metadata);
        let id = self.inner.memory.store(information, metadata).await?;
        info!("Memory updated with {}", id);
        Ok(id)
    }
}

impl AgentInner {
    async fn run(&self, task: String) -> Result<String> {
        let _guard = match &self.task_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        self.state.set(AgentState::Processing);
        info!("Processing task: {}", task);

        // Dropped mid-task when the work panics or the runtime shuts down
        let mut abort_guard = ErrorOnDrop {
            state: &self.state,
            armed: true,
        };
        let outcome = self.execute(&task).await;
        abort_guard.armed = false;

        match outcome {
            Ok(result) => {
                self.state.set(AgentState::Idle);
                info!("Task completed");
                Ok(result)
            }
            Err(e) => {
                error!("Error processing task: {}", e);
                self.state.set(AgentState::Error);
                Err(e)
            }
        }
    }

    async fn execute(&self, task: &str) -> Result<String> {
        let memories = self
            .memory
            .retrieve_similar(task, self.context_limit)
            .await
            .map_err(AgentError::Retrieve)?;
        debug!("Retrieved {} context memories", memories.len());

        let prompt = build_prompt(task, &memories);
        let result = self
            .provider
            .complete(&prompt)
            .await
            .map_err(AgentError::Generate)?;

        let metadata = HashMap::from([
            (keys::TYPE.to_string(), "result".to_string()),
            (keys::TASK.to_string(), task.to_string()),
        ]);
        self.memory
            .store(&result, metadata)
            .await
            .map_err(AgentError::Store)?;

        Ok(result)
    }
}

/// Sets `Error` when a task is torn down before finishing.
struct ErrorOnDrop<'a> {
    state: &'a StateCell,
    armed: bool,
}

impl Drop for ErrorOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            error!("Task aborted before completion");
            self.state.set(AgentState::Error);
        }
    }
}

/// Completion handle for a task started by [`Agent::process_task`].
#[must_use = "the task runs regardless, but its result is only observable through the handle"]
pub struct TaskHandle {
    handle: JoinHandle<Result<String>>,
}

impl TaskHandle {
    /// Whether the task has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for TaskHandle {
    type Output = Result<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(AgentError::Aborted(e.to_string())),
        })
    }
}
