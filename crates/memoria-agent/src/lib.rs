//! Retrieval-augmented task agent for Memoria.
//!
//! An [`Agent`] answers a task by retrieving similar memories, asking a
//! generation provider with the augmented prompt, and storing the result
//! back as a new memory. Its [`AgentState`] can be read at any time.

pub mod agent;
pub mod error;
pub mod prompt;
pub mod state;

pub use agent::{Agent, TaskHandle};
pub use error::{AgentError, Result, TaskStage};
pub use prompt::build_prompt;
pub use state::{AgentState, StateCell};
