//! Agent state and its lock-free register.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Processing state of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum AgentState {
    /// Waiting for work.
    #[default]
    Idle = 0,
    /// A task is in flight.
    Processing = 1,
    /// The last task failed. The next task may still run.
    Error = 2,
}

impl AgentState {
    /// Wire name (`IDLE`, `PROCESSING`, `ERROR`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Processing => "PROCESSING",
            Self::Error => "ERROR",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Processing,
            2 => Self::Error,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder for an [`AgentState`]. Last writer wins.
#[derive(Debug, Default)]
pub struct StateCell(AtomicU8);

impl StateCell {
    /// Create a cell holding `state`.
    pub fn new(state: AgentState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    /// Current state.
    pub fn get(&self) -> AgentState {
        AgentState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Replace the state.
    pub fn set(&self, state: AgentState) {
        self.0.store(state as u8, Ordering::Release);
    }
}
