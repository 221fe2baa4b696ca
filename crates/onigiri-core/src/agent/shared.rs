//! Shared agent handle.
//!
//! An `Agent` is not meant to be driven from two tasks at once: a turn
//! touches memory before and after the model call. `SharedAgent` holds the
//! agent behind an async mutex so whole turns run one at a time.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use onigiri_types::content::MessageContent;
use onigiri_types::error::AgentError;
use onigiri_types::llm::CompletionResponse;
use onigiri_types::memory::MemorySnapshot;

use super::engine::Agent;

/// Cloneable handle that serializes turns on one agent.
#[derive(Debug, Clone)]
pub struct SharedAgent {
    inner: Arc<Mutex<Agent>>,
}

impl SharedAgent {
    pub fn new(agent: Agent) -> Self {
        Self {
            inner: Arc::new(Mutex::new(agent)),
        }
    }

    /// Exclusive access for multi-step operations.
    pub async fn lock(&self) -> MutexGuard<'_, Agent> {
        self.inner.lock().await
    }

    pub async fn run(
        &self,
        input: Option<MessageContent>,
    ) -> Result<CompletionResponse, AgentError> {
        self.inner.lock().await.run(input).await
    }

    pub async fn run_with_cancel(
        &self,
        input: Option<MessageContent>,
        cancel: &CancellationToken,
    ) -> Result<CompletionResponse, AgentError> {
        self.inner.lock().await.run_with_cancel(input, cancel).await
    }

    pub async fn reset_memory(&self) {
        self.inner.lock().await.reset_memory();
    }

    pub async fn snapshot(&self) -> MemorySnapshot {
        self.inner.lock().await.memory().snapshot()
    }
}

impl From<Agent> for SharedAgent {
    fn from(agent: Agent) -> Self {
        Self::new(agent)
    }
}
