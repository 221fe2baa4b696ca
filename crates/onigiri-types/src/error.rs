use thiserror::Error;

use crate::llm::LlmError;

/// Errors related to conversation memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("no messages found for turn id '{0}'")]
    TurnNotFound(String),

    #[error("malformed memory snapshot: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        MemoryError::Serialization(err.to_string())
    }
}

/// Errors related to system prompt composition.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("context provider '{0}' not found")]
    ProviderNotFound(String),
}

/// Errors surfaced by the agent and its configuration.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("completion failed during {stage}: {source}")]
    Upstream {
        stage: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AgentError {
    /// Whether the upstream call was cancelled or timed out.
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            AgentError::Upstream {
                source: LlmError::Cancelled | LlmError::Timeout(_),
                ..
            }
        )
    }
}

impl From<MemoryError> for AgentError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::TurnNotFound(_) => AgentError::NotFound(err.to_string()),
            MemoryError::Serialization(msg) => AgentError::Serialization(msg),
        }
    }
}

impl From<PromptError> for AgentError {
    fn from(err: PromptError) -> Self {
        AgentError::NotFound(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Serialization(err.to_string())
    }
}
