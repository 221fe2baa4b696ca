//! Builder for [`Agent`].
//!
//! Collects the agent's collaborators and validates them once in
//! [`AgentBuilder::build`]. Nothing is validated lazily at call time.

use onigiri_types::agent::AgentConfig;
use onigiri_types::error::AgentError;

use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::provider::LlmProvider;
use crate::memory::ConversationMemory;
use crate::prompt::PromptComposer;

use super::engine::Agent;

/// Assembles an [`Agent`].
///
/// Defaults: an empty unbounded memory and no prompt composer. A provider is
/// required.
pub struct AgentBuilder {
    config: AgentConfig,
    provider: Option<BoxLlmProvider>,
    memory: Option<ConversationMemory>,
    composer: Option<PromptComposer>,
}

impl AgentBuilder {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            provider: None,
            memory: None,
            composer: None,
        }
    }

    pub fn provider<P: LlmProvider + 'static>(self, provider: P) -> Self {
        self.boxed_provider(BoxLlmProvider::new(provider))
    }

    pub fn boxed_provider(mut self, provider: BoxLlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Starting memory. Its state at build time is what `reset_memory` restores.
    pub fn memory(mut self, memory: ConversationMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn prompt_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = Some(composer);
        self
    }

    pub fn build(self) -> Result<Agent, AgentError> {
        let provider = self.provider.ok_or_else(|| {
            AgentError::InvalidArgument("an LLM provider is required".to_string())
        })?;

        Ok(Agent::new(
            self.config,
            provider,
            self.memory.unwrap_or_default(),
            self.composer,
        ))
    }
}
