//! Agent engine.
//!
//! One call to [`Agent::run`] is one turn: the optional user input is
//! recorded under a fresh turn id, the provider sees the system prompt plus
//! the full history, and the reply is recorded under the same turn id.
//! A failed, cancelled, or timed-out call never records a reply.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use onigiri_types::agent::AgentConfig;
use onigiri_types::content::MessageContent;
use onigiri_types::error::AgentError;
use onigiri_types::llm::{CompletionRequest, CompletionResponse, LlmError};
use onigiri_types::message::{Message, ROLE_ASSISTANT, ROLE_USER};

use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::ConversationMemory;
use crate::prompt::{ContextProvider, PromptComposer};

use super::builder::AgentBuilder;

/// A conversational agent bound to one model provider.
#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    provider: BoxLlmProvider,
    memory: ConversationMemory,
    initial_memory: ConversationMemory,
    composer: Option<PromptComposer>,
}

impl Agent {
    pub fn builder(config: AgentConfig) -> AgentBuilder {
        AgentBuilder::new(config)
    }

    pub(crate) fn new(
        config: AgentConfig,
        provider: BoxLlmProvider,
        memory: ConversationMemory,
        composer: Option<PromptComposer>,
    ) -> Self {
        Self {
            config,
            provider,
            initial_memory: memory.clone(),
            memory,
            composer,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ConversationMemory {
        &mut self.memory
    }

    /// The memory state `reset_memory` returns to.
    pub fn initial_memory(&self) -> &ConversationMemory {
        &self.initial_memory
    }

    pub fn prompt_composer(&self) -> Option<&PromptComposer> {
        self.composer.as_ref()
    }

    pub fn prompt_composer_mut(&mut self) -> Option<&mut PromptComposer> {
        self.composer.as_mut()
    }

    /// The rendered system prompt, or `None` when no system message is sent
    /// (empty system role or no composer).
    pub fn system_prompt(&self) -> Option<String> {
        if self.config.system_role().is_empty() {
            return None;
        }
        self.composer.as_ref().map(PromptComposer::generate_prompt)
    }

    /// The message list the provider would receive right now.
    pub fn build_messages(&self) -> Vec<Message> {
        let history = self.memory.history();
        let mut messages = Vec::with_capacity(history.len() + 1);

        if let Some(prompt) = self.system_prompt() {
            messages.push(Message::new(
                self.config.system_role(),
                MessageContent::text(prompt),
                "",
            ));
        }
        messages.extend_from_slice(history);
        messages
    }

    fn build_request(&self) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model().to_string(),
            messages: self.build_messages(),
            output_schema: self.config.output_schema().clone(),
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
            parameters: self.config.parameters().clone(),
        }
    }

    /// Run one turn.
    ///
    /// With `Some(input)` a new turn is started and the input is recorded as
    /// a user message first. With `None` the current history is sent as is
    /// and the reply joins the current turn.
    pub async fn run(
        &mut self,
        input: Option<MessageContent>,
    ) -> Result<CompletionResponse, AgentError> {
        self.run_with_cancel(input, &CancellationToken::new()).await
    }

    /// Run one turn with plain text input.
    pub async fn chat(
        &mut self,
        input: impl Into<MessageContent>,
    ) -> Result<CompletionResponse, AgentError> {
        self.run(Some(input.into())).await
    }

    /// [`Agent::run`], aborted when `cancel` fires.
    ///
    /// The user message stays in memory when the call fails; the reply is
    /// only recorded on success.
    pub async fn run_with_cancel(
        &mut self,
        input: Option<MessageContent>,
        cancel: &CancellationToken,
    ) -> Result<CompletionResponse, AgentError> {
        if let Some(input) = input {
            let turn_id = self.memory.start_turn().to_string();
            self.memory.append_message(ROLE_USER, input);
            debug!(turn_id = %turn_id, "Started turn");
        }

        let response = self.get_response_with_cancel(cancel).await?;

        let content = MessageContent::tagged(&response)?;
        self.memory.append_message(ROLE_ASSISTANT, content);

        Ok(response)
    }

    /// Ask the provider for a reply to the current history without touching
    /// memory.
    pub async fn get_response(&self) -> Result<CompletionResponse, AgentError> {
        self.get_response_with_cancel(&CancellationToken::new()).await
    }

    pub async fn get_response_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CompletionResponse, AgentError> {
        let request = self.build_request();

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = ?request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.messages = request.messages.len(),
        );

        match self.complete_bounded(&request, cancel).instrument(span).await {
            Ok(response) => {
                info!(
                    response_id = %response.id,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    stop_reason = %response.stop_reason,
                    "Completion received"
                );
                Ok(response)
            }
            Err(source) => {
                warn!(
                    provider = self.provider.name(),
                    error = %source,
                    "Completion failed"
                );
                Err(AgentError::Upstream {
                    stage: "get_response",
                    source,
                })
            }
        }
    }

    async fn complete_bounded(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionResponse, LlmError> {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }

        let call = self.provider.complete(request);
        let bounded = async {
            match self.config.request_timeout() {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(LlmError::Timeout(timeout_millis(limit))),
                },
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = bounded => result,
        }
    }

    /// Restore memory to its state at construction.
    pub fn reset_memory(&mut self) {
        self.memory = self.initial_memory.clone();
        debug!(messages = self.memory.message_count(), "Memory reset");
    }

    pub fn get_context_provider(&self, name: &str) -> Result<Arc<dyn ContextProvider>, AgentError> {
        let composer = self.composer()?;
        check_provider_name(name)?;
        Ok(composer.get_provider(name)?)
    }

    pub fn register_context_provider(
        &mut self,
        name: &str,
        provider: Arc<dyn ContextProvider>,
    ) -> Result<(), AgentError> {
        let composer = self.composer_mut()?;
        check_provider_name(name)?;
        composer.register_provider(name, provider);
        Ok(())
    }

    /// Remove a context provider. Removing an unknown name is not an error.
    pub fn unregister_context_provider(&mut self, name: &str) -> Result<(), AgentError> {
        let composer = self.composer_mut()?;
        check_provider_name(name)?;
        if composer.unregister_provider(name).is_none() {
            debug!(name, "Context provider was not registered");
        }
        Ok(())
    }

    fn composer(&self) -> Result<&PromptComposer, AgentError> {
        self.composer
            .as_ref()
            .ok_or_else(|| AgentError::NotConfigured("prompt composer".to_string()))
    }

    fn composer_mut(&mut self) -> Result<&mut PromptComposer, AgentError> {
        self.composer
            .as_mut()
            .ok_or_else(|| AgentError::NotConfigured("prompt composer".to_string()))
    }
}

fn check_provider_name(name: &str) -> Result<(), AgentError> {
    if name.is_empty() {
        return Err(AgentError::InvalidArgument(
            "context provider name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn timeout_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}
