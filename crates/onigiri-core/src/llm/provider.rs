//! LlmProvider trait definition.
//!
//! This is the narrow completion interface the agent consumes. Network
//! clients live outside the core (see `onigiri-infra`).

use onigiri_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for model-client backends (OpenAI-compatible endpoints, test doubles, ...).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition) for
/// `complete`. Use [`super::BoxLlmProvider`] when the concrete type is only
/// known at runtime.
///
/// Implementations must not retry internally on behalf of the agent unless
/// that is their documented policy; the agent never retries.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "gemini").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
