//! Scripted model client for unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use onigiri_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

use super::provider::LlmProvider;

#[derive(Debug, Clone)]
pub(crate) enum MockReply {
    Text(String),
    Fail(String),
}

struct MockState {
    script: VecDeque<MockReply>,
    fallback: MockReply,
    requests: Vec<CompletionRequest>,
    delay: Option<Duration>,
}

/// Records every request and answers from a script, then from a fallback reply.
#[derive(Clone)]
pub(crate) struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    fn with_fallback(fallback: MockReply) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                script: VecDeque::new(),
                fallback,
                requests: Vec::new(),
                delay: None,
            })),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        Self::with_fallback(MockReply::Text(text.to_string()))
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::with_fallback(MockReply::Fail(message.to_string()))
    }

    pub(crate) fn scripted(replies: Vec<MockReply>) -> Self {
        let mock = Self::replying("ok");
        mock.state.lock().unwrap().script = replies.into();
        mock
    }

    /// Delay every reply, to exercise cancellation and timeouts.
    pub(crate) fn delayed(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let (reply, delay, n) = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            let reply = state
                .script
                .pop_front()
                .unwrap_or_else(|| state.fallback.clone());
            (reply, state.delay, state.requests.len())
        };
        let model = request.model.clone();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match reply {
                MockReply::Text(content) => Ok(CompletionResponse {
                    id: format!("resp-{n}"),
                    content,
                    model,
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 10,
                        output_tokens: 5,
                    },
                }),
                MockReply::Fail(message) => Err(LlmError::Provider { message }),
            }
        }
    }
}
