//! OpenAI-compatible model client.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI, Google Gemini,
//! Mistral, and any other endpoint that speaks the chat completions protocol,
//! via configurable base URLs and factory functions.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

pub mod config;

use std::collections::BTreeMap;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use onigiri_core::llm::provider::LlmProvider;
use onigiri_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, OutputSchema, StopReason, Usage,
};
use onigiri_types::message::{Message, ROLE_ASSISTANT, ROLE_SYSTEM};

use self::config::OpenAiCompatConfig;

/// Unified client for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
        }
    }

    pub fn openai(api_key: SecretString, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    pub fn gemini(api_key: SecretString, model: &str) -> Self {
        Self::new(config::gemini_defaults(api_key, model))
    }

    pub fn mistral(api_key: SecretString, model: &str) -> Self {
        Self::new(config::mistral_defaults(api_key, model))
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            request.messages.iter().map(to_chat_message).collect();

        if let Some(instruction) = schema_instruction(&request.output_schema) {
            // Directly after any leading system messages.
            let at = request
                .messages
                .iter()
                .take_while(|m| m.role == ROLE_SYSTEM)
                .count();
            messages.insert(at, system_message(instruction));
        }

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let mut req = CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: request.max_tokens,
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        apply_parameters(&mut req, &request.parameters)?;

        Ok(req)
    }
}

// OpenAiCompatibleProvider intentionally does NOT derive Debug to prevent
// accidental exposure of the API key inside the async-openai Client.

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request)?;

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let stop_reason = choice
            .and_then(|c| c.finish_reason.as_ref())
            .map(|fr| match fr {
                FinishReason::Length => StopReason::MaxTokens,
                FinishReason::ContentFilter => StopReason::ContentFilter,
                _ => StopReason::EndTurn,
            })
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

fn system_message(text: String) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(text),
        name: None,
    })
}

/// Map one memory message onto the chat wire format.
///
/// Roles other than system and assistant (including custom system roles such
/// as "developer") are sent as user messages.
fn to_chat_message(msg: &Message) -> ChatCompletionRequestMessage {
    let text = msg.content.as_prompt_text();

    match msg.role.as_str() {
        ROLE_SYSTEM => system_message(text),
        ROLE_ASSISTANT => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(text)),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
        _ => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(text),
            name: None,
        }),
    }
}

/// Instruction asking for JSON matching the output schema, if it has one.
fn schema_instruction(schema: &OutputSchema) -> Option<String> {
    let json_schema = schema.schema.as_ref()?;
    Some(format!(
        "Respond only with a JSON value of type `{}` that matches this JSON Schema:\n{}",
        schema.name, json_schema
    ))
}

/// Forward the sampling parameters the chat completions API understands.
fn apply_parameters(
    req: &mut CreateChatCompletionRequest,
    parameters: &BTreeMap<String, Value>,
) -> Result<(), LlmError> {
    for (key, value) in parameters {
        match key.as_str() {
            "top_p" => req.top_p = Some(number(key, value)? as f32),
            "presence_penalty" => req.presence_penalty = Some(number(key, value)? as f32),
            "frequency_penalty" => req.frequency_penalty = Some(number(key, value)? as f32),
            "seed" => {
                let seed = value.as_i64().ok_or_else(|| {
                    LlmError::InvalidRequest(format!("parameter '{key}' must be an integer"))
                })?;
                req.seed = Some(seed);
            }
            _ => debug!(parameter = %key, "Ignoring unsupported model parameter"),
        }
    }
    Ok(())
}

fn number(key: &str, value: &Value) -> Result<f64, LlmError> {
    value
        .as_f64()
        .ok_or_else(|| LlmError::InvalidRequest(format!("parameter '{key}' must be a number")))
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if error_type == "invalid_request_error" {
                LlmError::InvalidRequest(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}
