//! LLM request/response types for Onigiri.
//!
//! These types model the data shapes for model-client interactions:
//! completion requests, responses, usage tracking, output schemas, and
//! error handling.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::Tagged;
use crate::message::Message;

/// Describes the shape the caller expects back from the model.
///
/// The default schema is plain text (`"string"`, no JSON Schema). Structured
/// output types derive `JsonSchema` and are described with [`OutputSchema::of`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl OutputSchema {
    /// Plain text output.
    pub fn text() -> Self {
        Self {
            name: "string".to_string(),
            schema: None,
        }
    }

    /// Output described by the JSON Schema of `T`.
    pub fn of<T: JsonSchema>() -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            name: T::schema_name().into_owned(),
            schema: serde_json::to_value(&schema).ok(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.schema.is_none()
    }
}

impl Default for OutputSchema {
    fn default() -> Self {
        Self::text()
    }
}

/// Request to a model client for a completion.
///
/// `messages` is the full list sent to the model: the optional system
/// message followed by conversation history, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub output_schema: OutputSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Provider-specific parameters, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
}

/// Response from a model client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub stop_reason: StopReason,
    #[serde(default)]
    pub usage: Usage,
}

impl Tagged for CompletionResponse {
    const TYPE_TAG: &'static str = "CompletionResponse";
}

/// Reason why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ContentFilter,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EndTurn => write!(f, "end_turn"),
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::StopSequence => write!(f, "stop_sequence"),
            StopReason::ContentFilter => write!(f, "content_filter"),
        }
    }
}

impl FromStr for StopReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "end_turn" => Ok(StopReason::EndTurn),
            "max_tokens" => Ok(StopReason::MaxTokens),
            "stop_sequence" => Ok(StopReason::StopSequence),
            "content_filter" => Ok(StopReason::ContentFilter),
            other => Err(format!("invalid stop reason: '{other}'")),
        }
    }
}

/// Token usage for a completion request/response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from model client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("request cancelled")]
    Cancelled,
}
