//! File configuration types for Onigiri.
//!
//! `OnigiriConfig` represents `onigiri.toml`, which controls the agent's
//! model settings, the static system prompt sections, and which
//! OpenAI-compatible endpoint to talk to. All fields have sensible defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentConfig;
use crate::error::AgentError;
use crate::memory::UNBOUNDED;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnigiriConfig {
    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub prompt: PromptSettings,

    #[serde(default)]
    pub provider: ProviderSettings,
}

/// `[agent]` section: model invocation and memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_system_role")]
    pub system_role: String,

    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// `-1` keeps the whole conversation.
    #[serde(default = "default_max_messages")]
    pub max_messages: i64,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_system_role() -> String {
    "system".to_string()
}

fn default_max_messages() -> i64 {
    UNBOUNDED
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_role: default_system_role(),
            temperature: None,
            max_tokens: None,
            max_messages: default_max_messages(),
            request_timeout_secs: None,
            parameters: BTreeMap::new(),
        }
    }
}

impl AgentSettings {
    /// Convert the file settings into a validated [`AgentConfig`].
    pub fn to_agent_config(&self) -> Result<AgentConfig, AgentError> {
        let mut builder = AgentConfig::builder(&self.model).system_role(&self.system_role);

        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        if let Some(max) = self.max_tokens {
            builder = builder.max_tokens(max);
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        for (key, value) in &self.parameters {
            builder = builder.parameter(key, value.clone());
        }

        builder.build()
    }

    /// The history bound, or `None` for unbounded.
    pub fn history_bound(&self) -> Result<Option<usize>, AgentError> {
        match self.max_messages {
            UNBOUNDED => Ok(None),
            n => usize::try_from(n).map(Some).map_err(|_| {
                AgentError::InvalidArgument(format!(
                    "max_messages must be -1 or non-negative, got {n}"
                ))
            }),
        }
    }
}

/// `[prompt]` section: static system prompt lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptSettings {
    #[serde(default)]
    pub background: Vec<String>,

    #[serde(default)]
    pub steps: Vec<String>,

    #[serde(default)]
    pub output_instructions: Vec<String>,

    /// Include a context provider that reports today's date.
    #[serde(default)]
    pub include_date: bool,
}

/// Which OpenAI-compatible endpoint family to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Gemini,
    Mistral,
    Custom,
}

impl ProviderKind {
    /// Environment variable holding the API key when none is configured.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Mistral => "MISTRAL_API_KEY",
            ProviderKind::Custom => "ONIGIRI_API_KEY",
        }
    }
}

/// `[provider]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub kind: ProviderKind,

    /// Required for `custom`; overrides the family default otherwise.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderSettings {
    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.kind.default_api_key_env())
    }
}
