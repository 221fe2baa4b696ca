//! Configuration and per-family defaults for OpenAI-compatible providers.
//!
//! Each endpoint family that speaks the OpenAI chat completions protocol gets
//! a factory function returning an [`OpenAiCompatConfig`] with the right base
//! URL.

use secrecy::SecretString;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Configuration for an OpenAI-compatible provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Provider name reported in logs and spans (e.g. "openai", "gemini").
    pub provider_name: String,
    /// Base URL for the API (e.g. "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Fallback model when a request does not name one.
    pub model: String,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    custom("openai", OPENAI_BASE_URL, api_key, model)
}

/// Google Gemini default configuration (OpenAI-compatible beta endpoint).
///
/// Base URL: `https://generativelanguage.googleapis.com/v1beta/openai`
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    custom("gemini", GEMINI_BASE_URL, api_key, model)
}

/// Mistral AI default configuration.
///
/// Base URL: `https://api.mistral.ai/v1`
pub fn mistral_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    custom("mistral", MISTRAL_BASE_URL, api_key, model)
}

/// Any other compatible endpoint, e.g. a local server.
pub fn custom(
    provider_name: &str,
    base_url: &str,
    api_key: SecretString,
    model: &str,
) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: provider_name.into(),
        base_url: base_url.trim_end_matches('/').into(),
        api_key,
        model: model.into(),
    }
}
