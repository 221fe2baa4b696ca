//! Model client implementations.
//!
//! Provides the OpenAI-compatible client and a factory
//! ([`create_provider`]) that builds the right client from the
//! `[provider]` section of `onigiri.toml`.

pub mod openai_compat;

use anyhow::{Context, bail};
use secrecy::SecretString;
use tracing::info;

use onigiri_core::llm::box_provider::BoxLlmProvider;
use onigiri_types::config::{ProviderKind, ProviderSettings};

use self::openai_compat::OpenAiCompatibleProvider;

/// Read the API key from the environment variable named by `settings`.
pub fn resolve_api_key(settings: &ProviderSettings) -> anyhow::Result<SecretString> {
    let var = settings.api_key_env();
    let key = std::env::var(var).with_context(|| format!("environment variable {var} is not set"))?;
    if key.trim().is_empty() {
        bail!("environment variable {var} is empty");
    }
    Ok(SecretString::from(key))
}

/// Create a [`BoxLlmProvider`] from provider settings, resolving the API key
/// from the environment.
pub fn create_provider(settings: &ProviderSettings, model: &str) -> anyhow::Result<BoxLlmProvider> {
    let api_key = resolve_api_key(settings)?;
    create_provider_with_key(settings, model, api_key)
}

/// Create a [`BoxLlmProvider`] with an already-resolved API key.
///
/// A configured `base_url` overrides the family default; `custom` requires one.
pub fn create_provider_with_key(
    settings: &ProviderSettings,
    model: &str,
    api_key: SecretString,
) -> anyhow::Result<BoxLlmProvider> {
    let config = match (settings.kind, settings.base_url.as_deref()) {
        (ProviderKind::Custom, None) => bail!("provider kind 'custom' requires base_url"),
        (kind, Some(base_url)) => {
            openai_compat::config::custom(kind_name(kind), base_url, api_key, model)
        }
        (ProviderKind::OpenAi, None) => openai_compat::config::openai_defaults(api_key, model),
        (ProviderKind::Gemini, None) => openai_compat::config::gemini_defaults(api_key, model),
        (ProviderKind::Mistral, None) => openai_compat::config::mistral_defaults(api_key, model),
    };

    info!(provider = %config.provider_name, base_url = %config.base_url, model, "Creating model client");
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(config)))
}

fn kind_name(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "openai",
        ProviderKind::Gemini => "gemini",
        ProviderKind::Mistral => "mistral",
        ProviderKind::Custom => "custom",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SecretString {
        SecretString::from("sk-test".to_string())
    }

    #[test]
    fn test_family_providers() {
        let settings = ProviderSettings {
            kind: ProviderKind::Mistral,
            ..Default::default()
        };
        let provider = create_provider_with_key(&settings, "mistral-small", key()).unwrap();
        assert_eq!(provider.name(), "mistral");
    }

    #[test]
    fn test_base_url_override_keeps_kind_name() {
        let settings = ProviderSettings {
            kind: ProviderKind::OpenAi,
            base_url: Some("http://localhost:8080/v1".to_string()),
            api_key_env: None,
        };
        let provider = create_provider_with_key(&settings, "local", key()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_custom_requires_base_url() {
        let settings = ProviderSettings {
            kind: ProviderKind::Custom,
            ..Default::default()
        };
        let err = create_provider_with_key(&settings, "m", key()).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_missing_key_variable() {
        let settings = ProviderSettings {
            kind: ProviderKind::Custom,
            base_url: None,
            api_key_env: Some("ONIGIRI_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
        };
        let err = resolve_api_key(&settings).unwrap_err();
        assert!(err.to_string().contains("ONIGIRI_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
