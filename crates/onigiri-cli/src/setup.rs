//! Assembling an agent from `onigiri.toml` and command-line overrides.

use std::path::Path;

use anyhow::Context;

use onigiri_core::agent::Agent;
use onigiri_core::memory::ConversationMemory;
use onigiri_core::prompt::{CurrentDateProvider, PromptComposer};
use onigiri_infra::config::{load_config, resolve_config_path};
use onigiri_infra::llm::create_provider;
use onigiri_infra::snapshot::SnapshotStore;
use onigiri_types::config::{OnigiriConfig, PromptSettings};

use crate::cli::ChatArgs;

/// Load `onigiri.toml` (explicit path, `./onigiri.toml`, or the per-user file).
pub async fn load(explicit: Option<&Path>) -> OnigiriConfig {
    match resolve_config_path(explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config");
            load_config(&path).await
        }
        None => OnigiriConfig::default(),
    }
}

/// Apply `--model` and `--max-messages` on top of the file config.
pub fn apply_overrides(config: &mut OnigiriConfig, args: &ChatArgs) {
    if let Some(model) = &args.model {
        config.agent.model = model.clone();
    }
    if let Some(max) = args.max_messages {
        config.agent.max_messages = max;
    }
}

/// Build the system prompt composer from the `[prompt]` section.
pub fn build_composer(settings: &PromptSettings) -> PromptComposer {
    let composer = PromptComposer::new()
        .with_background(settings.background.iter().cloned())
        .with_steps(settings.steps.iter().cloned())
        .with_output_instructions(settings.output_instructions.iter().cloned());

    if settings.include_date {
        composer.with_provider("date", CurrentDateProvider::new())
    } else {
        composer
    }
}

/// Starting memory: the snapshot if one exists, otherwise an empty memory.
///
/// An explicit `--max-messages` replaces a loaded snapshot's own bound.
pub async fn initial_memory(
    config: &OnigiriConfig,
    args: &ChatArgs,
    store: Option<&SnapshotStore>,
) -> anyhow::Result<ConversationMemory> {
    let bound = config.agent.history_bound()?;

    let loaded = match store {
        Some(store) => store
            .load_if_exists()
            .await
            .with_context(|| format!("failed to load snapshot {}", store.path().display()))?,
        None => None,
    };

    Ok(match loaded {
        Some(mut memory) => {
            if args.max_messages.is_some() {
                memory.set_max_messages(bound);
            }
            memory
        }
        None => {
            let mut memory = ConversationMemory::new();
            memory.set_max_messages(bound);
            memory
        }
    })
}

/// Build the agent, resolving the model client from `[provider]`.
pub fn build_agent(config: &OnigiriConfig, memory: ConversationMemory) -> anyhow::Result<Agent> {
    let agent_config = config
        .agent
        .to_agent_config()
        .context("invalid [agent] configuration")?;
    let provider = create_provider(&config.provider, agent_config.model())?;

    let agent = Agent::builder(agent_config)
        .boxed_provider(provider)
        .memory(memory)
        .prompt_composer(build_composer(&config.prompt))
        .build()?;
    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_apply() {
        let mut config = OnigiriConfig::default();
        let args = ChatArgs {
            model: Some("gpt-4o".to_string()),
            max_messages: Some(6),
            ..Default::default()
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.agent.max_messages, 6);
    }

    #[test]
    fn test_composer_from_settings() {
        let settings = PromptSettings {
            background: vec!["You are terse.".to_string()],
            include_date: true,
            ..Default::default()
        };
        let composer = build_composer(&settings);
        let prompt = composer.generate_prompt();

        assert!(prompt.starts_with("# IDENTITY and PURPOSE\n- You are terse."));
        assert!(prompt.contains("# Current Date\n- Today is "));
        assert_eq!(composer.provider_names(), vec!["date"]);
    }

    #[tokio::test]
    async fn test_initial_memory_without_snapshot() {
        let mut config = OnigiriConfig::default();
        config.agent.max_messages = 4;

        let memory = initial_memory(&config, &ChatArgs::default(), None).await.unwrap();
        assert!(memory.is_empty());
        assert_eq!(memory.max_messages(), Some(4));
    }

    #[tokio::test]
    async fn test_initial_memory_keeps_snapshot_bound_unless_overridden() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("chat.json"));
        let mut saved = ConversationMemory::with_max_messages(8);
        saved.start_turn();
        saved.append_message("user", "Hi");
        store.save(&saved).await.unwrap();

        let config = OnigiriConfig::default();
        let memory = initial_memory(&config, &ChatArgs::default(), Some(&store))
            .await
            .unwrap();
        assert_eq!(memory, saved);

        let args = ChatArgs {
            max_messages: Some(-1),
            ..Default::default()
        };
        let mut config = OnigiriConfig::default();
        apply_overrides(&mut config, &args);
        let memory = initial_memory(&config, &args, Some(&store)).await.unwrap();
        assert_eq!(memory.max_messages(), None);
        assert_eq!(memory.message_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_bound_rejected() {
        let mut config = OnigiriConfig::default();
        config.agent.max_messages = -3;
        assert!(initial_memory(&config, &ChatArgs::default(), None).await.is_err());
    }
}
