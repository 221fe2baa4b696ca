//! System prompt composer for Onigiri agents.
//!
//! Renders a markdown-style system prompt from three static sections and
//! the registered context providers. Output is a pure function of the
//! composer's configuration and what the providers report.
//!
//! Layout:
//! ```text
//! # IDENTITY and PURPOSE
//! - {background line}
//!
//! # INTERNAL ASSISTANT STEPS
//! - {step}
//!
//! # OUTPUT INSTRUCTIONS
//! - {instruction}
//!
//! # EXTRA INFORMATION AND CONTEXT
//! # {provider title}
//! - {provider info}
//! ```
//!
//! Empty sections are omitted and the result is trimmed. Providers render in
//! registration order.

use std::fmt;
use std::sync::Arc;

use onigiri_types::error::PromptError;

use super::provider::ContextProvider;

const BACKGROUND_TITLE: &str = "IDENTITY and PURPOSE";
const STEPS_TITLE: &str = "INTERNAL ASSISTANT STEPS";
const OUTPUT_TITLE: &str = "OUTPUT INSTRUCTIONS";
const CONTEXT_TITLE: &str = "EXTRA INFORMATION AND CONTEXT";

/// A titled list of bullet lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSection {
    pub title: String,
    pub lines: Vec<String>,
}

impl PromptSection {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    fn render_into(&self, parts: &mut Vec<String>) {
        parts.push(format!("# {}", self.title));
        parts.extend(self.lines.iter().map(|line| format!("- {line}")));
        parts.push(String::new());
    }
}

/// Builds the system prompt from static sections and context providers.
#[derive(Clone, Default)]
pub struct PromptComposer {
    background: Vec<String>,
    steps: Vec<String>,
    output_instructions: Vec<String>,
    providers: Vec<(String, Arc<dyn ContextProvider>)>,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.background = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_steps<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_instructions<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_instructions = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_provider(
        mut self,
        name: impl Into<String>,
        provider: impl ContextProvider + 'static,
    ) -> Self {
        self.register_provider(name, Arc::new(provider));
        self
    }

    /// The three static sections, in render order (including empty ones).
    pub fn sections(&self) -> [PromptSection; 3] {
        [
            PromptSection::new(BACKGROUND_TITLE, self.background.clone()),
            PromptSection::new(STEPS_TITLE, self.steps.clone()),
            PromptSection::new(OUTPUT_TITLE, self.output_instructions.clone()),
        ]
    }

    /// Render the system prompt.
    pub fn generate_prompt(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        for section in self.sections() {
            if !section.lines.is_empty() {
                section.render_into(&mut parts);
            }
        }

        if !self.providers.is_empty() {
            parts.push(format!("# {CONTEXT_TITLE}"));
            for (_, provider) in &self.providers {
                PromptSection::new(provider.title(), vec![provider.info()]).render_into(&mut parts);
            }
        }

        parts.join("\n").trim().to_string()
    }

    /// Register a provider under `name`.
    ///
    /// Re-registering an existing name replaces the provider but keeps its
    /// original position in the render order.
    pub fn register_provider(&mut self, name: impl Into<String>, provider: Arc<dyn ContextProvider>) {
        let name = name.into();
        match self.providers.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = provider,
            None => self.providers.push((name, provider)),
        }
    }

    /// Remove a provider, returning it if it was registered.
    pub fn unregister_provider(&mut self, name: &str) -> Option<Arc<dyn ContextProvider>> {
        let index = self.providers.iter().position(|(n, _)| n == name)?;
        Some(self.providers.remove(index).1)
    }

    /// Look up a provider by name.
    pub fn get_provider(&self, name: &str) -> Result<Arc<dyn ContextProvider>, PromptError> {
        self.providers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| Arc::clone(p))
            .ok_or_else(|| PromptError::ProviderNotFound(name.to_string()))
    }

    /// Registered provider names, in render order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl fmt::Debug for PromptComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptComposer")
            .field("background", &self.background)
            .field("steps", &self.steps)
            .field("output_instructions", &self.output_instructions)
            .field("providers", &self.provider_names())
            .finish()
    }
}
