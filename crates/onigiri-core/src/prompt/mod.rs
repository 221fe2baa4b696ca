//! System prompt composition for Onigiri agents.
//!
//! - `PromptComposer`: renders the static sections plus registered context
//!   providers into a markdown-style system prompt
//! - `ContextProvider`: pluggable source of runtime information

pub mod composer;
pub mod provider;

pub use composer::{PromptComposer, PromptSection};
pub use provider::{ContextProvider, CurrentDateProvider, StaticContextProvider};
