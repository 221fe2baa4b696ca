//! Business logic for Onigiri.
//!
//! This crate owns the conversation memory model, system prompt composition,
//! the model-client trait ("port"), and the agent that ties them together.
//! It depends only on `onigiri-types` -- never on `onigiri-infra` or any
//! network/IO crate.

pub mod agent;
pub mod llm;
pub mod memory;
pub mod prompt;
