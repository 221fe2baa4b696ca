//! Shared domain types for Onigiri.
//!
//! This crate contains the data shapes used across the Onigiri workspace:
//! tagged message content, conversation messages, the memory snapshot
//! layout, LLM request/response types, configuration, and error types.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, schemars.

pub mod agent;
pub mod config;
pub mod content;
pub mod error;
pub mod llm;
pub mod memory;
pub mod message;
