//! Infrastructure layer for Onigiri.
//!
//! Contains the concrete pieces `onigiri-core` stays independent of: the
//! OpenAI-compatible model client, the `onigiri.toml` loader, and the
//! on-disk memory snapshot store.

pub mod config;
pub mod llm;
pub mod snapshot;
