//! Agent orchestration for Onigiri.
//!
//! The agent module drives one request/response cycle at a time:
//! - `AgentBuilder`: validates and assembles an agent from config, provider, memory, and composer
//! - `Agent`: starts turns, renders the system prompt, calls the provider, records replies
//! - `SharedAgent`: serializes whole turns for concurrent callers

pub mod builder;
pub mod engine;
pub mod shared;

pub use builder::AgentBuilder;
pub use engine::Agent;
pub use shared::SharedAgent;
