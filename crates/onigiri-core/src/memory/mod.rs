//! Conversation memory for Onigiri agents.
//!
//! - `ConversationMemory`: ordered, turn-stamped history with an optional
//!   length bound and snapshot/restore support

pub mod conversation;

pub use conversation::ConversationMemory;
