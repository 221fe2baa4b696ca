//! Conversation message types for Onigiri.
//!
//! A `Message` is one entry of conversation history: a free-form role label,
//! tagged content, and the id of the turn that produced it.

use serde::{Deserialize, Serialize};

use crate::content::MessageContent;

/// Role label for the synthesized system prompt.
pub const ROLE_SYSTEM: &str = "system";
/// Role label for user input.
pub const ROLE_USER: &str = "user";
/// Role label for model replies.
pub const ROLE_ASSISTANT: &str = "assistant";

/// A single message in conversation history.
///
/// Roles are free-form strings; `system`, `user`, and `assistant` are the
/// conventional ones, but providers may accept others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
    pub turn_id: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: MessageContent, turn_id: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content,
            turn_id: turn_id.into(),
        }
    }

    /// A system message outside of any turn.
    pub fn system(prompt: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, MessageContent::text(prompt), "")
    }

    pub fn is_system(&self) -> bool {
        self.role == ROLE_SYSTEM
    }

    pub fn is_user(&self) -> bool {
        self.role == ROLE_USER
    }

    pub fn is_assistant(&self) -> bool {
        self.role == ROLE_ASSISTANT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_json_layout() {
        let msg = Message::new(ROLE_USER, MessageContent::text("Hello"), "turn-1");
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": {"type_name": "string", "content": "Hello"},
                "turn_id": "turn-1"
            })
        );
    }

    #[test]
    fn test_custom_role_roundtrip() {
        let msg = Message::new("tool", MessageContent::raw("Lookup", json!({"hits": 3})), "t");
        let json_str = serde_json::to_string(&msg).unwrap();
        let parsed: Message = serde_json::from_str(&json_str).unwrap();

        assert_eq!(parsed, msg);
        assert!(!parsed.is_user());
        assert!(!parsed.is_assistant());
    }

    #[test]
    fn test_system_message_has_no_turn() {
        let msg = Message::system("be brief");
        assert!(msg.is_system());
        assert_eq!(msg.turn_id, "");
        assert_eq!(msg.content.as_str(), Some("be brief"));
    }
}
