//! Turn-scoped conversation memory.
//!
//! `ConversationMemory` owns the ordered message history of an agent. Every
//! appended message is stamped with the current turn id, and an optional
//! bound evicts the oldest messages once the history grows past it.
//!
//! Cloning produces fully independent storage: appending to a clone never
//! shows up in the original and vice versa.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use onigiri_types::content::MessageContent;
use onigiri_types::error::MemoryError;
use onigiri_types::memory::MemorySnapshot;
use onigiri_types::message::Message;

/// Ordered, turn-stamped message history with an optional length bound.
///
/// Serializes through [`MemorySnapshot`], so the JSON form is exactly
/// `{"history", "max_messages", "current_turn_id"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MemorySnapshot", into = "MemorySnapshot")]
pub struct ConversationMemory {
    history: Vec<Message>,
    max_messages: Option<usize>,
    current_turn_id: String,
}

impl ConversationMemory {
    /// Create an empty, unbounded memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty memory that keeps at most `max_messages` messages.
    pub fn with_max_messages(max_messages: usize) -> Self {
        Self {
            max_messages: Some(max_messages),
            ..Self::default()
        }
    }

    /// Rebuild a memory from a snapshot.
    pub fn from_snapshot(snapshot: MemorySnapshot) -> Result<Self, MemoryError> {
        let mut memory = Self::default();
        memory.restore(snapshot)?;
        Ok(memory)
    }

    /// Parse a memory from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, MemoryError> {
        let snapshot: MemorySnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// The history bound, `None` when unbounded.
    pub fn max_messages(&self) -> Option<usize> {
        self.max_messages
    }

    /// Change the history bound, evicting immediately if the history is over it.
    pub fn set_max_messages(&mut self, max_messages: Option<usize>) {
        self.max_messages = max_messages;
        self.evict_overflow();
    }

    /// Start a new turn and return its id.
    ///
    /// Only the current turn id changes; history is untouched. Starting a
    /// turn twice without appending leaves no trace of the first one.
    pub fn start_turn(&mut self) -> &str {
        self.current_turn_id = Uuid::new_v4().to_string();
        debug!(turn_id = %self.current_turn_id, "Started turn");
        &self.current_turn_id
    }

    /// Id of the current turn, empty before the first turn starts.
    pub fn current_turn_id(&self) -> &str {
        &self.current_turn_id
    }

    /// Append a message stamped with the current turn id, then enforce the bound.
    pub fn append_message(&mut self, role: impl Into<String>, content: impl Into<MessageContent>) {
        let message = Message::new(role, content.into(), self.current_turn_id.clone());
        debug!(
            role = %message.role,
            type_name = %message.content.type_name,
            turn_id = %message.turn_id,
            "Appending message"
        );
        self.history.push(message);
        self.evict_overflow();
    }

    /// Drop messages from the front until the history fits its bound.
    fn evict_overflow(&mut self) {
        let Some(max) = self.max_messages else {
            return;
        };
        if self.history.len() > max {
            let excess = self.history.len() - max;
            self.history.drain(..excess);
            debug!(evicted = excess, max_messages = max, "Evicted oldest messages");
        }
    }

    /// Remove every message that belongs to `turn_id`.
    ///
    /// Returns the number of removed messages, or `TurnNotFound` when the
    /// history held no message for that turn (history is then unchanged).
    pub fn delete_by_turn(&mut self, turn_id: &str) -> Result<usize, MemoryError> {
        let before = self.history.len();
        self.history.retain(|m| m.turn_id != turn_id);
        let removed = before - self.history.len();

        if removed == 0 {
            return Err(MemoryError::TurnNotFound(turn_id.to_string()));
        }

        debug!(turn_id, removed, "Deleted turn messages");
        Ok(removed)
    }

    /// Full history, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Messages of a single turn, in conversational order.
    pub fn turn_messages<'a>(&'a self, turn_id: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.history.iter().filter(move |m| m.turn_id == turn_id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.history.last()
    }

    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Plain-data snapshot of the current state.
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            history: self.history.clone(),
            max_messages: MemorySnapshot::encode_bound(self.max_messages),
            current_turn_id: self.current_turn_id.clone(),
        }
    }

    /// Replace the whole state with a snapshot.
    ///
    /// A snapshot whose history exceeds its own bound is trimmed from the
    /// front. On error the memory is left as it was.
    pub fn restore(&mut self, snapshot: MemorySnapshot) -> Result<(), MemoryError> {
        let bound = snapshot.bound().map_err(|n| {
            MemoryError::Serialization(format!(
                "max_messages must be -1 or non-negative, got {n}"
            ))
        })?;

        self.history = snapshot.history;
        self.max_messages = bound;
        self.current_turn_id = snapshot.current_turn_id;
        self.evict_overflow();
        Ok(())
    }

    /// Pretty-printed JSON form of the snapshot.
    pub fn to_json(&self) -> Result<String, MemoryError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl TryFrom<MemorySnapshot> for ConversationMemory {
    type Error = MemoryError;

    fn try_from(snapshot: MemorySnapshot) -> Result<Self, Self::Error> {
        Self::from_snapshot(snapshot)
    }
}

impl From<ConversationMemory> for MemorySnapshot {
    fn from(memory: ConversationMemory) -> Self {
        MemorySnapshot {
            history: memory.history,
            max_messages: MemorySnapshot::encode_bound(memory.max_messages),
            current_turn_id: memory.current_turn_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use onigiri_types::content::Tagged;
    use serde_json::json;

    #[derive(Serialize)]
    struct Note {
        text: String,
    }

    impl Tagged for Note {
        const TYPE_TAG: &'static str = "Note";
    }

    fn note(text: &str) -> MessageContent {
        MessageContent::tagged(&Note {
            text: text.to_string(),
        })
        .unwrap()
    }

    fn texts(memory: &ConversationMemory) -> Vec<String> {
        memory
            .history()
            .iter()
            .map(|m| m.content.as_prompt_text())
            .collect()
    }

    #[test]
    fn test_new_memory_defaults() {
        let memory = ConversationMemory::new();
        assert!(memory.is_empty());
        assert_eq!(memory.max_messages(), None);
        assert_eq!(memory.current_turn_id(), "");
        assert_eq!(memory.snapshot().max_messages, -1);
    }

    #[test]
    fn test_start_turn_sets_id_without_touching_history() {
        let mut memory = ConversationMemory::new();
        let first = memory.start_turn().to_string();
        assert!(!first.is_empty());
        assert!(memory.is_empty());

        let second = memory.start_turn().to_string();
        assert_ne!(first, second);
        assert_eq!(memory.current_turn_id(), second);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_turn_ids_are_unique() {
        let mut memory = ConversationMemory::new();
        let ids: HashSet<String> = (0..10_000)
            .map(|_| memory.start_turn().to_string())
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_append_message_stamps_turn_and_tag() {
        let mut memory = ConversationMemory::new();
        memory.start_turn();
        memory.append_message("user", note("Hello"));

        let msg = &memory.history()[0];
        assert_eq!(memory.message_count(), 1);
        assert_eq!(msg.role, "user");
        assert_eq!(msg.turn_id, memory.current_turn_id());
        assert_eq!(msg.content.type_name, "Note");
        assert_eq!(msg.content.content, json!({"text": "Hello"}));
    }

    #[test]
    fn test_append_before_any_turn_uses_empty_id() {
        let mut memory = ConversationMemory::new();
        memory.append_message("user", MessageContent::empty());
        assert_eq!(memory.history()[0].turn_id, "");
        assert_eq!(memory.history()[0].content.type_name, "");
    }

    #[test]
    fn test_overflow_keeps_last_n_in_order() {
        for max in 0..6 {
            let mut memory = ConversationMemory::with_max_messages(max);
            memory.start_turn();
            for i in 0..10_usize {
                memory.append_message("user", format!("msg{i}"));
                assert!(memory.message_count() <= max);

                let expected: Vec<String> = (0..=i)
                    .skip((i + 1).saturating_sub(max))
                    .map(|j| format!("msg{j}"))
                    .collect();
                assert_eq!(texts(&memory), expected);
            }
        }
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut memory = ConversationMemory::with_max_messages(2);
        memory.start_turn();
        memory.append_message("user", "msg1");
        memory.append_message("user", "msg2");
        memory.append_message("user", "msg3");

        assert_eq!(memory.message_count(), 2);
        assert_eq!(texts(&memory), vec!["msg2", "msg3"]);
    }

    #[test]
    fn test_zero_bound_keeps_history_empty() {
        let mut memory = ConversationMemory::with_max_messages(0);
        memory.start_turn();
        memory.append_message("user", "gone");
        memory.append_message("assistant", "also gone");
        assert!(memory.is_empty());
    }

    #[test]
    fn test_lowering_bound_evicts_immediately() {
        let mut memory = ConversationMemory::new();
        for i in 0..5 {
            memory.append_message("user", format!("m{i}"));
        }
        memory.set_max_messages(Some(2));
        assert_eq!(texts(&memory), vec!["m3", "m4"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = ConversationMemory::new();
        original.start_turn();
        original.append_message("user", "copy this");

        let mut copy = original.clone();
        assert_eq!(copy, original);

        original.append_message("assistant", "only in original");
        assert_eq!(copy.message_count(), 1);
        assert_eq!(original.message_count(), 2);

        copy.append_message("user", "only in copy");
        assert_eq!(original.message_count(), 2);
        assert_eq!(texts(&original)[1], "only in original");
    }

    #[test]
    fn test_delete_by_turn_removes_only_matching() {
        let mut memory = ConversationMemory::new();
        let a = memory.start_turn().to_string();
        memory.append_message("user", "a1");
        let b = memory.start_turn().to_string();
        memory.append_message("user", "b1");
        memory.append_message("assistant", "b2");
        memory.start_turn();
        memory.append_message("user", "c1");
        memory.append_message("assistant", "c2");
        assert_eq!(memory.message_count(), 5);

        let removed = memory.delete_by_turn(&b).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(texts(&memory), vec!["a1", "c1", "c2"]);
        assert_eq!(memory.history()[0].turn_id, a);
    }

    #[test]
    fn test_delete_adjacent_matches() {
        // Consecutive matches must all go, not every other one.
        let mut memory = ConversationMemory::new();
        let turn = memory.start_turn().to_string();
        for i in 0..4 {
            memory.append_message("user", format!("m{i}"));
        }
        assert_eq!(memory.delete_by_turn(&turn).unwrap(), 4);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_delete_unknown_turn_is_not_found() {
        let mut memory = ConversationMemory::new();
        memory.start_turn();
        memory.append_message("user", "won't be deleted");
        let before = memory.clone();

        let err = memory.delete_by_turn("non-existent-id").unwrap_err();
        assert!(matches!(err, MemoryError::TurnNotFound(ref id) if id == "non-existent-id"));
        assert_eq!(memory, before);
    }

    #[test]
    fn test_turn_messages() {
        let mut memory = ConversationMemory::new();
        memory.start_turn();
        memory.append_message("user", "first");
        let turn = memory.start_turn().to_string();
        memory.append_message("user", "q");
        memory.append_message("assistant", "a");

        let roles: Vec<&str> = memory.turn_messages(&turn).map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant"]);
        assert_eq!(memory.last_message().unwrap().content.as_prompt_text(), "a");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut memory = ConversationMemory::with_max_messages(10);
        memory.start_turn();
        memory.append_message("user", note("serialize me"));
        memory.append_message("assistant", MessageContent::tagged(&3_i64).unwrap());

        let json_str = memory.to_json().unwrap();
        let restored = ConversationMemory::from_json(&json_str).unwrap();

        assert_eq!(restored, memory);
        assert_eq!(restored.max_messages(), Some(10));
        assert_eq!(restored.current_turn_id(), memory.current_turn_id());
    }

    #[test]
    fn test_json_roundtrip_zero_bound() {
        let mut memory = ConversationMemory::with_max_messages(0);
        memory.start_turn();
        memory.append_message("user", "dropped");

        let restored = ConversationMemory::from_json(&memory.to_json().unwrap()).unwrap();
        assert_eq!(restored.max_messages(), Some(0));
        assert!(restored.is_empty());
    }

    #[test]
    fn test_serde_goes_through_snapshot_layout() {
        let mut memory = ConversationMemory::new();
        memory.start_turn();
        memory.append_message("user", "hi");

        let value = serde_json::to_value(&memory).unwrap();
        assert_eq!(value["max_messages"], json!(-1));
        assert_eq!(value["history"][0]["content"]["type_name"], "string");
        assert_eq!(value["current_turn_id"], json!(memory.current_turn_id()));

        let parsed: ConversationMemory = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, memory);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            ConversationMemory::from_json("{not json"),
            Err(MemoryError::Serialization(_))
        ));
        assert!(matches!(
            ConversationMemory::from_json(r#"{"history": [], "max_messages": -3, "current_turn_id": ""}"#),
            Err(MemoryError::Serialization(_))
        ));
    }

    #[test]
    fn test_restore_trims_oversized_snapshot() {
        let mut source = ConversationMemory::new();
        for i in 0..4 {
            source.append_message("user", format!("m{i}"));
        }
        let mut snapshot = source.snapshot();
        snapshot.max_messages = 2;

        let restored = ConversationMemory::from_snapshot(snapshot).unwrap();
        assert_eq!(texts(&restored), vec!["m2", "m3"]);
    }

    #[test]
    fn test_failed_restore_leaves_memory_untouched() {
        let mut memory = ConversationMemory::new();
        memory.append_message("user", "keep");
        let before = memory.clone();

        let bad = MemorySnapshot {
            max_messages: -2,
            ..MemorySnapshot::default()
        };
        assert!(memory.restore(bad).is_err());
        assert_eq!(memory, before);
    }
}
