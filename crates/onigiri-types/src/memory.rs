//! Serialized conversation memory layout.
//!
//! `MemorySnapshot` is the persisted/wire shape of a conversation memory.
//! Field names are part of the on-disk format and must not change:
//!
//! ```json
//! {
//!   "history": [{"role": "...", "content": {"type_name": "...", "content": ...}, "turn_id": "..."}],
//!   "max_messages": -1,
//!   "current_turn_id": "..."
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Sentinel for an unbounded history in the serialized form.
pub const UNBOUNDED: i64 = -1;

/// Plain-data snapshot of a conversation memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub history: Vec<Message>,
    pub max_messages: i64,
    pub current_turn_id: String,
}

impl Default for MemorySnapshot {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            max_messages: UNBOUNDED,
            current_turn_id: String::new(),
        }
    }
}

impl MemorySnapshot {
    /// Decode the serialized bound: `-1` is unbounded, `n >= 0` is a limit.
    ///
    /// Returns `Err` with the offending value for anything below `-1`.
    pub fn bound(&self) -> Result<Option<usize>, i64> {
        match self.max_messages {
            UNBOUNDED => Ok(None),
            n if n >= 0 => usize::try_from(n).map(Some).map_err(|_| n),
            n => Err(n),
        }
    }

    /// Encode a bound into its serialized form.
    pub fn encode_bound(bound: Option<usize>) -> i64 {
        bound.map_or(UNBOUNDED, |n| i64::try_from(n).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MessageContent;

    #[test]
    fn test_default_snapshot_is_unbounded() {
        let snapshot = MemorySnapshot::default();
        assert_eq!(snapshot.max_messages, -1);
        assert_eq!(snapshot.bound(), Ok(None));
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.current_turn_id, "");
    }

    #[test]
    fn test_bound_decoding() {
        let mut snapshot = MemorySnapshot::default();

        snapshot.max_messages = 0;
        assert_eq!(snapshot.bound(), Ok(Some(0)));

        snapshot.max_messages = 25;
        assert_eq!(snapshot.bound(), Ok(Some(25)));

        snapshot.max_messages = -7;
        assert_eq!(snapshot.bound(), Err(-7));
    }

    #[test]
    fn test_encode_bound() {
        assert_eq!(MemorySnapshot::encode_bound(None), -1);
        assert_eq!(MemorySnapshot::encode_bound(Some(3)), 3);
    }

    #[test]
    fn test_snapshot_field_names() {
        let snapshot = MemorySnapshot {
            history: vec![Message::new("user", MessageContent::text("hi"), "t1")],
            max_messages: 10,
            current_turn_id: "t1".to_string(),
        };
        let json_str = serde_json::to_string(&snapshot).unwrap();

        assert!(json_str.contains("\"history\":["));
        assert!(json_str.contains("\"max_messages\":10"));
        assert!(json_str.contains("\"current_turn_id\":\"t1\""));
        assert!(json_str.contains("\"type_name\":\"string\""));
        assert!(json_str.contains("\"turn_id\":\"t1\""));
    }
}
