//! Tagged message content.
//!
//! Every message payload travels with a type tag declared by its producer.
//! Payload types opt in through the [`Tagged`] trait; the payload itself is
//! stored as an opaque JSON value so the content survives serialization
//! without static type information.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag used for content with no declared type (absent or raw JSON payloads).
pub const UNTYPED_TAG: &str = "";

/// A payload type that declares its own content tag.
///
/// Implement this for any struct that should be appended to conversation
/// memory. The tag is plain data, chosen by the producer.
///
/// ```
/// use onigiri_types::content::{MessageContent, Tagged};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Weather {
///     city: String,
///     celsius: f64,
/// }
///
/// impl Tagged for Weather {
///     const TYPE_TAG: &'static str = "Weather";
/// }
///
/// let content = MessageContent::tagged(&Weather { city: "Kyoto".into(), celsius: 21.5 }).unwrap();
/// assert_eq!(content.type_name, "Weather");
/// assert_eq!(content.content["city"], "Kyoto");
/// ```
pub trait Tagged: Serialize {
    const TYPE_TAG: &'static str;
}

macro_rules! impl_tagged {
    ($tag:literal => $($ty:ty),+ $(,)?) => {
        $(
            impl Tagged for $ty {
                const TYPE_TAG: &'static str = $tag;
            }
        )+
    };
}

impl_tagged!("string" => String, str);
impl_tagged!("int" => i8, i16, i32, i64, isize);
impl_tagged!("uint" => u8, u16, u32, u64, usize);
impl_tagged!("float64" => f32, f64);
impl_tagged!("bool" => bool);
impl_tagged!("" => Value);

/// The content of a single message: a type tag plus an opaque payload.
///
/// Serialized as `{"type_name": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    pub type_name: String,
    pub content: Value,
}

impl MessageContent {
    /// Build content from any tagged payload.
    ///
    /// Fails only if the payload cannot be represented as JSON (e.g. a map
    /// with non-string keys).
    pub fn tagged<T: Tagged + ?Sized>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            type_name: T::TYPE_TAG.to_string(),
            content: serde_json::to_value(payload)?,
        })
    }

    /// Plain text content, tagged `string`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            type_name: String::TYPE_TAG.to_string(),
            content: Value::String(text.into()),
        }
    }

    /// Content with no payload at all.
    pub fn empty() -> Self {
        Self {
            type_name: UNTYPED_TAG.to_string(),
            content: Value::Null,
        }
    }

    /// Content built from an explicit tag and a raw JSON payload.
    pub fn raw(type_name: impl Into<String>, content: Value) -> Self {
        Self {
            type_name: type_name.into(),
            content,
        }
    }

    /// Whether this content has no payload.
    pub fn is_empty(&self) -> bool {
        self.content.is_null()
    }

    /// The payload as a string slice, if it is a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        self.content.as_str()
    }

    /// Render the payload as text for a chat-completion wire format.
    ///
    /// - strings are returned verbatim
    /// - objects carrying a string `content` field (model replies) yield that field
    /// - `null` renders as an empty string
    /// - anything else is rendered as compact JSON
    pub fn as_prompt_text(&self) -> String {
        match &self.content {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("content") {
                Some(Value::String(s)) => s.clone(),
                _ => self.content.to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}
