//! Context providers inject runtime information into the system prompt.
//!
//! Each registered provider contributes one titled subsection under
//! "EXTRA INFORMATION AND CONTEXT". Providers are queried every time the
//! prompt is rendered, so their info can change between turns.

use chrono::{NaiveDate, Utc};

/// A source of runtime context for the system prompt.
///
/// Implementations should be cheap and side-effect free; they are called
/// synchronously on every prompt render.
pub trait ContextProvider: Send + Sync {
    /// Subsection title (rendered as `# <title>`).
    fn title(&self) -> String;

    /// Subsection body (rendered as a single `- <info>` bullet).
    fn info(&self) -> String;
}

/// A provider with fixed title and info.
#[derive(Debug, Clone)]
pub struct StaticContextProvider {
    title: String,
    info: String,
}

impl StaticContextProvider {
    pub fn new(title: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            info: info.into(),
        }
    }

    /// Replace the info text.
    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }
}

impl ContextProvider for StaticContextProvider {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn info(&self) -> String {
        self.info.clone()
    }
}

/// Reports the current UTC date, or a pinned date when one is set.
#[derive(Debug, Clone, Default)]
pub struct CurrentDateProvider {
    pinned: Option<NaiveDate>,
}

impl CurrentDateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always report `date`.
    pub fn pinned(date: NaiveDate) -> Self {
        Self { pinned: Some(date) }
    }
}

impl ContextProvider for CurrentDateProvider {
    fn title(&self) -> String {
        "Current Date".to_string()
    }

    fn info(&self) -> String {
        let date = self.pinned.unwrap_or_else(|| Utc::now().date_naive());
        format!("Today is {}", date.format("%A, %Y-%m-%d"))
    }
}
