//! Conversation history display, shared by `onigiri history` and `/history`.

use std::path::Path;

use anyhow::Context;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use onigiri_core::memory::ConversationMemory;
use onigiri_infra::snapshot::SnapshotStore;
use onigiri_types::message::Message;

const PREVIEW_CHARS: usize = 100;

/// Print a saved snapshot as a table, or as raw JSON with `--json`.
pub async fn show_history(path: &Path, json: bool) -> anyhow::Result<()> {
    let memory = SnapshotStore::new(path)
        .load()
        .await
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;

    if json {
        println!("{}", memory.to_json()?);
        return Ok(());
    }

    print_history(&memory);
    Ok(())
}

pub fn print_history(memory: &ConversationMemory) {
    println!();
    if memory.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    } else {
        println!("{}", history_table(memory.history()));
    }

    let bound = match memory.max_messages() {
        Some(n) => n.to_string(),
        None => "unbounded".to_string(),
    };
    println!(
        "  {} messages, limit {}",
        style(memory.message_count()).bold(),
        style(bound).dim()
    );
    println!();
}

fn history_table(messages: &[Message]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Turn").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    for msg in messages {
        let role = if msg.is_user() {
            Cell::new(&msg.role).fg(Color::Green)
        } else if msg.is_assistant() {
            Cell::new(&msg.role).fg(Color::Cyan)
        } else {
            Cell::new(&msg.role).fg(Color::DarkGrey)
        };

        table.add_row(vec![
            Cell::new(short_turn(&msg.turn_id)).fg(Color::DarkGrey),
            role,
            Cell::new(&msg.content.type_name),
            Cell::new(preview(&msg.content.as_prompt_text(), PREVIEW_CHARS)),
        ]);
    }

    table
}

fn short_turn(turn_id: &str) -> &str {
    turn_id.get(..8).unwrap_or(turn_id)
}

/// First `max_chars` characters of `text` on one line, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use onigiri_types::content::MessageContent;
    use tempfile::TempDir;

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview("hello\n  world", 20), "hello world");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "おにぎり".repeat(10);
        let cut = preview(&text, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_short_turn() {
        assert_eq!(short_turn("0123456789abcdef"), "01234567");
        assert_eq!(short_turn("abc"), "abc");
        assert_eq!(short_turn(""), "");
    }

    #[test]
    fn test_table_has_row_per_message() {
        let messages = vec![
            Message::new("user", MessageContent::text("Hi"), "turn-1"),
            Message::new("assistant", MessageContent::text("Hello"), "turn-1"),
        ];
        let rendered = history_table(&messages).to_string();
        assert!(rendered.contains("Hi"));
        assert!(rendered.contains("Hello"));
        assert!(rendered.contains("string"));
    }

    #[tokio::test]
    async fn test_show_history_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let err = show_history(&tmp.path().join("none.json"), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read snapshot"));
    }
}
