//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and control the conversation memory, the
//! snapshot file, and the session itself.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Restore memory to its state at session start.
    Reset,
    /// Delete every message of the most recent turn.
    Undo,
    /// Write the snapshot file now.
    Save,
    /// Show conversation history.
    History,
    /// Show the rendered system prompt.
    Prompt,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/reset" => Some(ChatCommand::Reset),
        "/undo" => Some(ChatCommand::Undo),
        "/save" => Some(ChatCommand::Save),
        "/history" => Some(ChatCommand::History),
        "/prompt" => Some(ChatCommand::Prompt),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let entries = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the screen"),
        ("/reset", "Forget everything said in this session"),
        ("/undo", "Delete the last turn"),
        ("/save", "Write the snapshot file"),
        ("/history", "Show conversation history"),
        ("/prompt", "Show the system prompt"),
        ("/quit", "End the chat session"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (name, description) in entries {
        println!("  {} {}", style(format!("{name:<10}")).cyan(), description);
    }
    println!();
    println!("  {}", style("Ctrl+D to exit, Ctrl+C cancels a pending reply").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_memory_commands() {
        assert_eq!(parse("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse("/undo"), Some(ChatCommand::Undo));
        assert_eq!(parse("  /SAVE  "), Some(ChatCommand::Save));
        assert_eq!(parse("/history"), Some(ChatCommand::History));
        assert_eq!(parse("/prompt"), Some(ChatCommand::Prompt));
    }

    #[test]
    fn test_trailing_arguments_ignored() {
        assert_eq!(parse("/undo now please"), Some(ChatCommand::Undo));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("hello world"), None);
        assert_eq!(parse("what about /undo?"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo"), Some(ChatCommand::Unknown("/foo".to_string())));
    }
}
