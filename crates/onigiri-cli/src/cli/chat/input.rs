//! Async readline input handling for the chat loop.
//!
//! Wraps `rustyline_async::Readline` to provide async line reading with
//! proper handling of EOF (Ctrl+D) and interrupt (Ctrl+C) signals.
//!
//! The editor keeps the terminal in raw mode, where Ctrl+C arrives as an
//! input byte instead of SIGINT. [`ChatInput::suspend`] drops the editor
//! while a reply is pending so Ctrl+C reaches the process as a signal; the
//! next [`ChatInput::read_line`] rebuilds it and replays the line history.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};
use tracing::warn;

/// Events produced by the input handler.
#[derive(Debug)]
pub enum InputEvent {
    /// User submitted a line.
    Message(String),
    /// End of file (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

struct Editor {
    rl: Readline,
    // Readline reports the input as closed once every writer is dropped.
    _writer: SharedWriter,
}

/// Async input handler wrapping rustyline_async.
pub struct ChatInput {
    prompt: String,
    history: Vec<String>,
    editor: Option<Editor>,
}

impl ChatInput {
    /// Create a new chat input handler with the given prompt.
    pub fn new(prompt: String) -> Result<Self, ReadlineError> {
        let mut input = Self {
            prompt,
            history: Vec::new(),
            editor: None,
        };
        input.editor()?;
        Ok(input)
    }

    fn editor(&mut self) -> Result<&mut Editor, ReadlineError> {
        let editor = match self.editor.take() {
            Some(editor) => editor,
            None => {
                let (mut rl, writer) = Readline::new(self.prompt.clone())?;
                for entry in &self.history {
                    rl.add_history_entry(entry.clone());
                }
                Editor {
                    rl,
                    _writer: writer,
                }
            }
        };
        Ok(self.editor.insert(editor))
    }

    /// Read a line of input. Read errors are treated as end of input.
    pub async fn read_line(&mut self) -> InputEvent {
        let editor = match self.editor() {
            Ok(editor) => editor,
            Err(err) => {
                warn!(error = %err, "Failed to restore line editor");
                return InputEvent::Eof;
            }
        };

        match editor.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    editor.rl.add_history_entry(trimmed.clone());
                    self.history.push(trimmed.clone());
                }
                InputEvent::Message(trimmed)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(_) => InputEvent::Eof,
        }
    }

    /// Hand the terminal back in cooked mode until the next read.
    pub fn suspend(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            let _ = editor.rl.flush();
        }
    }

    /// Clear the terminal screen.
    pub fn clear(&mut self) {
        if let Ok(editor) = self.editor() {
            let _ = editor.rl.clear();
        }
    }

    /// Flush pending output and restore the terminal.
    pub fn close(mut self) {
        self.suspend();
    }
}
