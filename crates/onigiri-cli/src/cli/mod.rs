//! CLI command definitions for the `onigiri` binary.

pub mod chat;
pub mod history;
pub mod prompt;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Chat with a model from your terminal, with turn-scoped memory.
#[derive(Parser)]
#[command(name = "onigiri", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text (`prompt` and `history`).
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true, env = "ONIGIRI_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Reject flag combinations clap cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.json && matches!(self.command, Commands::Chat(_)) {
            anyhow::bail!("--json is not supported by `onigiri chat`");
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat(ChatArgs),

    /// Print the rendered system prompt.
    Prompt {
        /// Path to onigiri.toml.
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Print a saved conversation snapshot.
    History {
        /// Snapshot file written by `onigiri chat --snapshot`.
        snapshot: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// Path to onigiri.toml.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Override the configured model.
    #[arg(long, short)]
    pub model: Option<String>,

    /// Load the conversation from, and save it to, this file.
    #[arg(long, short)]
    pub snapshot: Option<PathBuf>,

    /// Keep at most this many messages (-1 keeps everything).
    #[arg(long, allow_hyphen_values = true)]
    pub max_messages: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_flags() {
        let cli = Cli::try_parse_from([
            "onigiri",
            "chat",
            "--model",
            "gpt-4o",
            "--snapshot",
            "chat.json",
            "--max-messages",
            "-1",
        ])
        .unwrap();

        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.model.as_deref(), Some("gpt-4o"));
                assert_eq!(args.snapshot, Some(PathBuf::from("chat.json")));
                assert_eq!(args.max_messages, Some(-1));
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["onigiri", "history", "chat.json", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::History { .. }));
    }

    #[test]
    fn test_json_rejected_for_chat() {
        let cli = Cli::try_parse_from(["onigiri", "chat", "--json"]).unwrap();
        let err = cli.validate().unwrap_err();
        assert!(err.to_string().contains("--json"));

        let cli = Cli::try_parse_from(["onigiri", "prompt", "--json"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
