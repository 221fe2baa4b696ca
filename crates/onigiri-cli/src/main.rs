//! Onigiri command-line entry point.
//!
//! Binary name: `onigiri`
//!
//! Parses CLI arguments, sets up tracing, then dispatches to the command
//! handler.

mod cli;
mod setup;

use clap::Parser;
use clap_complete::generate;

use onigiri_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.validate()?;

    let options = TracingOptions::from_verbosity(cli.verbose, cli.quiet)
        .with_json(cli.log_json)
        .with_otel(cli.otel);
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Commands::Chat(args) => cli::chat::run_chat_loop(args).await,
        Commands::Prompt { config } => cli::prompt::show_prompt(config.as_deref(), cli.json).await,
        Commands::History { snapshot } => cli::history::show_history(&snapshot, cli.json).await,
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "onigiri", &mut std::io::stdout());
            Ok(())
        }
    };

    shutdown_tracing();
    result
}
