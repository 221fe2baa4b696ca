//! Main chat loop orchestration.
//!
//! Builds the agent from config, restores the snapshot if there is one, then
//! alternates between reading a line, running a turn, and printing the reply.
//! With a snapshot path, memory is saved after every completed turn.

use std::future::Future;
use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use onigiri_core::agent::Agent;
use onigiri_infra::snapshot::SnapshotStore;
use onigiri_types::error::AgentError;
use onigiri_types::llm::CompletionResponse;

use crate::cli::ChatArgs;
use crate::cli::history::print_history;
use crate::cli::prompt::print_prompt;
use crate::setup;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// Run the interactive chat loop.
pub async fn run_chat_loop(args: ChatArgs) -> anyhow::Result<()> {
    let mut config = setup::load(args.config.as_deref()).await;
    setup::apply_overrides(&mut config, &args);

    let store = args.snapshot.as_ref().map(SnapshotStore::new);
    let memory = setup::initial_memory(&config, &args, store.as_ref()).await?;
    let restored = memory.message_count();
    let mut agent = setup::build_agent(&config, memory)?;

    let snapshot_display = store.as_ref().map(|s| s.path().display().to_string());
    print_welcome_banner(
        agent.provider_name(),
        agent.config().model(),
        snapshot_display.as_deref(),
        restored,
    );

    let prompt = format!("  {} ", style("You >").green().bold());
    let mut chat_input =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::Reset => {
                    agent.reset_memory();
                    println!("\n  {} Memory reset.\n", style("*").cyan().bold());
                }
                ChatCommand::Undo => undo_last_turn(&mut agent),
                ChatCommand::Save => match &store {
                    Some(store) => save_snapshot(store, &agent).await,
                    None => println!(
                        "\n  {} No snapshot file. Start with --snapshot <path> to enable saving.\n",
                        style("!").yellow().bold()
                    ),
                },
                ChatCommand::History => print_history(agent.memory()),
                ChatCommand::Prompt => print_prompt(
                    agent.config().system_role(),
                    &agent.system_prompt().unwrap_or_default(),
                ),
                ChatCommand::Unknown(name) => println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            }
            continue;
        }

        chat_input.suspend();
        match run_turn(&mut agent, text).await {
            Ok(()) => {
                if let Some(store) = &store {
                    save_snapshot(store, &agent).await;
                }
            }
            Err(err) => {
                let marker = if err.is_interrupted() {
                    style("!").yellow().bold()
                } else {
                    style("!").red().bold()
                };
                eprintln!("\n  {marker} {err}");
                eprintln!(
                    "  {}",
                    style("Your message is kept. Send /undo to drop it, or keep chatting.").dim()
                );
            }
        }
    }

    println!("\n  {}", style("Session ended.").dim());
    chat_input.close();

    if let Some(store) = &store {
        save_snapshot(store, &agent).await;
    }
    Ok(())
}

/// Run one turn, cancelling the model call on Ctrl+C.
///
/// The line editor must be suspended first, otherwise Ctrl+C is read as
/// terminal input and never raised as a signal.
async fn run_turn(agent: &mut Agent, text: String) -> Result<(), AgentError> {
    let spinner = thinking_spinner();
    let start_time = Instant::now();
    let result = run_turn_until(agent, text, ctrl_c()).await;
    spinner.finish_and_clear();

    let response = result?;
    print_reply(&response, start_time.elapsed());
    Ok(())
}

/// Resolves on SIGINT. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Run one turn, cancelling it once `interrupt` resolves.
async fn run_turn_until(
    agent: &mut Agent,
    text: String,
    interrupt: impl Future<Output = ()>,
) -> Result<CompletionResponse, AgentError> {
    let cancel = CancellationToken::new();
    let turn = agent.run_with_cancel(Some(text.into()), &cancel);
    tokio::pin!(turn);

    tokio::select! {
        result = &mut turn => result,
        () = interrupt => {
            cancel.cancel();
            turn.await
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_reply(response: &CompletionResponse, elapsed: Duration) {
    println!();
    for line in response.content.lines() {
        println!("  {line}");
    }
    println!(
        "\n  {}",
        style(format!(
            "{} in / {} out tokens · {:.1}s · {}",
            response.usage.input_tokens,
            response.usage.output_tokens,
            elapsed.as_secs_f64(),
            response.model
        ))
        .dim()
    );
    println!();
}

fn undo_last_turn(agent: &mut Agent) {
    let Some(turn_id) = agent.memory().last_message().map(|m| m.turn_id.clone()) else {
        println!("\n  {}\n", style("Nothing to undo.").dim());
        return;
    };

    match agent.memory_mut().delete_by_turn(&turn_id) {
        Ok(removed) => println!(
            "\n  {} Removed {removed} message(s) from the last turn.\n",
            style("*").cyan().bold()
        ),
        Err(err) => println!("\n  {} {err}\n", style("!").red().bold()),
    }
}

async fn save_snapshot(store: &SnapshotStore, agent: &Agent) {
    match store.save(agent.memory()).await {
        Ok(()) => info!(path = %store.path().display(), "Snapshot saved"),
        Err(err) => {
            warn!(error = %err, "Failed to save snapshot");
            eprintln!("\n  {} {err}\n", style("!").red().bold());
        }
    }
}
