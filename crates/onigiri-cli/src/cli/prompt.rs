//! `onigiri prompt`: print the system prompt a chat session would send.

use std::path::Path;

use console::style;
use serde_json::json;

use crate::setup;

pub async fn show_prompt(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = setup::load(config_path).await;
    let role = config.agent.system_role.clone();
    let prompt = setup::build_composer(&config.prompt).generate_prompt();

    if json {
        let value = json!({
            "system_role": role,
            "enabled": !role.is_empty(),
            "prompt": prompt,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_prompt(&role, &prompt);
    Ok(())
}

pub fn print_prompt(role: &str, prompt: &str) {
    println!();
    if role.is_empty() {
        println!(
            "  {}",
            style("System message disabled (system_role is empty).").yellow()
        );
    } else if prompt.is_empty() {
        println!("  {}", style("(empty system prompt)").dim());
    } else {
        println!("  {} {}", style("Role:").bold(), style(role).dim());
        println!();
        for line in prompt.lines() {
            println!("  {line}");
        }
    }
    println!();
}
