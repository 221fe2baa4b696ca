//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(provider: &str, model: &str, snapshot: Option<&str>, restored: usize) {
    println!();
    println!("  {} {}", "🍙", style("onigiri").cyan().bold());
    println!();
    println!("  {}  {}", style("Provider:").bold(), style(provider).dim());
    println!("  {}     {}", style("Model:").bold(), style(model).dim());
    if let Some(path) = snapshot {
        println!("  {}  {}", style("Snapshot:").bold(), style(path).dim());
    }
    if restored > 0 {
        println!(
            "  {}  {}",
            style("Restored:").bold(),
            style(format!("{restored} messages")).dim()
        );
    }
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
