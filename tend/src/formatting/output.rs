//! General output formatting utilities.

use owo_colors::OwoColorize;

/// Prints a step of a task body.
pub fn print_step(text: &str) {
    println!("  {} {}", "→".cyan(), text.bold());
}

/// Prints secondary text, such as relayed command output.
pub fn print_echo(text: &str) {
    println!("    {}", text.bright_black());
}

/// Prints a key-value pair with consistent formatting.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", key.bright_black().bold(), value.bold().white());
}

/// Prints the closing banner of a run.
pub fn print_banner(message: &str) {
    let rule = "═".repeat(message.chars().count() + 4);
    println!();
    println!("  {}", format!("╔{}╗", rule).green());
    println!("  {}  {}  {}", "║".green(), message.green().bold(), "║".green());
    println!("  {}", format!("╚{}╝", rule).green());
    println!();
}
