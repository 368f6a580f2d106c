//! Output formatting utilities for the CLI.

use colored::Colorize;
use serde::Serialize;

/// Print a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a key-value pair.
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.bold(), value);
}

/// Print a section header.
pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Print pretty JSON output.
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}

/// Print a table of data.
pub fn table<T: tabled::Tabled>(data: &[T]) {
    use tabled::{settings::Style, Table};

    if data.is_empty() {
        println!("  (no data)");
        return;
    }

    let table = Table::new(data).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Create a spinner for long-running operations.
pub fn spinner(message: &str) -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Format a millisecond latency for display.
pub fn format_latency(latency_ms: f64) -> String {
    if latency_ms.is_finite() {
        format!("{latency_ms:.1}ms")
    } else {
        "-".to_string()
    }
}

/// Format a fraction as a percentage.
pub fn format_rate(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}
