//! Output formatting utilities for the Vigil CLI.
//!
//! Supports table, JSON, and YAML output formats.

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Output format selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Render as a formatted table
    #[default]
    Table,
    /// Render as JSON
    Json,
    /// Render as YAML
    Yaml,
}

/// Print a success message to stdout.
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// Print a warning message to stdout.
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg);
}

/// Print rows as a table.
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No probes registered.".dimmed());
        return;
    }
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();
    println!("{}", table);
}

/// Print a single item as JSON or YAML.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(item)?);
        }
    }
    Ok(())
}

/// Print key-value details to the terminal.
pub fn print_detail(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a section header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
    println!();
}

/// Color a status word by severity.
pub fn colorize_status(status: &str) -> ColoredString {
    match status {
        "healthy" => status.green(),
        "degraded" => status.yellow(),
        "unhealthy" => status.red(),
        other => other.normal(),
    }
}
