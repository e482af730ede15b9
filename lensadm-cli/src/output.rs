//! Output formatting for CLI
//!
//! Every command prints through these helpers so tables, JSON and YAML look
//! the same across the user, role and namespace commands.

use chrono::{DateTime, Utc};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Table,
        }
    }
}

/// Print rows as a table, or the raw records as JSON or YAML
pub fn print_output<R: Tabled, T: Serialize>(
    rows: Vec<R>,
    records: &T,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(rows),
        OutputFormat::Json => print_json(records)?,
        OutputFormat::Yaml => print_yaml(records)?,
    }
    Ok(())
}

/// Print a single item in the specified format
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        // Single objects nest too deeply for a table
        OutputFormat::Table | OutputFormat::Yaml => print_yaml(data)?,
        OutputFormat::Json => print_json(data)?,
    }
    Ok(())
}

pub fn print_table<T: Tabled>(data: Vec<T>) {
    if data.is_empty() {
        println!("{}", "No results found".yellow());
        return;
    }

    let table = Table::new(data);
    println!("{}", table);
}

pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    print!("{}", yaml);
    Ok(())
}

/// Print a success message with green checkmark
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print an error message with red X
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message with blue i
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold().underline());
}

/// Spinner shown while a request is in flight
pub fn spinner(progress: &MultiProgress, message: &str) -> ProgressBar {
    let spinner = progress.add(ProgressBar::new_spinner());
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a timestamp relative to `now` (e.g., "5m ago", "2d ago")
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_seconds();

    if diff < 0 {
        let abs_diff = -diff;
        if abs_diff < 60 {
            format!("in {}s", abs_diff)
        } else if abs_diff < 3600 {
            format!("in {}m", abs_diff / 60)
        } else if abs_diff < 86400 {
            format!("in {}h", abs_diff / 3600)
        } else {
            format!("in {}d", abs_diff / 86400)
        }
    } else if diff < 60 {
        format!("{}s ago", diff)
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86400)
    }
}

/// Age column text; `-` when the timestamp is missing
pub fn format_age(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => format_relative_time(ts, Utc::now()),
        None => "-".to_string(),
    }
}

/// Truncate a string to max characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
