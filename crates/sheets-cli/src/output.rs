//! Output formatting for the CLI.

use chrono::Local;
use clap::ValueEnum;
use serde::Serialize;
use sheets_relay::{ExchangeRecord, Sender};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format.
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", value),
        },
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "status": "success", "message": message })
        ),
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({ "status": "error", "message": message })
        ),
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(50));
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    print_divider();
}

/// Print one transcript record. JSON output is one object per line.
pub fn print_record(record: &ExchangeRecord, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            let who = match (record.sender, record.error) {
                (Sender::User, _) => "you",
                (Sender::Relay, false) => "relay",
                (Sender::Relay, true) => "relay!",
            };
            let time = record.timestamp.with_timezone(&Local).format("%H:%M:%S");
            println!("[{}] {:>6}: {}", time, who, record.content);
        }
        OutputFormat::Json => match serde_json::to_string(record) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: {}", e),
        },
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
