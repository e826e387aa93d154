//! SheetsManager CLI - relay spreadsheet questions to an n8n workflow.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use sheets_config_and_utils::{init_logging, Config, Paths};
use std::path::PathBuf;
use tracing::debug;

/// SheetsManager CLI - send spreadsheets and questions to your n8n webhook.
#[derive(Parser)]
#[command(name = "sheets-manager")]
#[command(about = "Chat with an n8n workflow about CSV and Excel files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Mirror log lines to stderr
    #[arg(long, global = true)]
    log_stderr: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the webhook configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Test the configured webhook
    Probe,

    /// Send one message, optionally with spreadsheets attached
    Send {
        /// Message text
        #[arg(short, long)]
        message: String,
        /// Spreadsheet to attach (repeatable)
        #[arg(short = 'f', long = "file")]
        files: Vec<PathBuf>,
    },

    /// Interactive chat session
    Chat {
        /// Spreadsheet to attach up front (repeatable)
        #[arg(short = 'f', long = "file")]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Store the webhook URL and test it
    SetUrl {
        /// n8n webhook URL
        url: String,
    },
    /// Remove the stored webhook URL
    ClearUrl,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    match init_logging(&paths, "cli", level, cli.log_stderr) {
        Ok(guard) => debug!(log_path = %guard.log_path.display(), "CLI started"),
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    let format = &cli.format;
    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config_show(&paths, &config, format),
            ConfigCommands::SetUrl { url } => {
                commands::config_set_url(&paths, &config, &url, format).await
            }
            ConfigCommands::ClearUrl => commands::config_clear_url(&paths, format),
        },
        Commands::Probe => commands::probe(&config, format).await,
        Commands::Send { message, files } => {
            commands::send(&config, &message, &files, format).await
        }
        Commands::Chat { files } => commands::chat(&paths, &config, &files, format).await,
    }
}
