//! CLI command implementations.

mod chat;
mod config;
mod relay;

pub use chat::chat;
pub use config::{config_clear_url, config_set_url, config_show};
pub use relay::{probe, send};

use anyhow::{Context, Result};
use sheets_config_and_utils::Config;
use sheets_relay::attachment::accept_spreadsheets;
use sheets_relay::{Attachment, FilePicker, PathFilePicker, RelayClient};
use std::path::PathBuf;

const SET_URL_HINT: &str = "No webhook URL configured. Run 'sheets-manager config set-url <url>'";

/// Relay client built from the effective configuration.
fn relay_client(config: &Config) -> Result<RelayClient> {
    RelayClient::new(config.relay_config()).context("failed to build HTTP client")
}

/// Read `files` from disk and keep only spreadsheets, reporting the rest.
fn load_spreadsheets(files: &[PathBuf]) -> Result<Vec<Attachment>> {
    let offered = PathFilePicker::new(files.iter().cloned()).pick()?;
    let offered_count = offered.len();
    let accepted = accept_spreadsheets(offered);
    if accepted.len() < offered_count {
        eprintln!(
            "Skipped {} file(s): only CSV and Excel files are forwarded",
            offered_count - accepted.len()
        );
    }
    Ok(accepted)
}
