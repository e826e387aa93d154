//! One-shot probe and send commands.

use super::{load_spreadsheets, relay_client, SET_URL_HINT};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use sheets_config_and_utils::Config;
use sheets_relay::{ProbeOutcome, SendOutcome, PROBE_CONFIRMATION};
use std::path::PathBuf;
use tracing::info;

/// Test the configured webhook.
pub async fn probe(config: &Config, format: &OutputFormat) -> Result<()> {
    let relay = relay_client(config)?;

    match relay.probe(config.endpoint()).await {
        ProbeOutcome::Connected => {
            output::print_success(PROBE_CONFIRMATION, format);
            Ok(())
        }
        ProbeOutcome::NotConfigured => anyhow::bail!(SET_URL_HINT),
        ProbeOutcome::Failed(e) => {
            output::print_error(&e.report(), format);
            anyhow::bail!("connection test failed")
        }
    }
}

/// Send one message with attachments and print the reply.
pub async fn send(
    config: &Config,
    message: &str,
    files: &[PathBuf],
    format: &OutputFormat,
) -> Result<()> {
    let attachments = load_spreadsheets(files)?;
    let relay = relay_client(config)?;
    info!(files = attachments.len(), "Sending one-shot message");

    match relay.send(message, &attachments, config.endpoint()).await {
        SendOutcome::Replied(record) => {
            match format {
                OutputFormat::Text => println!("{}", record.content),
                OutputFormat::Json => output::print_record(&record, format),
            }
            Ok(())
        }
        SendOutcome::Failed(record) => {
            match format {
                OutputFormat::Text => eprintln!("{}", record.content),
                OutputFormat::Json => output::print_record(&record, format),
            }
            anyhow::bail!("message was not delivered")
        }
        SendOutcome::EmptyMessage => anyhow::bail!("message must not be blank"),
        SendOutcome::InFlight => anyhow::bail!("another message is still in flight"),
    }
}
