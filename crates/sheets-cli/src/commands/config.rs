//! Configuration commands.

use super::{relay_client, SET_URL_HINT};
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use serde::Serialize;
use sheets_config_and_utils::{Config, FileConfigStore, Paths};
use sheets_relay::{endpoint, ConfigStore, ProbeOutcome, SheetsSession, PROBE_CONFIRMATION};
use std::fmt;
use std::sync::Arc;

/// Effective configuration as shown by `config show`.
#[derive(Serialize)]
struct ConfigView {
    config_file: String,
    log_file: String,
    n8n_url: Option<String>,
    url_check: Option<String>,
    log_level: String,
    request_timeout_secs: u64,
    response_fields: Vec<String>,
}

impl fmt::Display for ConfigView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SheetsManager Configuration")?;
        writeln!(f, "{}", "-".repeat(50))?;
        let rows = [
            ("Config file", self.config_file.clone()),
            ("Log file", self.log_file.clone()),
            ("Webhook URL", self.n8n_url.clone().unwrap_or_else(|| "(not set)".into())),
            ("URL check", self.url_check.clone().unwrap_or_else(|| "-".into())),
            ("Log level", self.log_level.clone()),
            ("Timeout", format!("{}s", self.request_timeout_secs)),
            ("Reply fields", self.response_fields.join(", ")),
        ];
        for (label, value) in rows {
            writeln!(f, "  {:<16} {}", format!("{}:", label), value)?;
        }
        Ok(())
    }
}

/// Print the effective configuration.
pub fn config_show(paths: &Paths, config: &Config, format: &OutputFormat) -> Result<()> {
    let endpoint = config.endpoint().map(str::to_owned);
    let view = ConfigView {
        config_file: paths.config_file().display().to_string(),
        log_file: paths.log_file().display().to_string(),
        url_check: endpoint.as_deref().map(|url| endpoint::check(url).describe()),
        n8n_url: endpoint,
        log_level: config.log_level.clone(),
        request_timeout_secs: config.request_timeout_secs,
        response_fields: config.response_fields.clone(),
    };
    output::print(&view, format);
    Ok(())
}

/// Store the webhook URL, then test it.
pub async fn config_set_url(
    paths: &Paths,
    config: &Config,
    url: &str,
    format: &OutputFormat,
) -> Result<()> {
    let store = Arc::new(FileConfigStore::new(paths.clone()));
    let session = SheetsSession::new(store, relay_client(config)?);
    let (check, outcome) = session
        .save_endpoint(url)
        .await
        .context("failed to save webhook URL")?;

    if !check.is_well_formed() && *format == OutputFormat::Text {
        eprintln!("Warning: {}", check.describe());
    }
    output::print_success(
        &format!("Webhook URL saved to {}", paths.config_file().display()),
        format,
    );
    match outcome {
        ProbeOutcome::Connected => output::print_success(PROBE_CONFIRMATION, format),
        ProbeOutcome::Failed(e) => output::print_error(&e.report(), format),
        ProbeOutcome::NotConfigured => output::print_error(SET_URL_HINT, format),
    }
    Ok(())
}

/// Remove the stored webhook URL.
pub fn config_clear_url(paths: &Paths, format: &OutputFormat) -> Result<()> {
    FileConfigStore::new(paths.clone())
        .clear_endpoint()
        .context("failed to clear webhook URL")?;
    output::print_success("Webhook URL cleared", format);
    Ok(())
}
