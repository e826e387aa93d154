//! # Observability
//!
//! Tracing subscriber setup shared by SheetsManager binaries.
//!
//! Binaries call [`init`] once at startup and use plain `tracing` macros
//! everywhere else. Every event is appended as one JSON object per line to
//! `~/.sheets-manager/logs/sheets-manager.jsonl`, so the log can be followed
//! with `tail -f ... | jq`. A compact stderr layer can be switched on for
//! interactive debugging.
//!
//! ```rust,ignore
//! let guard = observability::init(observability::LogConfig {
//!     service_name: "sheets-manager".into(),
//!     default_level: "debug".into(),
//!     ..Default::default()
//! })?;
//! tracing::info!(log_path = %guard.log_path.display(), "ready");
//! ```

mod file_sink;
mod json_layer;

pub use file_sink::{AppendWriter, AppendWriterFactory};
pub use json_layer::{JsonLayer, LogLine};

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Directory under the home directory holding all SheetsManager state.
pub const APP_DIR_NAME: &str = ".sheets-manager";

/// File name of the JSONL log inside the logs directory.
pub const LOG_FILE_NAME: &str = "sheets-manager.jsonl";

#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("home directory not found; set an explicit log path")]
    NoHomeDir,

    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("global subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Written into every log line as `service`.
    pub service_name: String,

    /// Default filter directive; `RUST_LOG` wins when set.
    pub default_level: String,

    /// Log file override. Defaults to [`default_log_path`].
    pub log_path: Option<PathBuf>,

    /// Also emit compact human-readable lines on stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "sheets-manager".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Handle returned by [`init`].
#[derive(Debug, Clone)]
pub struct LogGuard {
    /// Where JSONL lines are being appended.
    pub log_path: PathBuf,
}

/// `~/.sheets-manager/logs/sheets-manager.jsonl`, if a home directory exists.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR_NAME).join("logs").join(LOG_FILE_NAME))
}

/// Build the filter from `RUST_LOG`, falling back to `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber.
pub fn init(config: LogConfig) -> Result<LogGuard, ObservabilityError> {
    let log_path = match config.log_path.clone() {
        Some(path) => path,
        None => default_log_path().ok_or(ObservabilityError::NoHomeDir)?,
    };

    let writer = AppendWriter::open(&log_path).map_err(|source| ObservabilityError::Open {
        path: log_path.clone(),
        source,
    })?;
    let json_layer = JsonLayer::new(config.service_name.clone(), AppendWriterFactory::new(writer))
        .with_filter(env_filter(&config.default_level));

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| ObservabilityError::AlreadyInstalled(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        log_path = %log_path.display(),
        "observability initialized"
    );
    Ok(LogGuard { log_path })
}

pub use tracing::{debug, error, info, trace, warn, Level};
