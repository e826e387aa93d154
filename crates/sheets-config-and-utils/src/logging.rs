//! Logging initialization.
//!
//! Thin wrapper over the observability crate: JSONL lines go to
//! `~/.sheets-manager/logs/sheets-manager.jsonl`.

use crate::{CoreResult, Paths};
use observability::{LogConfig, LogGuard};

/// Install the global subscriber for `service_name`.
///
/// `level` is the default filter; `RUST_LOG` wins when set.
pub fn init_logging(
    paths: &Paths,
    service_name: &str,
    level: &str,
    also_stderr: bool,
) -> CoreResult<LogGuard> {
    paths.ensure_dirs()?;
    let guard = observability::init(LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level).as_str().to_ascii_lowercase(),
        log_path: Some(paths.log_file()),
        also_stderr,
    })?;
    Ok(guard)
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
