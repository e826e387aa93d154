//! File system layout under `~/.sheets-manager`.

use crate::{CoreError, CoreResult};
use observability::{APP_DIR_NAME, LOG_FILE_NAME};
use std::path::PathBuf;

/// Resolves every path SheetsManager reads or writes.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Paths rooted at `~/.sheets-manager`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;
        Ok(Self {
            base_dir: home.join(APP_DIR_NAME),
        })
    }

    /// Paths rooted at a custom directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// `config.json` holding the endpoint and log level.
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// JSONL log written by the observability layer.
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }

    /// Create the base and logs directories.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
