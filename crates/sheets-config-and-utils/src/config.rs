//! On-disk configuration.

use crate::{CoreResult, Paths};
use serde::{Deserialize, Serialize};
use sheets_relay::reply::DEFAULT_RESPONSE_FIELDS;
use sheets_relay::RelayConfig;
use std::path::Path;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default request timeout for probes and sends.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Overrides `log_level` at runtime.
pub const LOG_LEVEL_ENV: &str = "SHEETS_MANAGER_LOG_LEVEL";

/// Overrides `n8n_url` at runtime without touching the file.
pub const URL_ENV: &str = "SHEETS_MANAGER_URL";

/// Contents of `~/.sheets-manager/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// n8n webhook URL. Absent disables the relay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n8n_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Reply fields searched for readable text, in priority order.
    #[serde(default = "default_response_fields")]
    pub response_fields: Vec<String>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_response_fields() -> Vec<String> {
    DEFAULT_RESPONSE_FIELDS.iter().map(|f| f.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            n8n_url: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            response_fields: default_response_fields(),
        }
    }
}

impl Config {
    /// Load the config file (defaults when missing), then apply environment
    /// overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let mut config = Self::load_stored(paths)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Exactly what is on disk, without environment overrides.
    pub fn load_stored(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to `paths.config_file()`.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Apply `SHEETS_MANAGER_LOG_LEVEL` and `SHEETS_MANAGER_URL`.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        if let Some(url) = non_blank(URL_ENV) {
            self.n8n_url = Some(url);
        }
    }

    /// Endpoint with blank values treated as absent.
    pub fn endpoint(&self) -> Option<&str> {
        sheets_relay::endpoint::configured(self.n8n_url.as_deref())
    }

    /// Relay client settings derived from this config.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            request_timeout_secs: self.request_timeout_secs,
            response_fields: self.response_fields.clone(),
            ..RelayConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.n8n_url, None);
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.response_fields[0], "response");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "n8n_url": "https://n8n.local/webhook/x" }"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.n8n_url.as_deref(), Some("https://n8n.local/webhook/x"));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_load_stored() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config {
            log_level: "trace".to_string(),
            n8n_url: Some("http://localhost:5678/webhook/abc".to_string()),
            ..Config::default()
        };
        config.save(&paths).unwrap();

        assert_eq!(Config::load_stored(&paths).unwrap(), config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        assert_eq!(Config::load_stored(&paths).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides_win_unless_blank() {
        let env: HashMap<&str, &str> = [
            (LOG_LEVEL_ENV, "debug"),
            (URL_ENV, "  https://override.example/hook  "),
        ]
        .into();
        let mut config = Config::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.endpoint(), Some("https://override.example/hook"));

        let mut config = Config {
            n8n_url: Some("https://stored.example".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.endpoint(), Some("https://stored.example"));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_blank_url_counts_as_absent() {
        let config = Config {
            n8n_url: Some("   ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.endpoint(), None);
    }

    #[test]
    fn test_relay_config_carries_settings() {
        let config = Config {
            request_timeout_secs: 15,
            response_fields: vec!["answer".to_string()],
            ..Config::default()
        };
        let relay = config.relay_config();
        assert_eq!(relay.request_timeout_secs, 15);
        assert_eq!(relay.response_fields, vec!["answer"]);
        assert!(relay.announce_probe_success);
    }
}
