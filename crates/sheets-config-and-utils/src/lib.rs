//! Configuration, filesystem layout, and logging bootstrap for SheetsManager.

mod config;
mod error;
mod logging;
mod paths;
mod store;

pub use config::{Config, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_SECS, LOG_LEVEL_ENV, URL_ENV};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
pub use store::FileConfigStore;
