//! File-backed endpoint store.

use crate::{Config, CoreError, Paths};
use parking_lot::Mutex;
use sheets_relay::{ConfigStore, StoreError};
use tracing::debug;

/// [`ConfigStore`] persisting the endpoint as `n8n_url` in `config.json`.
///
/// Reads honour `SHEETS_MANAGER_URL`; writes only ever touch the file, so an
/// environment override is never persisted.
#[derive(Debug)]
pub struct FileConfigStore {
    paths: Paths,
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    pub fn new(paths: Paths) -> Self {
        Self {
            paths,
            write_lock: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    fn update(&self, apply: impl FnOnce(&mut Config)) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut config = Config::load_stored(&self.paths).map_err(into_store_error)?;
        apply(&mut config);
        config.save(&self.paths).map_err(into_store_error)
    }
}

impl ConfigStore for FileConfigStore {
    fn load_endpoint(&self) -> Result<Option<String>, StoreError> {
        let config = Config::load(&self.paths).map_err(into_store_error)?;
        Ok(config.endpoint().map(str::to_owned))
    }

    fn save_endpoint(&self, url: &str) -> Result<(), StoreError> {
        self.update(|config| config.n8n_url = Some(url.to_string()))?;
        debug!(path = %self.paths.config_file().display(), "Endpoint written");
        Ok(())
    }

    fn clear_endpoint(&self) -> Result<(), StoreError> {
        self.update(|config| config.n8n_url = None)?;
        debug!(path = %self.paths.config_file().display(), "Endpoint removed");
        Ok(())
    }
}

fn into_store_error(err: CoreError) -> StoreError {
    match err {
        CoreError::Io(io) => StoreError::Io(io),
        other => StoreError::Backend(other.to_string()),
    }
}
