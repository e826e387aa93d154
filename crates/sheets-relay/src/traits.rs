//! Capability interfaces the relay needs from its host environment.

use crate::{Attachment, StoreError};
use std::sync::RwLock;

/// Key under which the endpoint URL is persisted.
pub const ENDPOINT_KEY: &str = "n8n_url";

/// Persistence for the webhook endpoint.
pub trait ConfigStore: Send + Sync {
    /// Read the stored endpoint, if any.
    fn load_endpoint(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored endpoint.
    fn save_endpoint(&self, url: &str) -> Result<(), StoreError>;

    /// Remove the stored endpoint.
    fn clear_endpoint(&self) -> Result<(), StoreError>;
}

/// Source of candidate attachments (a file dialog, a drop zone, CLI paths).
///
/// Implementations return everything the user offered; filtering down to
/// spreadsheets is done by the caller.
pub trait FilePicker: Send + Sync {
    fn pick(&self) -> std::io::Result<Vec<Attachment>>;
}

/// Process-local store, used by tests and embedders without persistence.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    endpoint: RwLock<Option<String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(url: impl Into<String>) -> Self {
        Self {
            endpoint: RwLock::new(Some(url.into())),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load_endpoint(&self) -> Result<Option<String>, StoreError> {
        let guard = self
            .endpoint
            .read()
            .map_err(|_| StoreError::Backend("endpoint lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save_endpoint(&self, url: &str) -> Result<(), StoreError> {
        let mut guard = self
            .endpoint
            .write()
            .map_err(|_| StoreError::Backend("endpoint lock poisoned".to_string()))?;
        *guard = Some(url.to_string());
        Ok(())
    }

    fn clear_endpoint(&self) -> Result<(), StoreError> {
        let mut guard = self
            .endpoint
            .write()
            .map_err(|_| StoreError::Backend("endpoint lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Picker over a fixed list of in-memory attachments.
#[derive(Debug, Clone, Default)]
pub struct StaticFilePicker {
    attachments: Vec<Attachment>,
}

impl StaticFilePicker {
    pub fn new(attachments: Vec<Attachment>) -> Self {
        Self { attachments }
    }
}

impl FilePicker for StaticFilePicker {
    fn pick(&self) -> std::io::Result<Vec<Attachment>> {
        Ok(self.attachments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.load_endpoint().unwrap(), None);

        store.save_endpoint("https://n8n.example.com/webhook/a").unwrap();
        assert_eq!(
            store.load_endpoint().unwrap().as_deref(),
            Some("https://n8n.example.com/webhook/a")
        );

        store.clear_endpoint().unwrap();
        assert_eq!(store.load_endpoint().unwrap(), None);
    }

    #[test]
    fn static_picker_returns_everything() {
        let picker = StaticFilePicker::new(vec![
            Attachment::new("a.csv", "text/csv", "1"),
            Attachment::new("b.txt", "text/plain", "2"),
        ]);
        assert_eq!(picker.pick().unwrap().len(), 2);
    }
}
