//! Headless session shell around the relay.
//!
//! Ties the relay client to a [`ConfigStore`] and the list of uploaded files,
//! the way a front end would: the endpoint is loaded once, saved endpoints are
//! probed immediately, and every message carries all current attachments.

use crate::attachment::accept_spreadsheets;
use crate::endpoint::{self, EndpointCheck};
use crate::{
    Attachment, ConfigStore, ExchangeRecord, FilePicker, ProbeOutcome, RelayClient, RelayError,
    RelayResult, SendOutcome,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// First record of every transcript.
pub const GREETING: &str = "\u{1f4ca} SheetsManager assistant ready. Upload CSV or Excel files \
    and ask a question; your files and message are forwarded to your n8n workflow.";

/// A single user's conversation with the configured webhook.
pub struct SheetsSession {
    store: Arc<dyn ConfigStore>,
    relay: Arc<RelayClient>,
    attachments: RwLock<Vec<Attachment>>,
    startup_probe: Mutex<Option<JoinHandle<()>>>,
}

impl SheetsSession {
    /// Session over `store` with an empty transcript and no startup probe.
    pub fn new(store: Arc<dyn ConfigStore>, relay: RelayClient) -> Self {
        Self {
            store,
            relay: Arc::new(relay),
            attachments: RwLock::new(Vec::new()),
            startup_probe: Mutex::new(None),
        }
    }

    /// Start a session: greet, then probe the stored endpoint in the background.
    ///
    /// Returns without waiting for the webhook; see [`settled`](Self::settled).
    pub async fn open(store: Arc<dyn ConfigStore>, relay: RelayClient) -> Self {
        let session = Self::new(store, relay);
        session.relay.announce(GREETING).await;

        match session.endpoint() {
            Ok(Some(url)) => {
                let relay = Arc::clone(&session.relay);
                let handle = tokio::spawn(async move {
                    relay.probe(Some(&url)).await;
                });
                *session.startup_probe.lock().await = Some(handle);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Stored endpoint unreadable, skipping startup probe"),
        }
        session
    }

    /// Wait for the startup probe, if one is still running.
    pub async fn settled(&self) {
        let handle = self.startup_probe.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Startup probe task failed");
            }
        }
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    /// Stored endpoint, blank values treated as absent.
    pub fn endpoint(&self) -> RelayResult<Option<String>> {
        let stored = self.store.load_endpoint()?;
        Ok(endpoint::configured(stored.as_deref()).map(str::to_owned))
    }

    /// Persist a new endpoint and probe it.
    ///
    /// Blank input is refused. Malformed URLs are saved anyway; the returned
    /// check is feedback only.
    pub async fn save_endpoint(&self, url: &str) -> RelayResult<(EndpointCheck, ProbeOutcome)> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RelayError::BlankEndpoint);
        }

        let check = endpoint::check(url);
        self.store.save_endpoint(url)?;
        info!(well_formed = check.is_well_formed(), "Webhook endpoint saved");

        let outcome = self.relay.probe(Some(url)).await;
        Ok((check, outcome))
    }

    /// Remove the stored endpoint; the relay drops back to disconnected.
    pub async fn clear_endpoint(&self) -> RelayResult<()> {
        self.store.clear_endpoint()?;
        self.relay.reset().await;
        info!("Webhook endpoint cleared");
        Ok(())
    }

    /// Add the spreadsheets offered by `picker`; other files are dropped.
    ///
    /// Returns how many files were accepted.
    pub async fn attach(&self, picker: &dyn FilePicker) -> RelayResult<usize> {
        let accepted = accept_spreadsheets(picker.pick()?);
        let count = accepted.len();
        self.attachments.write().await.extend(accepted);
        Ok(count)
    }

    pub async fn remove_attachment(&self, index: usize) -> Option<Attachment> {
        let mut attachments = self.attachments.write().await;
        (index < attachments.len()).then(|| attachments.remove(index))
    }

    pub async fn clear_attachments(&self) {
        self.attachments.write().await.clear();
    }

    pub async fn attachments(&self) -> Vec<Attachment> {
        self.attachments.read().await.clone()
    }

    /// Send a message with every current attachment to the stored endpoint.
    ///
    /// An unreadable store is reported as the exchange's error record.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let attachments = self.attachments().await;
        match self.endpoint() {
            Ok(endpoint) => self.relay.send(text, &attachments, endpoint.as_deref()).await,
            Err(e) => self.relay.send_looked_up(text, &attachments, Err(e)).await,
        }
    }

    /// Re-test the stored endpoint.
    pub async fn probe(&self) -> ProbeOutcome {
        match self.endpoint() {
            Ok(endpoint) => self.relay.probe(endpoint.as_deref()).await,
            Err(e) => {
                warn!(error = %e, "Stored endpoint unreadable");
                self.relay.reset().await;
                ProbeOutcome::Failed(e)
            }
        }
    }

    pub async fn transcript(&self) -> Vec<ExchangeRecord> {
        self.relay.transcript().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectionStatus, MemoryConfigStore, StaticFilePicker, StoreError};

    async fn open_empty() -> SheetsSession {
        let store = Arc::new(MemoryConfigStore::new());
        SheetsSession::open(store, RelayClient::with_defaults().unwrap()).await
    }

    #[tokio::test]
    async fn transcript_starts_with_greeting() {
        let session = open_empty().await;
        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].content, GREETING);
        assert_eq!(session.relay().status().await, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn attach_keeps_only_spreadsheets() {
        let session = open_empty().await;
        let picker = StaticFilePicker::new(vec![
            Attachment::new("q1.csv", "text/csv", "a"),
            Attachment::new("slides.pptx", "", "b"),
            Attachment::new("q2.xls", "", "c"),
        ]);

        assert_eq!(session.attach(&picker).await.unwrap(), 2);
        let names: Vec<_> = session
            .attachments()
            .await
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        assert_eq!(names, vec!["q1.csv", "q2.xls"]);
    }

    #[tokio::test]
    async fn remove_attachment_by_index() {
        let session = open_empty().await;
        let picker = StaticFilePicker::new(vec![
            Attachment::new("a.csv", "", "1"),
            Attachment::new("b.csv", "", "2"),
        ]);
        session.attach(&picker).await.unwrap();

        let removed = session.remove_attachment(0).await.unwrap();
        assert_eq!(removed.name(), "a.csv");
        assert!(session.remove_attachment(5).await.is_none());
        assert_eq!(session.attachments().await.len(), 1);

        session.clear_attachments().await;
        assert!(session.attachments().await.is_empty());
    }

    #[tokio::test]
    async fn blank_endpoint_cannot_be_saved() {
        let session = open_empty().await;
        assert!(session.save_endpoint("   ").await.is_err());
        assert_eq!(session.endpoint().unwrap(), None);
    }

    #[tokio::test]
    async fn send_without_endpoint_reports_configuration_error() {
        let session = open_empty().await;
        let outcome = session.send("Hello").await;

        let record = outcome.record().unwrap();
        assert!(record.error);
        assert!(record.content.contains("not established"));

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].content, "Hello");
        assert_eq!(session.relay().status().await, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn clearing_endpoint_resets_status() {
        let store = Arc::new(MemoryConfigStore::with_endpoint("http://127.0.0.1:9/hook"));
        let session = SheetsSession::open(store, RelayClient::with_defaults().unwrap()).await;
        session.settled().await;

        session.clear_endpoint().await.unwrap();
        assert_eq!(session.endpoint().unwrap(), None);
        assert_eq!(session.relay().status().await, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn new_session_has_empty_transcript() {
        let store = Arc::new(MemoryConfigStore::with_endpoint("http://127.0.0.1:9/hook"));
        let session = SheetsSession::new(store, RelayClient::with_defaults().unwrap());
        session.settled().await;
        assert!(session.transcript().await.is_empty());
        assert_eq!(session.relay().status().await, ConnectionStatus::Disconnected);
    }

    struct UnreadableStore;

    impl ConfigStore for UnreadableStore {
        fn load_endpoint(&self) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("unreadable".into()))
        }

        fn save_endpoint(&self, _url: &str) -> Result<(), StoreError> {
            Ok(())
        }

        fn clear_endpoint(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn unreadable_store_is_reported_in_transcript() {
        let session =
            SheetsSession::open(Arc::new(UnreadableStore), RelayClient::with_defaults().unwrap())
                .await;

        let record = session.send("Hello").await.record().cloned().unwrap();
        assert!(record.error);
        assert!(record.content.contains("unreadable"));
        assert_eq!(session.transcript().await.len(), 3);

        assert!(matches!(session.probe().await, ProbeOutcome::Failed(_)));
        assert_eq!(session.relay().status().await, ConnectionStatus::Disconnected);
    }
}
