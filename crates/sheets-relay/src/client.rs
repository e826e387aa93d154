//! Webhook relay client.

use crate::endpoint;
use crate::messages::{self, OutboundMessage};
use crate::reply::{self, DEFAULT_RESPONSE_FIELDS};
use crate::{Attachment, ExchangeRecord, RelayError, RelayResult, Transcript};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

/// Record appended after a successful connectivity probe.
pub const PROBE_CONFIRMATION: &str =
    "\u{2705} Connection test successful! Relay link established.";

/// Relay client configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Request timeout in seconds, applied to probes and sends alike.
    pub request_timeout_secs: u64,
    /// JSON reply fields searched for readable text, in priority order.
    pub response_fields: Vec<String>,
    /// Append a confirmation record when a probe succeeds.
    pub announce_probe_success: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            response_fields: DEFAULT_RESPONSE_FIELDS
                .iter()
                .map(|field| field.to_string())
                .collect(),
            announce_probe_success: true,
        }
    }
}

/// Connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Testing,
    Connected,
}

impl ConnectionStatus {
    /// Short badge text for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "OFFLINE",
            Self::Testing => "TESTING...",
            Self::Connected => "LINKED",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Testing => "testing",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// Events emitted by the relay client.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// Connection status moved to a new value.
    StatusChanged(ConnectionStatus),
    /// A record was appended to the transcript.
    RecordAppended(ExchangeRecord),
}

/// Result of [`RelayClient::send`].
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Message was blank; nothing happened.
    EmptyMessage,
    /// Another send is still in flight; nothing happened.
    InFlight,
    /// The webhook replied; carries the appended reply record.
    Replied(ExchangeRecord),
    /// The exchange failed; carries the appended error record.
    Failed(ExchangeRecord),
}

impl SendOutcome {
    /// The record appended in response to the user message, if any.
    pub fn record(&self) -> Option<&ExchangeRecord> {
        match self {
            Self::Replied(record) | Self::Failed(record) => Some(record),
            Self::EmptyMessage | Self::InFlight => None,
        }
    }
}

/// Result of [`RelayClient::probe`].
#[derive(Debug)]
pub enum ProbeOutcome {
    /// No endpoint configured; status reset without touching the network.
    NotConfigured,
    /// Endpoint answered with a success status.
    Connected,
    /// Probe failed; already logged.
    Failed(RelayError),
}

/// Client that relays chat messages and attachments to a webhook.
///
/// Owns the connection status and the transcript. Only its own operations
/// mutate them; callers read snapshots or subscribe to [`RelayEvent`]s.
pub struct RelayClient {
    config: RelayConfig,
    http: reqwest::Client,
    status: RwLock<ConnectionStatus>,
    transcript: RwLock<Transcript>,
    send_gate: Mutex<()>,
    event_tx: broadcast::Sender<RelayEvent>,
}

impl RelayClient {
    /// Create a new relay client with the given configuration.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(RelayError::ClientInit)?;
        let (event_tx, _) = broadcast::channel(100);

        Ok(Self {
            config,
            http,
            status: RwLock::new(ConnectionStatus::Disconnected),
            transcript: RwLock::new(Transcript::new()),
            send_gate: Mutex::new(()),
            event_tx,
        })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> RelayResult<Self> {
        Self::new(RelayConfig::default())
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Subscribe to relay events.
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current connection status.
    pub async fn status(&self) -> ConnectionStatus {
        *self.status.read().await
    }

    pub async fn is_connected(&self) -> bool {
        self.status().await == ConnectionStatus::Connected
    }

    /// Snapshot of the transcript in append order.
    pub async fn transcript(&self) -> Vec<ExchangeRecord> {
        self.transcript.read().await.records().to_vec()
    }

    /// Append a relay-authored note (greetings and the like).
    pub async fn announce(&self, content: impl Into<String>) -> ExchangeRecord {
        let record = ExchangeRecord::relay(content);
        self.append(record.clone()).await;
        record
    }

    /// Forget connectivity after the endpoint configuration was cleared.
    pub async fn reset(&self) {
        self.set_status(ConnectionStatus::Disconnected).await;
    }

    /// Check that the endpoint accepts requests.
    ///
    /// Failures only change the status and are logged; they never add a record.
    /// On success the confirmation is appended once no send is in flight.
    pub async fn probe(&self, endpoint: Option<&str>) -> ProbeOutcome {
        let Some(url) = endpoint::configured(endpoint) else {
            self.set_status(ConnectionStatus::Disconnected).await;
            return ProbeOutcome::NotConfigured;
        };

        self.set_status(ConnectionStatus::Testing).await;
        debug!(endpoint = %redact(url), "Probing webhook");

        match self.try_probe(url).await {
            Ok(()) => {
                // Wait out any in-flight send so its user/reply pair stays adjacent.
                let _pair_boundary = self.send_gate.lock().await;
                self.set_status(ConnectionStatus::Connected).await;
                if self.config.announce_probe_success {
                    self.announce(PROBE_CONFIRMATION).await;
                }
                info!(endpoint = %redact(url), "Webhook probe succeeded");
                ProbeOutcome::Connected
            }
            Err(e) => {
                self.set_status(ConnectionStatus::Disconnected).await;
                warn!(
                    endpoint = %redact(url),
                    category = e.category(),
                    error = %e,
                    "Webhook probe failed"
                );
                ProbeOutcome::Failed(e)
            }
        }
    }

    /// Relay one user message and its attachments.
    ///
    /// The user record is appended before the request is issued; exactly one
    /// reply or error record follows it. Overlapping sends are refused.
    pub async fn send(
        &self,
        text: &str,
        attachments: &[Attachment],
        endpoint: Option<&str>,
    ) -> SendOutcome {
        self.send_looked_up(text, attachments, Ok(endpoint)).await
    }

    /// Like [`send`](Self::send), for callers whose endpoint lookup may have
    /// failed. A lookup error becomes the error record of the exchange.
    pub async fn send_looked_up(
        &self,
        text: &str,
        attachments: &[Attachment],
        endpoint: RelayResult<Option<&str>>,
    ) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::EmptyMessage;
        }

        let Ok(_in_flight) = self.send_gate.try_lock() else {
            debug!("Send refused, previous message still in flight");
            return SendOutcome::InFlight;
        };

        self.append(ExchangeRecord::user(text)).await;

        match self.deliver(text, attachments, endpoint).await {
            Ok(content) => {
                let record = ExchangeRecord::relay(content);
                self.append(record.clone()).await;
                self.set_status(ConnectionStatus::Connected).await;
                SendOutcome::Replied(record)
            }
            Err(e) => {
                warn!(category = e.category(), error = %e, "Relay send failed");
                let record = ExchangeRecord::failure(e.report());
                self.append(record.clone()).await;
                self.set_status(ConnectionStatus::Disconnected).await;
                SendOutcome::Failed(record)
            }
        }
    }

    async fn try_probe(&self, url: &str) -> RelayResult<()> {
        let response = self
            .http
            .post(url)
            .header("X-Requested-With", messages::REQUESTED_WITH_PROBE)
            .multipart(messages::probe_form())
            .send()
            .await
            .map_err(RelayError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                &body,
            ));
        }
        Ok(())
    }

    async fn deliver(
        &self,
        text: &str,
        attachments: &[Attachment],
        endpoint: RelayResult<Option<&str>>,
    ) -> RelayResult<String> {
        let url = endpoint::configured(endpoint?).ok_or(RelayError::NotConfigured)?;
        let message = OutboundMessage::new(text, attachments);

        debug!(
            endpoint = %redact(url),
            files = attachments.len(),
            session_id = %message.session_id(),
            "Sending message to webhook"
        );

        let response = self
            .http
            .post(url)
            .header("X-Requested-With", messages::REQUESTED_WITH_MESSAGE)
            .header(ACCEPT, messages::ACCEPT)
            .multipart(message.into_form())
            .send()
            .await
            .map_err(RelayError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                &body,
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::Decode(e.to_string()))?;

        debug!(
            status = status.as_u16(),
            content_type = ?content_type,
            bytes = body.len(),
            "Webhook replied"
        );

        Ok(reply::interpret(
            content_type.as_deref(),
            &body,
            &self.config.response_fields,
        ))
    }

    async fn append(&self, record: ExchangeRecord) {
        self.transcript.write().await.append(record.clone());
        let _ = self.event_tx.send(RelayEvent::RecordAppended(record));
    }

    async fn set_status(&self, next: ConnectionStatus) {
        let mut status = self.status.write().await;
        if *status != next {
            let previous = *status;
            debug!(from = %previous, to = %next, "Connection status changed");
            *status = next;
            let _ = self.event_tx.send(RelayEvent::StatusChanged(next));
        }
    }
}

/// Scheme and host only; webhook paths often embed secrets.
fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{}://{}", parsed.scheme(), host),
            None => parsed.scheme().to_string(),
        },
        Err(_) => "<malformed>".to_string(),
    }
}
