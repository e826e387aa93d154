//! Webhook relay client for SheetsManager.
//!
//! This crate provides:
//! - Multipart relay of chat messages and spreadsheet attachments to an n8n webhook
//! - Connectivity probing with a disconnected/testing/connected status
//! - An append-only transcript of user messages, replies and errors
//! - Capability traits for endpoint persistence and file picking

pub mod attachment;
mod client;
pub mod endpoint;
mod error;
pub mod messages;
mod picker;
pub mod reply;
mod session;
mod traits;
mod transcript;

pub use attachment::Attachment;
pub use client::{
    ConnectionStatus, ProbeOutcome, RelayClient, RelayConfig, RelayEvent, SendOutcome,
    PROBE_CONFIRMATION,
};
pub use endpoint::EndpointCheck;
pub use error::{RelayError, RelayResult, StoreError, TROUBLESHOOTING};
pub use picker::{read_attachment, PathFilePicker};
pub use reply::EMPTY_REPLY_PLACEHOLDER;
pub use session::{SheetsSession, GREETING};
pub use traits::{ConfigStore, FilePicker, MemoryConfigStore, StaticFilePicker, ENDPOINT_KEY};
pub use transcript::{ExchangeRecord, Sender, Transcript};
