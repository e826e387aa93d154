//! Conversation transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Relay,
}

/// One entry in the conversation: user input, relay reply or synthesized error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub error: bool,
}

impl ExchangeRecord {
    fn new(sender: Sender, content: impl Into<String>, error: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            error,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content, false)
    }

    pub fn relay(content: impl Into<String>) -> Self {
        Self::new(Sender::Relay, content, false)
    }

    /// An error-flagged record, rendered differently by front ends.
    pub fn failure(content: impl Into<String>) -> Self {
        Self::new(Sender::Relay, content, true)
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Append-only, ordered sequence of exchange records.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    records: Vec<ExchangeRecord>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: ExchangeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ExchangeRecord] {
        &self.records
    }
}
