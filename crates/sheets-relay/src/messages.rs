//! Outbound webhook payloads.
//!
//! Every request is a multipart form. Text fields come first, followed by one
//! binary part and three descriptor fields per attachment, keyed by the
//! attachment's zero-based index.

use crate::attachment::{Attachment, FALLBACK_MEDIA_TYPE};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};

/// Body of the connectivity probe.
pub const PROBE_MESSAGE: &str = "Connection test";

/// `X-Requested-With` value for real messages.
pub const REQUESTED_WITH_MESSAGE: &str = "SheetsManager-AI";
/// `X-Requested-With` value for connectivity probes.
pub const REQUESTED_WITH_PROBE: &str = "SheetsManager-Test";
/// `Accept` header sent with real messages.
pub const ACCEPT: &str = "application/json, text/plain, */*";

/// A user message with its attachments, ready to be sent once.
#[derive(Debug, Clone)]
pub struct OutboundMessage<'a> {
    text: &'a str,
    attachments: &'a [Attachment],
    created_at: DateTime<Utc>,
}

impl<'a> OutboundMessage<'a> {
    pub fn new(text: &'a str, attachments: &'a [Attachment]) -> Self {
        Self::at(text, attachments, Utc::now())
    }

    /// Build with an explicit creation time.
    pub fn at(text: &'a str, attachments: &'a [Attachment], created_at: DateTime<Utc>) -> Self {
        Self {
            text,
            attachments,
            created_at,
        }
    }

    /// ISO-8601 timestamp with millisecond precision.
    pub fn timestamp(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Per-send session identifier derived from the creation time.
    pub fn session_id(&self) -> String {
        format!("session_{}", self.created_at.timestamp_millis())
    }

    /// Leading text fields, before any attachment.
    fn header_fields(&self) -> [(&'static str, String); 4] {
        [
            ("message", self.text.to_string()),
            ("fileCount", self.attachments.len().to_string()),
            ("timestamp", self.timestamp()),
            ("sessionId", self.session_id()),
        ]
    }

    /// Assemble the multipart form.
    pub fn into_form(self) -> Form {
        let mut form = self
            .header_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        for (index, attachment) in self.attachments.iter().enumerate() {
            form = form.part(format!("file_{index}"), file_part(attachment));
            for (name, value) in descriptor_fields(index, attachment) {
                form = form.text(name, value);
            }
        }
        form
    }
}

/// Fields of the connectivity probe.
pub fn probe_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("message", PROBE_MESSAGE),
        ("fileCount", "0"),
        ("test", "true"),
    ]
}

/// Multipart form for the connectivity probe.
pub fn probe_form() -> Form {
    probe_fields()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}

fn descriptor_fields(index: usize, attachment: &Attachment) -> [(String, String); 3] {
    [
        (format!("fileName_{index}"), attachment.name().to_string()),
        (format!("fileSize_{index}"), attachment.size().to_string()),
        (format!("fileType_{index}"), attachment.media_type().to_string()),
    ]
}

fn untyped_part(attachment: &Attachment) -> Part {
    let body = reqwest::Body::from(attachment.content().clone());
    Part::stream_with_length(body, attachment.size()).file_name(attachment.name().to_string())
}

fn file_part(attachment: &Attachment) -> Part {
    let part = untyped_part(attachment);

    let media_type = match attachment.media_type().trim() {
        "" => FALLBACK_MEDIA_TYPE,
        declared => declared,
    };
    match part.mime_str(media_type) {
        Ok(part) => part,
        Err(e) => {
            tracing::debug!(
                name = %attachment.name(),
                media_type = %media_type,
                error = %e,
                "Declared media type rejected, sending untyped part"
            );
            untyped_part(attachment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    #[test]
    fn timestamp_is_iso8601_with_millis() {
        let msg = OutboundMessage::at("hi", &[], fixed_time());
        assert_eq!(msg.timestamp(), "2024-05-17T09:30:00.000Z");
    }

    #[test]
    fn session_id_uses_epoch_millis() {
        let msg = OutboundMessage::at("hi", &[], fixed_time());
        assert_eq!(msg.session_id(), "session_1715938200000");
    }

    #[test]
    fn header_fields_without_attachments() {
        let msg = OutboundMessage::at("Summarize this", &[], fixed_time());
        let fields = msg.header_fields();
        let names: Vec<_> = fields.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["message", "fileCount", "timestamp", "sessionId"]);
        assert_eq!(fields[0].1, "Summarize this");
        assert_eq!(fields[1].1, "0");
    }

    #[test]
    fn descriptor_fields_follow_attachment_order() {
        let attachments = vec![
            Attachment::new("jan.csv", "text/csv", "a,b\n"),
            Attachment::new("feb.xlsx", "", vec![0u8; 10]),
        ];
        let msg = OutboundMessage::at("compare", &attachments, fixed_time());
        assert_eq!(msg.header_fields()[1].1, "2");

        let fields: Vec<_> = attachments
            .iter()
            .enumerate()
            .flat_map(|(index, attachment)| descriptor_fields(index, attachment))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("fileName_0".to_string(), "jan.csv".to_string()),
                ("fileSize_0".to_string(), "4".to_string()),
                ("fileType_0".to_string(), "text/csv".to_string()),
                ("fileName_1".to_string(), "feb.xlsx".to_string()),
                ("fileSize_1".to_string(), "10".to_string()),
                ("fileType_1".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn probe_marks_itself_as_test() {
        let fields = probe_fields();
        assert!(fields.contains(&("test", "true")));
        assert!(fields.contains(&("fileCount", "0")));
        assert!(fields.contains(&("message", PROBE_MESSAGE)));
    }

    #[test]
    fn form_has_a_boundary() {
        let attachments = vec![Attachment::new("a.csv", "text/csv", "x")];
        let form = OutboundMessage::new("hi", &attachments).into_form();
        assert!(!form.boundary().is_empty());
    }
}
