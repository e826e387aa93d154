//! Spreadsheet attachments forwarded to the webhook.

use bytes::Bytes;

/// Media types accepted as spreadsheets.
pub const SPREADSHEET_MEDIA_TYPES: [&str; 3] = [
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// File name extensions accepted as spreadsheets.
pub const SPREADSHEET_EXTENSIONS: [&str; 3] = [".csv", ".xls", ".xlsx"];

/// Media type sent when the picker could not declare one.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// An immutable file attached to a chat message.
///
/// Cloning is cheap: the content is reference counted and never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    media_type: String,
    content: Bytes,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type, possibly empty.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Whether this file would be accepted by the upload picker.
    pub fn is_spreadsheet(&self) -> bool {
        is_spreadsheet(&self.name, &self.media_type)
    }
}

/// Extension/MIME sniffing used by the picker. Nothing else is validated.
pub fn is_spreadsheet(name: &str, media_type: &str) -> bool {
    let media_type = media_type.trim().to_ascii_lowercase();
    if SPREADSHEET_MEDIA_TYPES.contains(&media_type.as_str()) {
        return true;
    }
    let name = name.to_ascii_lowercase();
    SPREADSHEET_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Keep only spreadsheets, preserving order.
pub fn accept_spreadsheets(candidates: Vec<Attachment>) -> Vec<Attachment> {
    candidates
        .into_iter()
        .filter(|attachment| {
            let accepted = attachment.is_spreadsheet();
            if !accepted {
                tracing::debug!(
                    name = %attachment.name(),
                    media_type = %attachment.media_type(),
                    "Ignoring non-spreadsheet file"
                );
            }
            accepted
        })
        .collect()
}
