//! Relay error types.

use thiserror::Error;

/// Maximum number of characters of an error body echoed back to the user.
pub const ERROR_BODY_EXCERPT_CHARS: usize = 200;

/// Static remediation checklist appended to every error record.
pub const TROUBLESHOOTING: &str = "Troubleshooting:\n\
    \u{2022} Verify your n8n webhook URL is correct\n\
    \u{2022} Check if your n8n workflow is active\n\
    \u{2022} Ensure CORS is properly configured\n\
    \u{2022} Test your webhook endpoint directly";

/// Error raised by a capability backend (config store, file picker).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend-specific failure
    #[error("Config store error: {0}")]
    Backend(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Relay error type.
#[derive(Error, Debug)]
pub enum RelayError {
    /// No webhook endpoint configured
    #[error("Relay link not established. Configure the webhook URL in settings.")]
    NotConfigured,

    /// Attempt to save a blank webhook URL
    #[error("Webhook URL must not be blank")]
    BlankEndpoint,

    /// Endpoint unreachable, refused, timed out or rejected before a response
    #[error("Network connection failed. Check if your n8n instance is running and accessible.")]
    Network(#[source] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("{}", status_line(.status, .reason, .excerpt))]
    Status {
        status: u16,
        reason: String,
        excerpt: String,
    },

    /// Response body could not be read
    #[error("Could not read the relay response: {0}")]
    Decode(String),

    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    ClientInit(#[source] reqwest::Error),

    /// Capability backend error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Build a status error, keeping only the leading part of the body.
    pub fn status(status: u16, reason: impl Into<String>, body: &str) -> Self {
        Self::Status {
            status,
            reason: reason.into(),
            excerpt: body.chars().take(ERROR_BODY_EXCERPT_CHARS).collect(),
        }
    }

    /// Coarse category used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotConfigured | Self::BlankEndpoint => "configuration",
            Self::Network(_) | Self::Status { .. } => "transport",
            Self::Decode(_) => "decode",
            Self::ClientInit(_) | Self::Store(_) | Self::Io(_) => "local",
        }
    }

    /// Text of the error record shown to the user.
    pub fn report(&self) -> String {
        format!("\u{26a0}\u{fe0f} Relay connection error: {self}\n\n{TROUBLESHOOTING}")
    }
}

fn status_line(status: &u16, reason: &str, excerpt: &str) -> String {
    let mut line = format!("HTTP {status}");
    if !reason.is_empty() {
        line.push(' ');
        line.push_str(reason);
    }
    if !excerpt.is_empty() {
        line.push_str(" - ");
        line.push_str(excerpt);
    }
    line
}

/// Result type alias using RelayError.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_code_reason_and_body() {
        let err = RelayError::status(500, "Internal Server Error", "boom");
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error - boom");
        assert_eq!(err.category(), "transport");
    }

    #[test]
    fn status_error_omits_empty_parts() {
        let err = RelayError::status(599, "", "");
        assert_eq!(err.to_string(), "HTTP 599");
    }

    #[test]
    fn status_error_truncates_long_bodies() {
        let body = "x".repeat(500);
        let RelayError::Status { excerpt, .. } = RelayError::status(502, "Bad Gateway", &body) else {
            panic!("expected status error");
        };
        assert_eq!(excerpt.chars().count(), ERROR_BODY_EXCERPT_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "\u{00e9}".repeat(300);
        let err = RelayError::status(400, "Bad Request", &body);
        assert!(err.to_string().ends_with(&"\u{00e9}".repeat(ERROR_BODY_EXCERPT_CHARS)));
    }

    #[test]
    fn report_carries_diagnostic_and_checklist() {
        let report = RelayError::NotConfigured.report();
        assert!(report.contains("not established"));
        assert!(report.contains("Verify your n8n webhook URL is correct"));
        assert!(report.contains("Check if your n8n workflow is active"));
        assert!(report.contains("Ensure CORS is properly configured"));
        assert!(report.contains("Test your webhook endpoint directly"));
    }

    #[test]
    fn categories_separate_configuration_transport_and_decode() {
        assert_eq!(RelayError::NotConfigured.category(), "configuration");
        assert_eq!(RelayError::Decode("eof".into()).category(), "decode");
    }
}
