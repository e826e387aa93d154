//! Endpoint configuration helpers.
//!
//! The relay never refuses a malformed URL on its own; these helpers only
//! decide whether an endpoint is present and give feedback to whoever edits it.

use url::Url;

/// Return the endpoint if it is set to something other than whitespace.
pub fn configured(endpoint: Option<&str>) -> Option<&str> {
    endpoint.map(str::trim).filter(|url| !url.is_empty())
}

/// Syntactic feedback for an endpoint entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointCheck {
    /// Parses as an absolute http(s) URL.
    WellFormed(Url),
    /// Parses, but with a scheme the webhook transport cannot use.
    UnsupportedScheme(String),
    /// Does not parse as a URL at all.
    Malformed(String),
}

impl EndpointCheck {
    pub fn is_well_formed(&self) -> bool {
        matches!(self, Self::WellFormed(_))
    }

    /// One-line description for display next to the settings field.
    pub fn describe(&self) -> String {
        match self {
            Self::WellFormed(url) => format!("{} looks like a valid webhook URL", url),
            Self::UnsupportedScheme(scheme) => {
                format!("scheme '{}' is not supported, use http or https", scheme)
            }
            Self::Malformed(reason) => format!("not a valid URL: {}", reason),
        }
    }
}

/// Check the syntax of an endpoint URL.
pub fn check(raw: &str) -> EndpointCheck {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => EndpointCheck::WellFormed(url),
        Ok(url) => EndpointCheck::UnsupportedScheme(url.scheme().to_string()),
        Err(e) => EndpointCheck::Malformed(e.to_string()),
    }
}
