// src/webhook/destination.rs

use std::fmt;

use url::Url;

/// One URL to notify, with the request settings that apply to it.
///
/// Method, expected status and retries usually come from the run-wide
/// `[webhook]` settings but may be overridden per destination.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookDestination {
    url: Url,
    method: String,
    expected_status: u16,
    retries: u32,
    label: String,
}

impl WebhookDestination {
    pub fn new(url: Url, method: impl Into<String>, expected_status: u16, retries: u32) -> Self {
        let label = redact_url(&url);
        Self {
            url,
            method: method.into(),
            expected_status,
            retries,
            label,
        }
    }

    /// The configured URL, credentials included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn expected_status(&self) -> u16 {
        self.expected_status
    }

    /// Maximum number of attempts.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// URL with the password masked; used for logs and metric labels.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for WebhookDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookDestination")
            .field("url", &self.label)
            .field("method", &self.method)
            .field("expected_status", &self.expected_status)
            .field("retries", &self.retries)
            .finish()
    }
}

/// Render `url` with any password replaced by `***`.
pub fn redact_url(url: &Url) -> String {
    if url.password().is_none() {
        return url.to_string();
    }
    let mut redacted = url.clone();
    // Only fails for cannot-be-a-base URLs, which have no password anyway.
    let _ = redacted.set_password(Some("***"));
    redacted.to_string()
}
