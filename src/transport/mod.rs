//! HTTP transport: one streamed POST per conversion, with a timeout scaled to the text size.

mod http;

pub(crate) use http::classify_status;
pub use http::{HttpTransport, StreamingResponse};

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e)
        } else if e.is_connect() {
            TransportError::Connect(e)
        } else {
            TransportError::Http(e)
        }
    }
}

/// Whole-request timeout budget.
///
/// `timeout = base + min(max_extra, (chars / 1000) * per_thousand_chars)`. The budget covers
/// connecting, sending and draining the entire streamed body; no per-chunk timeout exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub base: Duration,
    pub max_extra: Duration,
    pub per_thousand_chars: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(60),
            max_extra: Duration::from_secs(240),
            per_thousand_chars: Duration::from_secs(10),
        }
    }
}

impl TimeoutPolicy {
    pub fn for_char_count(&self, char_count: usize) -> Duration {
        let thousands = u32::try_from(char_count / 1000).unwrap_or(u32::MAX);
        let extra = self
            .per_thousand_chars
            .checked_mul(thousands)
            .unwrap_or(self.max_extra)
            .min(self.max_extra);
        self.base + extra
    }
}
