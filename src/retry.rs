//! Rate limit retry policy.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Default number of 429 retries allowed for a single call.
pub const DEFAULT_MAX_RETRIES: u32 = 20;

/// Delay used when the server omits `Retry-After` or sends garbage.
const FALLBACK_DELAY_SECS: u64 = 1;

/// How the client reacts to HTTP 429 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retries per call. `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Some(DEFAULT_MAX_RETRIES),
        }
    }
}

impl RetryPolicy {
    /// Retry every 429 without a ceiling.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { max_retries: None }
    }

    /// Allow at most `max_retries` retries per call.
    #[must_use]
    pub fn bounded(max_retries: u32) -> Self {
        Self {
            max_retries: Some(max_retries),
        }
    }

    /// Whether another retry is allowed after `attempts` retries so far.
    #[must_use]
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts < max)
    }
}

/// Read the `Retry-After` header as whole seconds.
///
/// Falls back to one second when the header is absent or not an integer.
pub fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(FALLBACK_DELAY_SECS);
    Duration::from_secs(secs)
}
