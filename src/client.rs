//! Space API client.
//!
//! Low-level HTTP client that handles authentication, rate limiting and raw
//! JSON requests. Snapshot orchestration lives in [`crate::SnapshotPipeline`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::{Result, SnapshotError};
use crate::retry::{self, RetryPolicy};

const DEFAULT_API_URL: &str = "https://deta.space/api/v0";
const USER_AGENT: &str = concat!("space-snapshots/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the access token.
pub const TOKEN_ENV: &str = "SPACE_ACCESS_TOKEN";

/// Older token variable, read when [`TOKEN_ENV`] is unset.
pub const LEGACY_TOKEN_ENV: &str = "DETA_ACCESS_TOKEN";

/// Total time allowed for a JSON API call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

const ARCHIVE_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const ARCHIVE_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "SPACE_API_URL";

/// Low-level Space API client.
///
/// Every call goes through [`SpaceClient::call`], which retries on HTTP 429
/// using the server supplied `Retry-After` delay and hands back the parsed
/// JSON body whatever the status code.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use space_snapshots::SpaceClient;
///
/// # async fn example() -> space_snapshots::Result<()> {
/// // Create from environment variables
/// let client = SpaceClient::from_env()?;
///
/// // Or configure manually
/// let client = SpaceClient::new("your-token", "https://deta.space/api/v0")?;
/// let horizons = client.call("/horizons?per_page=1000", reqwest::Method::GET, None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SpaceClient {
    http: Client,
    archive_http: Client,
    base_url: Arc<Url>,
    token: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for SpaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SpaceClient {
    /// Create a client from environment variables.
    ///
    /// Uses `SPACE_ACCESS_TOKEN` (or `DETA_ACCESS_TOKEN`) for authentication
    /// and optionally `SPACE_API_URL` for the base URL. A missing token is
    /// not an error: the client is built with an empty token and the remote
    /// service rejects its calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn from_env() -> Result<Self> {
        let token = token_from(|key| env::var(key).ok()).unwrap_or_else(|| {
            tracing::warn!("{TOKEN_ENV} and {LEGACY_TOKEN_ENV} are not set, requests will be unauthenticated");
            String::new()
        });

        let base_url = env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(&token, &base_url)
    }

    /// Create a new client with the provided token and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Self::with_request_timeout(token, base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client whose JSON calls time out after `timeout`.
    ///
    /// Archive downloads are not bound by this total timeout; they only
    /// fail on a slow connect or a stalled read.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_request_timeout(token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)
            .map_err(|e| SnapshotError::ConfigMissing(format!("invalid API URL '{base_url}': {e}")))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(|e| SnapshotError::ConfigMissing(e.to_string()))?;

        let archive_http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(ARCHIVE_CONNECT_TIMEOUT)
            .read_timeout(ARCHIVE_READ_TIMEOUT)
            .build()
            .map_err(|e| SnapshotError::ConfigMissing(e.to_string()))?;

        Ok(Self {
            http,
            archive_http,
            base_url: Arc::new(base_url),
            token: token.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the rate limit retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Issue an API request and return the parsed JSON body.
    ///
    /// A 429 response is retried after the `Retry-After` delay. Any other
    /// status is decoded and returned as-is; interpreting error payloads is
    /// up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::FetchFailed`] on any transport or decode
    /// fault and [`SnapshotError::RateLimited`] once the retry policy is
    /// exhausted.
    #[tracing::instrument(skip(self, payload))]
    pub async fn call(&self, path: &str, method: Method, payload: Option<&Value>) -> Result<Value> {
        let url = self.resolve(path).map_err(fetch_failed)?;
        let mut attempts = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&self.token)
                .header(CONTENT_TYPE, "application/json");
            if let Some(body) = payload {
                request = request.json(body);
            }

            let response = request.send().await.map_err(fetch_failed)?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if !self.retry.allows(attempts) {
                    tracing::error!(attempts, "Rate limit retries exhausted for {path}");
                    return Err(SnapshotError::RateLimited { attempts });
                }
                let delay = retry::retry_after(response.headers());
                tracing::info!("Rate limited. Retrying after {} seconds", delay.as_secs());
                tokio::time::sleep(delay).await;
                attempts += 1;
                continue;
            }

            return response.json::<Value>().await.map_err(fetch_failed);
        }
    }

    /// Plain GET for a snapshot archive.
    ///
    /// `file_path` may be absolute or relative to the API base URL. The
    /// token is only sent to the API host. Whatever body comes back is
    /// handed to the caller; a non-2xx answer is only logged, so a bad
    /// archive shows up as a failed extraction.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::FetchFailed`] on transport faults.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_archive(&self, file_path: &str) -> Result<Response> {
        let url = match Url::parse(file_path) {
            Ok(url) => url,
            Err(_) => self.resolve(file_path).map_err(fetch_failed)?,
        };

        let mut request = self.archive_http.get(url.clone());
        if url.host_str() == self.base_url.host_str() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await.map_err(fetch_failed)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{url} returned HTTP {status}, saving body anyway");
        }

        Ok(response)
    }

    /// Join an API path onto the base URL, keeping the base path prefix.
    fn resolve(&self, path: &str) -> core::result::Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

/// Pick the access token, preferring [`TOKEN_ENV`] over [`LEGACY_TOKEN_ENV`].
///
/// Empty values count as unset.
fn token_from<F: Fn(&str) -> Option<String>>(lookup: F) -> Option<String> {
    [TOKEN_ENV, LEGACY_TOKEN_ENV]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|token| !token.is_empty())
}

fn fetch_failed<E: std::fmt::Display>(err: E) -> SnapshotError {
    tracing::error!("{err}");
    SnapshotError::FetchFailed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_shows_retry_policy_but_not_token() {
        let client = SpaceClient::new("test-token", "https://deta.space/api/v0")
            .unwrap()
            .with_retry_policy(RetryPolicy::bounded(3));
        let debug = format!("{:?}", client);
        assert!(debug.contains("max_retries: Some(3)"));
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_resolve_keeps_base_path() {
        for base in ["https://deta.space/api/v0", "https://deta.space/api/v0/"] {
            let client = SpaceClient::new("token", base).unwrap();
            let url = client.resolve("/horizons?per_page=1000").unwrap();
            assert_eq!(url.as_str(), "https://deta.space/api/v0/horizons?per_page=1000");
        }
    }

    #[test]
    fn test_token_falls_back_to_legacy_variable() {
        let legacy_only = |key: &str| (key == LEGACY_TOKEN_ENV).then(|| "deta-token".to_string());
        assert_eq!(token_from(legacy_only).as_deref(), Some("deta-token"));

        let both = |key: &str| {
            Some(if key == TOKEN_ENV { "space-token" } else { "deta-token" }.to_string())
        };
        assert_eq!(token_from(both).as_deref(), Some("space-token"));

        let empty_primary = |key: &str| {
            Some(if key == TOKEN_ENV { "" } else { "deta-token" }.to_string())
        };
        assert_eq!(token_from(empty_primary).as_deref(), Some("deta-token"));

        assert_eq!(token_from(|_| None), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = SpaceClient::new("token", "not a url").unwrap_err();
        assert!(matches!(err, SnapshotError::ConfigMissing(_)));
    }
}
