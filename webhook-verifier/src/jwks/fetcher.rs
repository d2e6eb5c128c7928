//! Remote JWKS retrieval.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::VerificationError;

/// fal.ai's key-distribution endpoint.
pub const JWKS_URL: &str = "https://rest.alpha.fal.ai/.well-known/jwks.json";

/// Upper bound on a single JWKS request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifies this client to the JWKS endpoint.
pub const USER_AGENT: &str = concat!("fal-webhook/", env!("CARGO_PKG_VERSION"), " (Rust)");

/// Fetches the raw JWKS document over HTTP.
#[derive(Debug, Clone)]
pub struct JwksFetcher {
    client: Client,
    url: String,
    timeout: Duration,
}

impl JwksFetcher {
    /// Create a fetcher for `url` bounded by [`FETCH_TIMEOUT`].
    pub fn new(url: impl Into<String>) -> Result<Self, VerificationError> {
        Self::with_timeout(url, FETCH_TIMEOUT)
    }

    /// Create a fetcher for `url` with its own HTTP client and request bound.
    pub fn with_timeout(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VerificationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VerificationError::jwks(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    /// GET the document and parse it as JSON.
    ///
    /// Transport errors, timeouts, non-2xx statuses and invalid JSON all
    /// come back as [`VerificationError::Jwks`].
    pub async fn fetch(&self) -> Result<Value, VerificationError> {
        debug!(url = %self.url, "jwks_fetch_starting");

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status().as_u16();
        let document: Value = response.json().await.map_err(|e| self.fetch_error(e))?;

        debug!(url = %self.url, status_code = status, "jwks_fetch_complete");

        Ok(document)
    }

    fn fetch_error(&self, e: reqwest::Error) -> VerificationError {
        let cause = if e.is_timeout() {
            format!("request timed out after {}ms", self.timeout.as_millis())
        } else {
            e.to_string()
        };

        VerificationError::jwks(format!("Failed to fetch JWKS: {}", cause))
    }
}
