//! fal.ai webhook verification.
//!
//! ## Stages
//!
//! ```text
//! headers → timestamp → signature format → key set → Ed25519 verify
//! ```
//!
//! Each stage fails fast with its own [`VerificationError`] variant.

pub mod headers;
pub mod message;
pub mod signature;

use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;

use crate::error::VerificationError;
use crate::jwks::{JwksFetcher, KeyCache, KeyResolver, JWKS_URL};

pub use headers::{
    unix_now, validate_timestamp, WebhookHeaders, REQUEST_ID_HEADER, REQUIRED_HEADERS,
    SIGNATURE_HEADER, TIMESTAMP_HEADER, TIMESTAMP_TOLERANCE_SECS, USER_ID_HEADER,
};
pub use message::{body_digest_hex, canonical_message};
pub use signature::{decode_signature, verify_signature, SIGNATURE_LENGTH};

/// Default cache key for the JWKS document.
pub const DEFAULT_CACHE_KEY: &str = "falai_jwks";

/// Default lifetime of a cached JWKS document.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where keys come from and how long they are cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierSettings {
    pub jwks_url: String,
    pub cache_key: String,
    pub cache_ttl: Duration,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            jwks_url: JWKS_URL.to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// An inbound webhook delivery as received.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

/// Verifies fal.ai webhook deliveries.
///
/// Holds no mutable state of its own; clones share the HTTP client and cache.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    keys: Arc<KeyResolver>,
}

impl WebhookVerifier {
    /// Create a verifier. `cache` may be `None`, in which case every call
    /// fetches the key set.
    pub fn new(
        cache: Option<Arc<dyn KeyCache>>,
        settings: VerifierSettings,
    ) -> Result<Self, VerificationError> {
        let fetcher = JwksFetcher::new(settings.jwks_url)?;
        let keys = KeyResolver::new(cache, settings.cache_key, settings.cache_ttl, fetcher);

        Ok(Self {
            keys: Arc::new(keys),
        })
    }

    /// Verify a delivery's body and headers.
    ///
    /// `Ok(())` means the request is authentic, fresh and untampered.
    pub async fn verify(&self, body: &[u8], headers: &HeaderMap) -> Result<(), VerificationError> {
        self.verify_at(body, headers, unix_now()).await
    }

    /// [`verify`](Self::verify) for an owned request.
    pub async fn verify_request(&self, request: &WebhookRequest) -> Result<(), VerificationError> {
        self.verify(&request.body, &request.headers).await
    }

    async fn verify_at(
        &self,
        body: &[u8],
        headers: &HeaderMap,
        now: i64,
    ) -> Result<(), VerificationError> {
        let webhook_headers = WebhookHeaders::from_header_map(headers)?;
        validate_timestamp(webhook_headers.timestamp, now)?;

        let signature = decode_signature(webhook_headers.signature)?;
        let message = canonical_message(&webhook_headers, body);

        let keys = self.keys.resolve().await?;
        verify_signature(&message, &signature, &keys)?;

        Ok(())
    }
}
