//! JWKS key-set resolution.
//!
//! ## Flow
//!
//! ```text
//! cache hit  → extract                     → Vec<PublicKey>
//! cache miss → fetch → cache set → extract → Vec<PublicKey>
//! ```

pub mod cache;
pub mod fetcher;
pub mod keys;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::VerificationError;

pub use cache::{CacheError, KeyCache, MemoryKeyCache};
pub use fetcher::{JwksFetcher, FETCH_TIMEOUT, JWKS_URL, USER_AGENT};
pub use keys::extract_public_keys;

/// Raw Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Resolves the current key set, cache first.
#[derive(Clone)]
pub struct KeyResolver {
    cache: Option<Arc<dyn KeyCache>>,
    cache_key: String,
    cache_ttl: Duration,
    fetcher: JwksFetcher,
}

impl KeyResolver {
    pub fn new(
        cache: Option<Arc<dyn KeyCache>>,
        cache_key: String,
        cache_ttl: Duration,
        fetcher: JwksFetcher,
    ) -> Self {
        Self {
            cache,
            cache_key,
            cache_ttl,
            fetcher,
        }
    }

    /// Return the usable keys, fetching the document on a cache miss.
    ///
    /// Every successfully fetched document is written back before keys are
    /// extracted. Cache write failures are logged and ignored.
    pub async fn resolve(&self) -> Result<Vec<PublicKey>, VerificationError> {
        if let Some(document) = self.cached_document() {
            debug!(cache_key = %self.cache_key, "jwks_cache_hit");
            return extract_public_keys(&document);
        }

        debug!(
            cache_key = %self.cache_key,
            cache_configured = self.cache.is_some(),
            "jwks_cache_miss"
        );

        let document = self.fetcher.fetch().await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&self.cache_key, document.clone(), self.cache_ttl) {
                warn!(cache_key = %self.cache_key, error = %e, "jwks_cache_write_failed");
            }
        }

        extract_public_keys(&document)
    }

    /// A cached JSON object or array, if any. Scalars count as a miss.
    fn cached_document(&self) -> Option<Value> {
        self.cache
            .as_ref()?
            .get(&self.cache_key)
            .filter(|v| v.is_object() || v.is_array())
    }
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("cache_configured", &self.cache.is_some())
            .field("cache_key", &self.cache_key)
            .field("cache_ttl", &self.cache_ttl)
            .field("fetcher", &self.fetcher)
            .finish()
    }
}
