//! Key-set cache capability.
//!
//! The verifier takes an optional [`KeyCache`] and uses it cache-aside: read
//! first, write back after a successful fetch. Expiry is entirely the
//! implementation's business.

use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;
use serde_json::Value;
use thiserror::Error;

/// Longest TTL [`MemoryKeyCache`] accepts.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Entries held by [`MemoryKeyCache`]. Only a handful of key sets are ever cached.
const MAX_ENTRIES: u64 = 64;

/// Error writing to a [`KeyCache`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// A key-value store for the raw JWKS document.
///
/// Implementations must be safe to share between tasks.
pub trait KeyCache: Send + Sync {
    /// Return the stored value, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct CachedDocument {
    document: Value,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedDocument> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedDocument,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedDocument,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache with per-entry expiry, backed by `moka`.
#[derive(Clone)]
pub struct MemoryKeyCache {
    entries: Cache<String, CachedDocument>,
}

impl MemoryKeyCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryKeyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryKeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyCache")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

impl KeyCache for MemoryKeyCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.document)
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        if ttl > MAX_TTL {
            return Err(CacheError::Unavailable(format!("ttl out of range: {:?}", ttl)));
        }

        self.entries.insert(
            key.to_string(),
            CachedDocument {
                document: value,
                ttl,
            },
        );
        Ok(())
    }
}
