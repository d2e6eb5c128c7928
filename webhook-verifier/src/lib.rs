//! fal-webhook - Authenticity verification for fal.ai webhook deliveries.
//!
//! This library provides:
//! - `verify`: header, timestamp and Ed25519 signature checks
//! - `jwks`: cache-aside resolution of fal.ai's published key set
//! - `web`: an axum receiver used by the `fal-webhook-server` binary
//!
//! ## Architecture
//!
//! ```text
//! fal.ai → POST /webhooks/fal → WebhookVerifier → (KeyCache | JWKS fetch) → Ed25519
//! ```

pub mod config;
pub mod error;
pub mod jwks;
pub mod verify;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::VerificationError;
pub use jwks::{KeyCache, MemoryKeyCache};
pub use verify::{VerifierSettings, WebhookRequest, WebhookVerifier};
pub use web::AppState;
