//! Verification failure taxonomy.
//!
//! Every call to [`WebhookVerifier::verify`](crate::verify::WebhookVerifier::verify)
//! ends in success or exactly one of these variants.

use thiserror::Error;

/// Why a webhook delivery was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// A required header is absent, blank, or not valid text.
    #[error("Missing required header: {0}.")]
    MissingHeader(&'static str),

    /// The timestamp header is unparsable or outside the tolerance window.
    /// Carries the raw header value.
    #[error("Timestamp is outside tolerance window: {0}.")]
    TimestampOutOfTolerance(String),

    /// The signature header is not hex or does not decode to 64 bytes.
    #[error("Invalid signature format.")]
    InvalidSignatureFormat,

    /// The key set could not be fetched, parsed, or held no usable key.
    #[error("JWKS error: {0}.")]
    Jwks(String),

    /// No key in the key set verified the signature.
    #[error("Webhook signature verification failed.")]
    InvalidSignature,

    /// The crate was built without Ed25519 support.
    #[error("Ed25519 support is required for signature verification.")]
    MissingCryptoCapability,
}

impl VerificationError {
    pub(crate) fn jwks(detail: impl Into<String>) -> Self {
        VerificationError::Jwks(detail.into())
    }

    /// Short machine-readable name, used as the `status` of error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::MissingHeader(_) => "missing_header",
            VerificationError::TimestampOutOfTolerance(_) => "invalid_timestamp",
            VerificationError::InvalidSignatureFormat => "invalid_signature_format",
            VerificationError::Jwks(_) => "jwks_unavailable",
            VerificationError::InvalidSignature => "invalid_signature",
            VerificationError::MissingCryptoCapability => "crypto_unavailable",
        }
    }
}
