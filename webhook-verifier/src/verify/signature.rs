//! Ed25519 webhook signature decoding and verification.
//!
//! fal.ai signs the canonical message with one of the keys published in its
//! JWKS and sends the 64-byte signature hex-encoded.

use crate::error::VerificationError;
use crate::jwks::PublicKey;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Decode the hex signature header.
///
/// Anything that is not hex or not exactly [`SIGNATURE_LENGTH`] bytes is a
/// format error. No key material is consulted.
pub fn decode_signature(raw: &str) -> Result<[u8; SIGNATURE_LENGTH], VerificationError> {
    let bytes = hex::decode(raw).map_err(|_| VerificationError::InvalidSignatureFormat)?;

    bytes
        .try_into()
        .map_err(|_| VerificationError::InvalidSignatureFormat)
}

/// Verify `signature` over `message` against each key in order.
///
/// # Arguments
///
/// * `message` - The canonical message bytes
/// * `signature` - The decoded signature
/// * `keys` - Candidate public keys, in key-set order
///
/// # Returns
///
/// The index of the first key that verifies. Keys that are not valid curve
/// points are skipped.
#[cfg(feature = "ed25519")]
pub fn verify_signature(
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
    keys: &[PublicKey],
) -> Result<usize, VerificationError> {
    use ed25519_dalek::{Signature, VerifyingKey};

    let signature = Signature::from_bytes(signature);

    keys.iter()
        .position(|key| {
            VerifyingKey::from_bytes(key)
                .map(|vk| vk.verify_strict(message, &signature).is_ok())
                .unwrap_or(false)
        })
        .ok_or(VerificationError::InvalidSignature)
}

/// Built without Ed25519 support: nothing can verify.
#[cfg(not(feature = "ed25519"))]
pub fn verify_signature(
    _message: &[u8],
    _signature: &[u8; SIGNATURE_LENGTH],
    _keys: &[PublicKey],
) -> Result<usize, VerificationError> {
    Err(VerificationError::MissingCryptoCapability)
}
