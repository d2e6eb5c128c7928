//! Public key extraction from a JWKS document.

use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;

use super::PublicKey;
use crate::error::VerificationError;

/// base64url, accepting `x` values with or without padding.
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extract the usable Ed25519 keys from `document`, in document order.
///
/// Entries without a string `x`, with undecodable `x`, or whose key is not
/// 32 bytes are skipped. Fails if `keys` is not an array or nothing usable
/// remains.
pub fn extract_public_keys(document: &Value) -> Result<Vec<PublicKey>, VerificationError> {
    let entries = document
        .get("keys")
        .and_then(Value::as_array)
        .ok_or_else(|| VerificationError::jwks("Invalid JWKS format: missing keys array"))?;

    let keys: Vec<PublicKey> = entries.iter().filter_map(decode_key).collect();

    if keys.is_empty() {
        return Err(VerificationError::jwks("No valid public keys found in JWKS"));
    }

    Ok(keys)
}

fn decode_key(entry: &Value) -> Option<PublicKey> {
    let x = entry.get("x")?.as_str()?;
    BASE64URL.decode(x).ok()?.try_into().ok()
}
