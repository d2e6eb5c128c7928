//! The byte sequence fal.ai signs for each webhook delivery.

use sha2::{Digest, Sha256};

use super::headers::WebhookHeaders;

/// Lowercase hex SHA-256 of the raw request body.
pub fn body_digest_hex(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Build `request_id \n user_id \n timestamp \n sha256_hex(body)`.
///
/// Field order and separator must match the signer byte for byte.
pub fn canonical_message(headers: &WebhookHeaders<'_>, body: &[u8]) -> Vec<u8> {
    let digest = body_digest_hex(body);

    [
        headers.request_id,
        headers.user_id,
        headers.timestamp,
        digest.as_str(),
    ]
    .join("\n")
    .into_bytes()
}
