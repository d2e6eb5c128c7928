//! Test helpers: a throwaway fal.ai-style signer.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use http::{HeaderMap, HeaderValue};
use rand::rngs::OsRng;
use serde_json::{json, Value};

use crate::jwks::PublicKey;
use crate::verify::headers::{
    REQUEST_ID_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER, USER_ID_HEADER,
};
use crate::verify::message::body_digest_hex;

pub struct TestSigner {
    signing_key: SigningKey,
}

impl TestSigner {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn public_key_b64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.public_key())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// A one-key JWKS document shaped like fal.ai's.
    pub fn jwks(&self) -> Value {
        json!({
            "keys": [
                { "crv": "Ed25519", "kty": "OKP", "x": self.public_key_b64() }
            ]
        })
    }

    /// Headers for a delivery signed by this key.
    pub fn signed_headers(
        &self,
        request_id: &str,
        user_id: &str,
        timestamp: &str,
        body: &[u8],
    ) -> HeaderMap {
        let message = format!(
            "{}\n{}\n{}\n{}",
            request_id,
            user_id,
            timestamp,
            body_digest_hex(body)
        );
        let signature = hex::encode(self.sign(message.as_bytes()));

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, header_value(request_id));
        headers.insert(SIGNATURE_HEADER, header_value(&signature));
        headers.insert(TIMESTAMP_HEADER, header_value(timestamp));
        headers.insert(USER_ID_HEADER, header_value(user_id));
        headers
    }
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap()
}
