//! Webhook endpoint handlers.
//!
//! The fal handler verifies the delivery against the raw body bytes before
//! anything is parsed.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::VerificationError;
use crate::verify::{WebhookVerifier, REQUEST_ID_HEADER};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier: WebhookVerifier,
}

impl AppState {
    pub fn new(verifier: WebhookVerifier) -> Self {
        Self { verifier }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// fal.ai Webhook
// =============================================================================

/// Body of a fal.ai webhook delivery.
#[derive(Debug, Deserialize)]
pub struct FalWebhookPayload {
    pub request_id: String,
    #[serde(default)]
    pub gateway_request_id: Option<String>,
    /// "OK" or "ERROR"
    pub status: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub payload_error: Option<String>,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    fn rejected(err: &VerificationError) -> Self {
        Self {
            status: err.kind(),
            request_id: None,
            error: Some(err.to_string()),
        }
    }
}

/// HTTP status for a rejected delivery.
///
/// Key-set outages are 503 so the sender retries.
pub fn status_for(err: &VerificationError) -> StatusCode {
    match err {
        VerificationError::MissingHeader(_)
        | VerificationError::TimestampOutOfTolerance(_)
        | VerificationError::InvalidSignatureFormat => StatusCode::BAD_REQUEST,
        VerificationError::InvalidSignature => StatusCode::UNAUTHORIZED,
        VerificationError::Jwks(_) => StatusCode::SERVICE_UNAVAILABLE,
        VerificationError::MissingCryptoCapability => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// fal.ai webhook endpoint.
///
/// This endpoint:
/// 1. Verifies the Ed25519 signature over the raw body
/// 2. Parses the verified payload
/// 3. Returns 200 OK
pub async fn fal_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let header_request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    info!(
        request_id = %header_request_id,
        body_length = body.len(),
        "fal_webhook_received"
    );

    if let Err(e) = state.verifier.verify(&body, &headers).await {
        let status = status_for(&e);
        if status.is_server_error() {
            error!(request_id = %header_request_id, error = %e, "fal_webhook_verification_unavailable");
        } else {
            warn!(request_id = %header_request_id, error = %e, kind = e.kind(), "fal_webhook_rejected");
        }
        return (status, Json(WebhookResponse::rejected(&e)));
    }

    let payload: FalWebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!(request_id = %header_request_id, error = %e, "fal_webhook_invalid_payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse {
                    status: "invalid_payload",
                    request_id: None,
                    error: Some(e.to_string()),
                }),
            );
        }
    };

    info!(
        request_id = %payload.request_id,
        gateway_request_id = ?payload.gateway_request_id,
        status = %payload.status,
        has_payload = payload.payload.is_some(),
        error = ?payload.error,
        payload_error = ?payload.payload_error,
        "fal_webhook_verified"
    );

    (
        StatusCode::OK,
        Json(WebhookResponse {
            status: "verified",
            request_id: Some(payload.request_id),
            error: None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::{
        unix_now, VerifierSettings, SIGNATURE_HEADER, TIMESTAMP_HEADER, USER_ID_HEADER,
    };
    use axum::http::HeaderValue;
    use axum::response::Response;

    fn offline_state() -> AppState {
        let settings = VerifierSettings {
            jwks_url: "http://127.0.0.1:1/jwks".to_string(),
            ..VerifierSettings::default()
        };
        AppState::new(WebhookVerifier::new(None, settings).unwrap())
    }

    async fn call(state: AppState, headers: HeaderMap, body: &'static [u8]) -> Response {
        fal_webhook(State(state), headers, Bytes::from_static(body))
            .await
            .into_response()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&VerificationError::MissingHeader(SIGNATURE_HEADER)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&VerificationError::TimestampOutOfTolerance("1".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&VerificationError::InvalidSignatureFormat),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&VerificationError::InvalidSignature),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&VerificationError::Jwks("down".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&VerificationError::MissingCryptoCapability),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_payload_deserialization() {
        let payload: FalWebhookPayload = serde_json::from_str(
            r#"{
                "request_id": "req-1",
                "gateway_request_id": "gw-1",
                "status": "OK",
                "payload": {"images": [{"url": "https://example.com/a.png"}]}
            }"#,
        )
        .unwrap();

        assert_eq!(payload.request_id, "req-1");
        assert_eq!(payload.gateway_request_id.as_deref(), Some("gw-1"));
        assert_eq!(payload.status, "OK");
        assert!(payload.payload.is_some());
        assert!(payload.error.is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        let response = call(offline_state(), HeaderMap::new(), b"{}").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_jwks_outage_is_service_unavailable() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&"00".repeat(64)).unwrap());
        headers.insert(
            TIMESTAMP_HEADER,
            HeaderValue::from_str(&unix_now().to_string()).unwrap(),
        );
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user-1"));

        let response = call(offline_state(), headers, b"{}").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[cfg(feature = "ed25519")]
    mod signed {
        use super::*;
        use crate::jwks::{KeyCache, MemoryKeyCache};
        use crate::testing::TestSigner;
        use crate::verify::{DEFAULT_CACHE_KEY, DEFAULT_CACHE_TTL};
        use std::sync::Arc;

        fn state_trusting(signer: &TestSigner) -> AppState {
            let cache = Arc::new(MemoryKeyCache::new());
            cache
                .set(DEFAULT_CACHE_KEY, signer.jwks(), DEFAULT_CACHE_TTL)
                .unwrap();

            let settings = VerifierSettings {
                jwks_url: "http://127.0.0.1:1/jwks".to_string(),
                ..VerifierSettings::default()
            };
            AppState::new(WebhookVerifier::new(Some(cache), settings).unwrap())
        }

        #[tokio::test]
        async fn test_verified_delivery() {
            const BODY: &[u8] = br#"{"request_id":"req-1","status":"OK","payload":{}}"#;

            let signer = TestSigner::generate();
            let headers =
                signer.signed_headers("req-1", "user-1", &unix_now().to_string(), BODY);

            let response = call(state_trusting(&signer), headers, BODY).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn test_forged_delivery() {
            const BODY: &[u8] = br#"{"request_id":"req-1","status":"OK"}"#;

            let signer = TestSigner::generate();
            let forger = TestSigner::generate();
            let headers =
                forger.signed_headers("req-1", "user-1", &unix_now().to_string(), BODY);

            let response = call(state_trusting(&signer), headers, BODY).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn test_verified_but_unparseable_body() {
            const BODY: &[u8] = b"not json";

            let signer = TestSigner::generate();
            let headers =
                signer.signed_headers("req-1", "user-1", &unix_now().to_string(), BODY);

            let response = call(state_trusting(&signer), headers, BODY).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
