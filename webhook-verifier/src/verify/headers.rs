//! Required webhook headers and timestamp freshness.
//!
//! fal.ai sends four headers with every webhook delivery. All four must be
//! present and non-blank before anything else is looked at.

use std::time::{SystemTime, UNIX_EPOCH};

use http::HeaderMap;

use crate::error::VerificationError;

pub const REQUEST_ID_HEADER: &str = "X-Fal-Webhook-Request-Id";
pub const SIGNATURE_HEADER: &str = "X-Fal-Webhook-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Fal-Webhook-Timestamp";
pub const USER_ID_HEADER: &str = "X-Fal-Webhook-User-Id";

/// Headers checked for presence, in reporting order.
pub const REQUIRED_HEADERS: [&str; 4] = [
    REQUEST_ID_HEADER,
    SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
    USER_ID_HEADER,
];

/// Maximum allowed distance between the webhook timestamp and now.
pub const TIMESTAMP_TOLERANCE_SECS: u64 = 5 * 60;

/// Raw values of the required headers, borrowed from the request.
///
/// Values are kept exactly as received (untrimmed) because they feed the
/// signed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookHeaders<'a> {
    pub request_id: &'a str,
    pub signature: &'a str,
    pub timestamp: &'a str,
    pub user_id: &'a str,
}

impl<'a> WebhookHeaders<'a> {
    /// Collect the required headers, failing on the first one that is absent
    /// or blank.
    pub fn from_header_map(headers: &'a HeaderMap) -> Result<Self, VerificationError> {
        let mut values = [""; 4];

        for (slot, name) in values.iter_mut().zip(REQUIRED_HEADERS) {
            *slot = required_header(headers, name)?;
        }

        let [request_id, signature, timestamp, user_id] = values;

        Ok(Self {
            request_id,
            signature,
            timestamp,
            user_id,
        })
    }
}

fn required_header<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<&'a str, VerificationError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or(VerificationError::MissingHeader(name))
}

/// Reject timestamps more than [`TIMESTAMP_TOLERANCE_SECS`] away from `now`.
///
/// An unparsable value never falls inside the window; the error still
/// carries the raw string.
pub fn validate_timestamp(raw: &str, now: i64) -> Result<(), VerificationError> {
    let fresh = raw
        .trim()
        .parse::<i64>()
        .map(|ts| now.abs_diff(ts) <= TIMESTAMP_TOLERANCE_SECS)
        .unwrap_or(false);

    if fresh {
        Ok(())
    } else {
        Err(VerificationError::TimestampOutOfTolerance(raw.to_string()))
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
