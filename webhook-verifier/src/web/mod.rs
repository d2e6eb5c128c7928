//! Web server module for receiving fal.ai webhooks.
//!
//! Every delivery is verified before its body is parsed. Rejections map to
//! 4xx/5xx responses carrying the verification error.

pub mod handlers;

pub use handlers::{
    fal_webhook, health, status_for, AppState, FalWebhookPayload, HealthResponse,
    WebhookResponse,
};
