//! Configuration module for environment variable parsing.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::jwks::JWKS_URL;
use crate::verify::{VerifierSettings, DEFAULT_CACHE_KEY, DEFAULT_CACHE_TTL};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// URL of the fal.ai JWKS document
    pub jwks_url: String,

    /// Cache key the JWKS document is stored under
    pub jwks_cache_key: String,

    /// Lifetime of a cached JWKS document in seconds
    pub jwks_cache_ttl_secs: u64,

    /// Whether fetched key sets are cached in memory
    pub jwks_cache_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            jwks_url: env::var("FAL_JWKS_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| JWKS_URL.to_string()),

            jwks_cache_key: env::var("FAL_JWKS_CACHE_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CACHE_KEY.to_string()),

            jwks_cache_ttl_secs: env::var("FAL_JWKS_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL.as_secs()),

            jwks_cache_enabled: parse_bool("FAL_JWKS_CACHE_ENABLED", true),
        }
    }

    /// Settings for [`WebhookVerifier`](crate::verify::WebhookVerifier).
    pub fn verifier_settings(&self) -> VerifierSettings {
        VerifierSettings {
            jwks_url: self.jwks_url.clone(),
            cache_key: self.jwks_cache_key.clone(),
            cache_ttl: Duration::from_secs(self.jwks_cache_ttl_secs),
        }
    }
}

/// Parse a boolean flag like "true", "0" or "off".
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_values() {
        env::set_var("TEST_BOOL_ON", "Yes");
        env::set_var("TEST_BOOL_OFF", " 0 ");
        assert!(parse_bool("TEST_BOOL_ON", false));
        assert!(!parse_bool("TEST_BOOL_OFF", true));
        env::remove_var("TEST_BOOL_ON");
        env::remove_var("TEST_BOOL_OFF");
    }

    #[test]
    fn test_parse_bool_default() {
        assert!(parse_bool("NONEXISTENT_BOOL_VAR", true));

        env::set_var("TEST_BOOL_JUNK", "maybe");
        assert!(!parse_bool("TEST_BOOL_JUNK", false));
        env::remove_var("TEST_BOOL_JUNK");
    }

    #[test]
    fn test_verifier_settings() {
        let config = Config {
            port: 8080,
            jwks_url: "https://example.com/jwks.json".to_string(),
            jwks_cache_key: "my_jwks".to_string(),
            jwks_cache_ttl_secs: 60,
            jwks_cache_enabled: true,
        };

        assert_eq!(
            config.verifier_settings(),
            VerifierSettings {
                jwks_url: "https://example.com/jwks.json".to_string(),
                cache_key: "my_jwks".to_string(),
                cache_ttl: Duration::from_secs(60),
            }
        );
    }
}
