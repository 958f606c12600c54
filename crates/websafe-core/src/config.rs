//! Scoring service and cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the scoring service.
    #[serde(default = "default_service_url")]
    pub url: String,

    /// Request timeout in seconds. Unset leaves the transport default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum age of a cached analysis, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_service_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_cache_ttl() -> u64 {
    30 * 60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
            timeout_secs: None,
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl ServiceConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `WEBSAFE_SERVICE_URL` | Scoring service base URL |
    /// | `WEBSAFE_SERVICE_TIMEOUT` | Request timeout in seconds |
    /// | `WEBSAFE_CACHE_TTL` | Cache freshness window in seconds |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("WEBSAFE_SERVICE_URL").unwrap_or_else(|_| default_service_url()),
            timeout_secs: std::env::var("WEBSAFE_SERVICE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok()),
            cache_ttl_secs: std::env::var("WEBSAFE_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_cache_ttl),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.url, "http://localhost:5000");
        assert_eq!(cfg.timeout_secs, None);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(1800));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("WEBSAFE_SERVICE_URL", "http://10.0.0.5:5000");
        std::env::set_var("WEBSAFE_SERVICE_TIMEOUT", "7");
        std::env::set_var("WEBSAFE_CACHE_TTL", "not-a-number");
        let cfg = ServiceConfig::from_env();
        assert_eq!(cfg.url, "http://10.0.0.5:5000");
        assert_eq!(cfg.timeout_secs, Some(7));
        assert_eq!(cfg.cache_ttl_secs, 1800);

        std::env::remove_var("WEBSAFE_SERVICE_URL");
        std::env::remove_var("WEBSAFE_SERVICE_TIMEOUT");
        std::env::remove_var("WEBSAFE_CACHE_TTL");
    }
}
