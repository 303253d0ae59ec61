//! Provider configuration.
//!
//! Centralized configuration for the market-data provider: base URLs,
//! API key, timeout, and retry settings. Loaded from environment
//! variables with defaults pointing at the public CoinGecko API.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the market-data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for unauthenticated access.
    pub free_base_url: String,

    /// Base URL for key-authenticated access.
    pub pro_base_url: String,

    /// API key; presence switches requests to the pro base URL.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum attempts for transient transport failures.
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    /// Returns default configuration for keyless access.
    fn default() -> Self {
        Self {
            free_base_url: "https://api.coingecko.com/api/v3".to_string(),
            pro_base_url: "https://pro-api.coingecko.com/api/v3".to_string(),
            api_key: None,
            timeout_secs: 10,
            max_retries: 3,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COINGECKO_API_KEY`: pro API key (optional)
    /// - `COINGECKO_FREE_API_URL`: free base URL override
    /// - `COINGECKO_PRO_API_URL`: pro base URL override
    /// - `COINGECKO_TIMEOUT_SECS`: request timeout in seconds (default: 10)
    /// - `COINGECKO_MAX_RETRIES`: transport retry attempts (default: 3)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            free_base_url: std::env::var("COINGECKO_FREE_API_URL")
                .unwrap_or(default.free_base_url),
            pro_base_url: std::env::var("COINGECKO_PRO_API_URL").unwrap_or(default.pro_base_url),
            api_key: std::env::var("COINGECKO_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout_secs: std::env::var("COINGECKO_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            max_retries: std::env::var("COINGECKO_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_retries),
        }
    }

    /// Active base URL: pro when a key is configured, free otherwise.
    pub fn base_url(&self) -> &str {
        if self.api_key.is_some() {
            &self.pro_base_url
        } else {
            &self.free_base_url
        }
    }

    /// Build a full URL by appending a path to the active base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_free_base() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url(), "https://api.coingecko.com/api/v3");
    }

    #[test]
    fn test_api_key_switches_to_pro_base() {
        let config = ProviderConfig {
            api_key: Some("cg-key".to_string()),
            ..ProviderConfig::default()
        };
        assert_eq!(config.base_url(), "https://pro-api.coingecko.com/api/v3");
    }

    #[test]
    fn test_url_joining() {
        let config = ProviderConfig {
            free_base_url: "https://api.example.com/v3/".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(config.url("/ping"), "https://api.example.com/v3/ping");
        assert_eq!(config.url("ping"), "https://api.example.com/v3/ping");
    }

    #[test]
    fn test_timeout_duration() {
        let config = ProviderConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
