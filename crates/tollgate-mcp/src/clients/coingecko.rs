//! CoinGecko provider client.
//!
//! HTTP client for the upstream market-data provider. Every tool maps
//! to exactly one GET route here; responses come back as raw JSON and
//! non-success statuses become a typed error that preserves the
//! provider's own explanation.

use super::config::ProviderConfig;
use crate::retry::{with_retry_if, RetryConfig};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

/// Header carrying the pro API key.
const API_KEY_HEADER: &str = "x-cg-pro-api-key";

/// Provider client errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, timeout).
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("Provider error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body, usually the provider's error JSON.
        message: String,
    },

    /// Provider returned a body that is not JSON.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether the failure is worth retrying.
    ///
    /// Only transport failures retry; provider-reported errors (rate
    /// limits, bad parameters) are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::RequestFailed(_))
    }

    /// Provider detail for the error envelope's `data` field.
    pub fn detail(&self) -> serde_json::Value {
        match self {
            ProviderError::RequestFailed(e) => serde_json::json!({"transport": e.to_string()}),
            ProviderError::ApiError { status, message } => {
                serde_json::json!({"status": status, "body": message})
            }
            ProviderError::InvalidResponse(message) => serde_json::json!({"body": message}),
        }
    }
}

/// CoinGecko API client.
///
/// Chooses the pro or free base URL from configuration and retries
/// transient transport failures with backoff.
#[derive(Clone)]
pub struct CoinGeckoClient {
    /// HTTP client instance.
    client: Client,

    /// Provider endpoint configuration.
    config: ProviderConfig,

    /// Retry policy for transient failures.
    retry: RetryConfig,
}

impl CoinGeckoClient {
    /// Create a new provider client.
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("Failed to build HTTP client");
        let retry = RetryConfig::with_max_attempts(config.max_retries);

        Self {
            client,
            config,
            retry,
        }
    }

    /// Check provider availability.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<serde_json::Value, ProviderError> {
        self.get("/ping", &[]).await
    }

    /// Fetch simple price data.
    #[instrument(skip(self, query))]
    pub async fn simple_price(
        &self,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        self.get("/simple/price", query).await
    }

    /// Fetch the list of supported vs currencies.
    #[instrument(skip(self))]
    pub async fn supported_vs_currencies(&self) -> Result<serde_json::Value, ProviderError> {
        self.get("/simple/supported_vs_currencies", &[]).await
    }

    /// Fetch per-coin market data.
    #[instrument(skip(self, query))]
    pub async fn coin_markets(
        &self,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        self.get("/coins/markets", query).await
    }

    /// Fetch global market data.
    #[instrument(skip(self))]
    pub async fn global(&self) -> Result<serde_json::Value, ProviderError> {
        self.get("/global", &[]).await
    }

    /// Fetch trending coins.
    #[instrument(skip(self))]
    pub async fn trending(&self) -> Result<serde_json::Value, ProviderError> {
        self.get("/search/trending", &[]).await
    }

    /// Perform a GET against the provider with retry on transport failure.
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        with_retry_if(
            &self.retry,
            || self.request(path, query),
            ProviderError::is_transient,
        )
        .await
    }

    async fn request(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        let url = self.config.url(path);
        debug!("GET {url}");

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(ref api_key) = self.config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> CoinGeckoClient {
        CoinGeckoClient::new(ProviderConfig {
            free_base_url: server.uri(),
            pro_base_url: server.uri(),
            api_key: api_key.map(String::from),
            timeout_secs: 5,
            max_retries: 1,
        })
    }

    #[tokio::test]
    async fn test_ping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "gecko_says": "(V3) To the Moon!"
            })))
            .mount(&server)
            .await;

        let body = client_for(&server, None).ping().await.unwrap();
        assert_eq!(body["gecko_says"], "(V3) To the Moon!");
    }

    #[tokio::test]
    async fn test_api_key_header_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header(API_KEY_HEADER, "cg-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let result = client_for(&server, Some("cg-key")).ping().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_query_params_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bitcoin": {"usd": 97000}
            })))
            .mount(&server)
            .await;

        let query = vec![
            ("ids".to_string(), "bitcoin".to_string()),
            ("vs_currencies".to_string(), "usd".to_string()),
        ];
        let body = client_for(&server, None)
            .simple_price(&query)
            .await
            .unwrap();
        assert_eq!(body["bitcoin"]["usd"], 97000);
    }

    #[tokio::test]
    async fn test_non_success_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/global"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string(r#"{"error":"rate limited"}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, None).global().await.unwrap_err();
        match err {
            ProviderError::ApiError { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("rate limited"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new(ProviderConfig {
            free_base_url: server.uri(),
            pro_base_url: server.uri(),
            api_key: None,
            timeout_secs: 5,
            max_retries: 3,
        });

        assert!(client.ping().await.is_err());
    }
}
