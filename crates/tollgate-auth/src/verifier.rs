//! Credential verification service client.
//!
//! The gate consumes exactly one call from the verification service:
//! given an operation name, the token id it requires, and the caller's
//! proof, return an allow/deny verdict. Everything behind that call
//! (token-chain lookups, verdict caching, ledger access) is the
//! service's concern and opaque here.

use crate::config::AuthServiceConfig;
use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Outcome of a verification call.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Proof is valid and covers the required token.
    Allowed,

    /// Proof is missing, invalid, or covers the wrong token.
    Denied {
        /// Error code supplied by the verification service.
        code: i32,
        /// Human-readable explanation.
        message: String,
        /// Extra detail (token balances, expiry, etc.), if supplied.
        detail: Option<serde_json::Value>,
    },
}

impl Verdict {
    /// Whether the verdict admits the call.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Trait for credential verification backends.
///
/// The production implementation talks to the Radius verification
/// service over HTTP; tests substitute in-memory fakes.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify that `proof` entitles the caller to run `operation`,
    /// which requires holding `token_id`.
    async fn verify(&self, operation: &str, token_id: u32, proof: &str) -> AuthResult<Verdict>;
}

/// Request body for the verification endpoint.
#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    operation: &'a str,
    token_id: u32,
    proof: &'a str,
    contract_address: &'a str,
    chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audience: Option<&'a str>,
}

/// Response body from the verification endpoint.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    ok: bool,
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// HTTP client for the Radius credential verification service.
///
/// Holds the chain parameters and cache hints from configuration; the
/// cache hints travel with each request so the service can size its
/// verdict cache without a second configuration channel.
#[derive(Clone)]
pub struct RadiusVerifier {
    /// HTTP client instance.
    client: Client,

    /// Service configuration.
    config: AuthServiceConfig,
}

impl RadiusVerifier {
    /// Create a new verifier client.
    ///
    /// Fails when the configuration is unusable (empty URL, zero-length
    /// contract address) or the HTTP client cannot be built. Callers
    /// decide whether that failure degrades the gate to fail-open or
    /// fail-closed.
    pub fn new(config: AuthServiceConfig) -> AuthResult<Self> {
        if config.verifier_url.is_empty() {
            return Err(AuthError::ConfigError(
                "verifier URL must not be empty".to_string(),
            ));
        }
        if config.contract_address.is_empty() {
            return Err(AuthError::ConfigError(
                "contract address must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AuthError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn verify_url(&self) -> String {
        let base = self.config.verifier_url.trim_end_matches('/');
        format!("{base}/v1/verify")
    }
}

#[async_trait]
impl CredentialVerifier for RadiusVerifier {
    #[instrument(skip(self, proof), fields(operation = %operation, token_id = token_id))]
    async fn verify(&self, operation: &str, token_id: u32, proof: &str) -> AuthResult<Verdict> {
        debug!("Verifying proof for {operation} (token {token_id})");

        let body = VerifyRequest {
            operation,
            token_id,
            proof,
            contract_address: &self.config.contract_address,
            chain_id: self.config.chain_id,
            issuer: self.config.jwt_issuer.as_deref(),
            audience: self.config.expected_audience.as_deref(),
        };

        let response = self
            .client
            .post(self.verify_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::VerifierUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::VerifierUnreachable(format!(
                "verification service returned {status}: {message}"
            )));
        }

        let verdict: VerifyResponse = response
            .json()
            .await
            .map_err(|e| AuthError::VerifierUnreachable(format!("invalid verdict body: {e}")))?;

        if verdict.ok {
            Ok(Verdict::Allowed)
        } else {
            Ok(Verdict::Denied {
                code: verdict.code.unwrap_or(-32603),
                message: verdict
                    .message
                    .unwrap_or_else(|| "Access denied".to_string()),
                detail: verdict.detail,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(uri: &str) -> AuthServiceConfig {
        AuthServiceConfig {
            verifier_url: uri.to_string(),
            ..AuthServiceConfig::default()
        }
    }

    #[test]
    fn test_empty_url_rejected() {
        let config = AuthServiceConfig {
            verifier_url: String::new(),
            ..AuthServiceConfig::default()
        };
        assert!(RadiusVerifier::new(config).is_err());
    }

    #[tokio::test]
    async fn test_allowed_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true
            })))
            .mount(&server)
            .await;

        let verifier = RadiusVerifier::new(config_for(&server.uri())).unwrap();
        let verdict = verifier.verify("getPrice", 1, "proof-jwt").await.unwrap();
        assert!(verdict.is_allowed());
    }

    #[tokio::test]
    async fn test_denied_verdict_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "code": -32001,
                "message": "Token 1 not held",
                "detail": {"balance": 0}
            })))
            .mount(&server)
            .await;

        let verifier = RadiusVerifier::new(config_for(&server.uri())).unwrap();
        let verdict = verifier.verify("getPrice", 1, "proof-jwt").await.unwrap();
        match verdict {
            Verdict::Denied {
                code,
                message,
                detail,
            } => {
                assert_eq!(code, -32001);
                assert_eq!(message, "Token 1 not held");
                assert_eq!(detail, Some(serde_json::json!({"balance": 0})));
            }
            Verdict::Allowed => panic!("expected denial"),
        }
    }

    #[tokio::test]
    async fn test_service_error_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/verify"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let verifier = RadiusVerifier::new(config_for(&server.uri())).unwrap();
        let err = verifier.verify("getPrice", 1, "proof-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::VerifierUnreachable(_)));
    }
}
