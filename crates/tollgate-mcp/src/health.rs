//! Gateway health checks.
//!
//! Reports process uptime, provider reachability, and the gate's
//! protection mode so operators can see a fail-open deployment at a
//! glance.

use crate::clients::CoinGeckoClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Provider reachable, verifier in place.
    Healthy,

    /// Serving traffic but degraded (fail-open gate or flaky provider).
    Degraded,

    /// Provider unreachable.
    Unhealthy,
}

/// Protection mode the gate is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// Verifier constructed, protected tools verified.
    Protected,

    /// No verifier, protected tools admitted unverified.
    FailOpen,

    /// No verifier, protected tools denied.
    FailClosed,
}

/// Snapshot of gateway health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,

    /// Seconds since the checker was created.
    pub uptime_secs: u64,

    /// Whether the provider answered a ping.
    pub provider_reachable: bool,

    /// Gate protection mode.
    pub gate_mode: GateMode,

    /// When this report was taken.
    pub checked_at: DateTime<Utc>,
}

/// Health checker for the gateway.
pub struct HealthChecker {
    /// Provider client used for reachability pings.
    client: Arc<CoinGeckoClient>,

    /// Gate protection mode, fixed at startup.
    gate_mode: GateMode,

    /// Process start reference.
    started_at: Instant,
}

impl HealthChecker {
    /// Create a checker bound to the gateway's provider client.
    pub fn new(client: Arc<CoinGeckoClient>, gate_mode: GateMode) -> Self {
        Self {
            client,
            gate_mode,
            started_at: Instant::now(),
        }
    }

    /// Take a health snapshot, pinging the provider.
    #[instrument(skip(self))]
    pub async fn check(&self) -> HealthReport {
        let provider_reachable = self.client.ping().await.is_ok();

        let status = match (provider_reachable, self.gate_mode) {
            (false, _) => HealthStatus::Unhealthy,
            (true, GateMode::Protected) => HealthStatus::Healthy,
            (true, _) => HealthStatus::Degraded,
        };

        HealthReport {
            status,
            uptime_secs: self.started_at.elapsed().as_secs(),
            provider_reachable,
            gate_mode: self.gate_mode,
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ProviderConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn checker_for(server: &MockServer, mode: GateMode) -> HealthChecker {
        let client = Arc::new(CoinGeckoClient::new(ProviderConfig {
            free_base_url: server.uri(),
            pro_base_url: server.uri(),
            api_key: None,
            timeout_secs: 5,
            max_retries: 1,
        }));
        HealthChecker::new(client, mode)
    }

    #[tokio::test]
    async fn test_healthy_when_provider_up_and_protected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let report = checker_for(&server, GateMode::Protected).await.check().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.provider_reachable);
    }

    #[tokio::test]
    async fn test_degraded_when_fail_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let report = checker_for(&server, GateMode::FailOpen).await.check().await;
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_unhealthy_when_provider_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let report = checker_for(&server, GateMode::Protected).await.check().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(!report.provider_reachable);
    }
}
