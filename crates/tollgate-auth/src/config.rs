//! Configuration for the verification service and gate policy.
//!
//! Provides centralized configuration for the external credential
//! verification service: chain parameters, cache sizing hints consumed
//! by that service, and the gate's behavior when the verifier cannot be
//! constructed. Configuration is loaded from environment variables with
//! sensible defaults for local development.

use crate::tiers::{Tier, TierTable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Behavior of the gate when the verification service is unavailable
/// at startup.
///
/// Failing open preserves availability of protected operations at the
/// cost of protection; failing closed denies every protected call until
/// the verifier is back. Either way the choice is logged loudly at
/// startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Run protected operations without verification.
    FailOpen,

    /// Deny every protected operation.
    FailClosed,
}

/// Configuration for the credential verification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthServiceConfig {
    /// Base URL of the verification service.
    pub verifier_url: String,

    /// Address of the access-token contract the service checks against.
    pub contract_address: String,

    /// Chain id of the ledger backing the access tokens.
    pub chain_id: u64,

    /// Expected JWT issuer, if the deployment pins one.
    pub jwt_issuer: Option<String>,

    /// Expected JWT audience, if the deployment pins one.
    pub expected_audience: Option<String>,

    /// Verdict cache TTL in seconds (consumed by the verification service).
    pub cache_ttl_secs: u64,

    /// Verdict cache entry limit (consumed by the verification service).
    pub cache_max_size: usize,

    /// Disable the verdict cache entirely.
    pub cache_disabled: bool,

    /// Request timeout in seconds for verification calls.
    pub timeout_secs: u64,

    /// Gate behavior when the verifier cannot be constructed.
    pub failure_policy: FailurePolicy,

    /// Development mode: verbose verdict logging, relaxed issuer checks.
    pub dev_mode: bool,
}

impl Default for AuthServiceConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            verifier_url: "http://localhost:8545".to_string(),
            contract_address: "0x9f2B42FB651b75CC3db4ef9FEd913A22BA4629Cf".to_string(),
            chain_id: 1223954,
            jwt_issuer: None,
            expected_audience: None,
            cache_ttl_secs: 300,
            cache_max_size: 1000,
            cache_disabled: false,
            timeout_secs: 10,
            failure_policy: FailurePolicy::FailOpen,
            dev_mode: false,
        }
    }
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TOLLGATE_VERIFIER_URL`: verification service URL (default: http://localhost:8545)
    /// - `TOLLGATE_CONTRACT_ADDRESS`: access-token contract address
    /// - `TOLLGATE_CHAIN_ID`: ledger chain id (default: 1223954)
    /// - `TOLLGATE_JWT_ISSUER`: expected proof issuer
    /// - `TOLLGATE_EXPECTED_AUDIENCE`: expected proof audience
    /// - `TOLLGATE_CACHE_TTL`: verdict cache TTL in seconds (default: 300)
    /// - `TOLLGATE_CACHE_MAX_SIZE`: verdict cache entry limit (default: 1000)
    /// - `TOLLGATE_CACHE_DISABLED`: set to "true" to disable the cache
    /// - `TOLLGATE_VERIFIER_TIMEOUT_SECS`: verification timeout (default: 10)
    /// - `TOLLGATE_AUTH_FAIL_CLOSED`: set to "true" to deny protected calls
    ///   when the verifier cannot be constructed (default: fail open)
    /// - `TOLLGATE_DEV_MODE`: set to "true" for development mode
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            verifier_url: std::env::var("TOLLGATE_VERIFIER_URL").unwrap_or(default.verifier_url),
            contract_address: std::env::var("TOLLGATE_CONTRACT_ADDRESS")
                .unwrap_or(default.contract_address),
            chain_id: std::env::var("TOLLGATE_CHAIN_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.chain_id),
            jwt_issuer: std::env::var("TOLLGATE_JWT_ISSUER").ok(),
            expected_audience: std::env::var("TOLLGATE_EXPECTED_AUDIENCE").ok(),
            cache_ttl_secs: std::env::var("TOLLGATE_CACHE_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.cache_ttl_secs),
            cache_max_size: std::env::var("TOLLGATE_CACHE_MAX_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.cache_max_size),
            cache_disabled: std::env::var("TOLLGATE_CACHE_DISABLED")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.cache_disabled),
            timeout_secs: std::env::var("TOLLGATE_VERIFIER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            failure_policy: match std::env::var("TOLLGATE_AUTH_FAIL_CLOSED").as_deref() {
                Ok("true") | Ok("1") => FailurePolicy::FailClosed,
                _ => FailurePolicy::FailOpen,
            },
            dev_mode: std::env::var("TOLLGATE_DEV_MODE")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.dev_mode),
        }
    }

    /// Get the verification request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build the tier-requirement table from configuration.
///
/// Token ids default to the tier defaults and can be remapped per tier:
/// - `TOLLGATE_BASIC_TOKEN_ID` (default: 1)
/// - `TOLLGATE_PREMIUM_TOKEN_ID` (default: 3)
/// - `TOLLGATE_PRO_TOKEN_ID` (default: 5)
pub fn tier_table_from_env() -> TierTable {
    let basic = env_token("TOLLGATE_BASIC_TOKEN_ID", Tier::Basic);
    let premium = env_token("TOLLGATE_PREMIUM_TOKEN_ID", Tier::Premium);
    let pro = env_token("TOLLGATE_PRO_TOKEN_ID", Tier::Pro);

    TierTable::new()
        .with_requirement("ping", Tier::Free)
        .with_requirement("getSupportedVsCurrencies", Tier::Free)
        .with_token_override("getPrice", Tier::Basic, basic)
        .with_token_override("getGlobal", Tier::Premium, premium)
        .with_token_override("getCoinMarkets", Tier::Premium, premium)
        .with_token_override("getTrending", Tier::Pro, pro)
}

fn env_token(var: &str, tier: Tier) -> Option<u32> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .or_else(|| tier.default_token_id())
}
