//! # Tollgate Authorization
//!
//! This crate provides tiered, credential-gated authorization for the
//! Tollgate MCP gateway.
//!
//! ## Overview
//!
//! The tollgate-auth crate handles:
//! - **Tiers**: Access tiers (free/basic/premium/pro) and their token ids
//! - **Tier table**: Read-only mapping from operation name to required token
//! - **Gate**: Wrapping protected operations so they only run after a
//!   caller's proof is verified
//! - **Verifier**: The single-call HTTP boundary to the external
//!   credential verification service
//!
//! ## Gate semantics
//!
//! Free operations always run. Protected operations run only after the
//! verification service accepts the proof found in `arguments.proof`;
//! the wrapped handler never executes on a denial. When the verifier
//! cannot be constructed at startup, the gate degrades according to the
//! configured [`FailurePolicy`] and logs the degradation loudly.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tollgate_auth::{AuthGate, AuthError, AuthServiceConfig, tier_table_from_env};
//!
//! async fn setup() {
//!     let gate = AuthGate::from_config(AuthServiceConfig::from_env(), tier_table_from_env());
//!
//!     let args = serde_json::json!({"proof": "eyJ..."});
//!     let outcome: Result<&str, AuthError> = gate
//!         .guard("getPrice", &args, || async { Ok("price data") })
//!         .await;
//! }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod tiers;
pub mod verifier;

// Re-export main types
pub use config::{tier_table_from_env, AuthServiceConfig, FailurePolicy};
pub use error::{AuthError, AuthResult};
pub use gate::{AuthGate, ACCESS_DENIED_CODE};
pub use tiers::{Tier, TierTable};
pub use verifier::{CredentialVerifier, RadiusVerifier, Verdict};
