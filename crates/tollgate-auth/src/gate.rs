//! The authorization gate.
//!
//! Wraps execution of protected operations: free operations pass
//! straight through, protected operations must present a proof that the
//! verification service accepts before the wrapped handler runs. The
//! handler never executes when verification fails.

use crate::config::{AuthServiceConfig, FailurePolicy};
use crate::error::{AuthError, AuthResult};
use crate::tiers::TierTable;
use crate::verifier::{CredentialVerifier, RadiusVerifier, Verdict};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// JSON-RPC error code for denied or unverifiable proofs. Sits in the
/// implementation-defined server-error range.
pub const ACCESS_DENIED_CODE: i32 = -32001;

/// Tiered authorization gate.
///
/// Holds the read-only tier table and, when one could be constructed,
/// the credential verifier. A gate without a verifier behaves according
/// to its [`FailurePolicy`]: fail-open admits every call, fail-closed
/// denies every protected call.
pub struct AuthGate {
    /// Operation name -> required token mapping.
    tiers: TierTable,

    /// Verification backend, absent when construction failed.
    verifier: Option<Arc<dyn CredentialVerifier>>,

    /// Behavior when no verifier is available.
    policy: FailurePolicy,
}

impl AuthGate {
    /// Create a gate with a working verifier.
    pub fn new(tiers: TierTable, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            tiers,
            verifier: Some(verifier),
            policy: FailurePolicy::FailOpen,
        }
    }

    /// Create a gate with no verifier, degraded per `policy`.
    ///
    /// The degradation is a deployment-visible event, logged loudly at
    /// construction rather than on each call.
    pub fn degraded(tiers: TierTable, policy: FailurePolicy) -> Self {
        match policy {
            FailurePolicy::FailOpen => {
                warn!("verification service unavailable; protected operations will run UNVERIFIED")
            }
            FailurePolicy::FailClosed => {
                warn!("verification service unavailable; protected operations will be DENIED")
            }
        }
        Self {
            tiers,
            verifier: None,
            policy,
        }
    }

    /// Build a gate from configuration.
    ///
    /// Verifier construction failure does not abort startup; the gate
    /// degrades per the configured failure policy instead.
    pub fn from_config(config: AuthServiceConfig, tiers: TierTable) -> Self {
        let policy = config.failure_policy;
        match RadiusVerifier::new(config) {
            Ok(verifier) => Self::new(tiers, Arc::new(verifier)),
            Err(e) => {
                warn!("failed to construct credential verifier: {e}");
                Self::degraded(tiers, policy)
            }
        }
    }

    /// Whether an operation requires a credential.
    pub fn is_protected(&self, operation: &str) -> bool {
        self.tiers.is_protected(operation)
    }

    /// Required token id for an operation, `None` for free access.
    pub fn required_token(&self, operation: &str) -> Option<u32> {
        self.tiers.required_token(operation)
    }

    /// Whether a verifier backend is available.
    pub fn has_verifier(&self) -> bool {
        self.verifier.is_some()
    }

    /// The tier table backing this gate.
    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// The configured degradation policy.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run `next` if the call clears the gate.
    ///
    /// Free operations run unconditionally, proof or no proof. Protected
    /// operations run only after the verification service accepts the
    /// proof extracted from `arguments.proof`; on any denial `next` is
    /// never invoked and the denial surfaces as the caller's error type.
    pub async fn guard<T, E, F, Fut>(
        &self,
        operation: &str,
        arguments: &serde_json::Value,
        next: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthError>,
    {
        let token_id = match self.required_token(operation) {
            Some(id) => id,
            None => return next().await,
        };

        let verifier = match &self.verifier {
            Some(v) => v,
            None => match self.policy {
                FailurePolicy::FailOpen => {
                    debug!("admitting {operation} unverified (fail-open, no verifier)");
                    return next().await;
                }
                FailurePolicy::FailClosed => {
                    return Err(AuthError::Denied {
                        operation: operation.to_string(),
                        code: ACCESS_DENIED_CODE,
                        message: "verification service unavailable".to_string(),
                        detail: None,
                    }
                    .into());
                }
            },
        };

        let proof = match extract_proof(operation, arguments) {
            Ok(proof) => proof,
            Err(e) => return Err(e.into()),
        };

        // Verifier faults are re-expressed as structured denials; they
        // must never propagate as an unhandled dispatch fault.
        let verdict = match verifier.verify(operation, token_id, proof).await {
            Ok(verdict) => verdict,
            Err(e) => {
                return Err(AuthError::Denied {
                    operation: operation.to_string(),
                    code: -32603,
                    message: e.to_string(),
                    detail: None,
                }
                .into());
            }
        };

        match verdict {
            Verdict::Allowed => next().await,
            Verdict::Denied {
                code,
                message,
                detail,
            } => {
                debug!("denied {operation}: {message}");
                Err(AuthError::Denied {
                    operation: operation.to_string(),
                    code,
                    message,
                    detail,
                }
                .into())
            }
        }
    }
}

/// Pull the proof string out of the call arguments.
///
/// Three states: absent, malformed (present but not a string), and
/// present. The first two are verification failures, never panics.
fn extract_proof<'a>(operation: &str, arguments: &'a serde_json::Value) -> AuthResult<&'a str> {
    match arguments.get("proof") {
        None | Some(serde_json::Value::Null) => {
            Err(AuthError::MissingProof(operation.to_string()))
        }
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(_) => Err(AuthError::MalformedProof(operation.to_string())),
    }
}
