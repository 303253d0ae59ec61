//! Error types for authorization operations
//!
//! This module defines all error types that can occur while deciding
//! whether a gated operation may run, including verification-service
//! failures and configuration issues.

use thiserror::Error;

/// Authorization error types.
///
/// These errors cover gate decisions, verification-service failures,
/// and tier-table configuration problems.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Caller supplied no proof for a protected operation
    #[error("Missing proof of access for operation: {0}")]
    MissingProof(String),

    /// Caller supplied a proof that is not a string value
    #[error("Malformed proof of access for operation: {0}")]
    MalformedProof(String),

    /// The verification service rejected the proof
    #[error("Access denied for {operation}: {message}")]
    Denied {
        /// Operation that was gated.
        operation: String,
        /// Error code supplied by the verification service.
        code: i32,
        /// Human-readable explanation from the verification service.
        message: String,
        /// Extra detail from the verification service, if any.
        detail: Option<serde_json::Value>,
    },

    /// Tier table references an operation that does not exist
    #[error("Tier requirement references unknown operation: {0}")]
    UnknownOperation(String),

    /// Verification service request failed
    #[error("Verification request failed: {0}")]
    VerifierUnreachable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected traffic and should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AuthError::VerifierUnreachable(_) | AuthError::ConfigError(_) | AuthError::Internal(_)
        )
    }
}
