//! Call executor
//!
//! Binds tool names to their handlers and invokes them independently of
//! any transport. All failure vocabularies (authorization denials,
//! provider faults, bad parameters) are unified here into one typed
//! error so the dispatcher shapes every reply the same way.

use crate::clients::ProviderError;
use crate::types::McpError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tollgate_auth::{AuthError, TierTable};

/// Gateway execution error types.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Authorization denied
    #[error("Access denied: {message}")]
    Denied {
        /// Error code from the authorization gate or verifier.
        code: i32,
        /// Denial explanation.
        message: String,
        /// Verifier-supplied detail, if any.
        data: Option<serde_json::Value>,
    },

    /// Upstream provider failure
    #[error("Upstream provider failed: {message}")]
    Upstream {
        /// Failure explanation.
        message: String,
        /// Provider detail (status, body, transport error).
        data: serde_json::Value,
    },

    /// Startup configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for gateway execution.
pub type McpServerResult<T> = Result<T, McpServerError>;

impl McpServerError {
    /// Render this error as a protocol error object.
    ///
    /// Failures without an inherent code fall back to `-32603`.
    pub fn to_mcp_error(&self) -> McpError {
        match self {
            McpServerError::ToolNotFound(name) => McpError::method_not_found(name),
            McpServerError::InvalidParams(message) => McpError::invalid_params(message.clone()),
            McpServerError::Denied {
                code,
                message,
                data,
            } => {
                let error = McpError::new(*code, message.clone());
                match data {
                    Some(data) => error.with_data(data.clone()),
                    None => error,
                }
            }
            McpServerError::Upstream { message, data } => {
                McpError::internal_error(message.clone()).with_data(data.clone())
            }
            McpServerError::Config(message) | McpServerError::Internal(message) => {
                McpError::internal_error(message.clone())
            }
        }
    }
}

impl From<AuthError> for McpServerError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Denied {
                code,
                message,
                detail,
                ..
            } => McpServerError::Denied {
                code,
                message,
                data: detail,
            },
            AuthError::MissingProof(_) | AuthError::MalformedProof(_) => McpServerError::Denied {
                code: tollgate_auth::ACCESS_DENIED_CODE,
                message: error.to_string(),
                data: None,
            },
            other => McpServerError::Internal(other.to_string()),
        }
    }
}

impl From<ProviderError> for McpServerError {
    fn from(error: ProviderError) -> Self {
        McpServerError::Upstream {
            data: error.detail(),
            message: error.to_string(),
        }
    }
}

/// Trait for tool implementations.
///
/// A tool performs exactly one upstream call and returns the provider's
/// payload as structured data; failures surface through the unified
/// error type, never a handler-specific vocabulary.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name this tool is registered and dispatched under.
    fn name(&self) -> &'static str;

    /// Execute the tool with given arguments.
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<serde_json::Value>;
}

/// Fixed table of tool handlers, built once at startup.
pub struct Executor {
    /// Tool name -> handler.
    handlers: HashMap<String, Arc<dyn Tool>>,
}

impl Executor {
    /// Build an executor from a set of tools.
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let handlers = tools
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();
        Self { handlers }
    }

    /// Whether a handler is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered handler names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke a tool by name.
    ///
    /// Unknown names are a caller error, detected before any handler
    /// work happens.
    pub async fn invoke(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> McpServerResult<serde_json::Value> {
        let tool = self
            .handlers
            .get(name)
            .ok_or_else(|| McpServerError::ToolNotFound(name.to_string()))?;

        tool.execute(args).await
    }

    /// Check the tier table against the handler table.
    ///
    /// Every operation the tier table names must resolve to a handler;
    /// a dangling entry is a fatal startup misconfiguration.
    pub fn validate_tiers(&self, tiers: &TierTable) -> McpServerResult<()> {
        tiers
            .validate(self.handlers.keys().map(String::as_str))
            .map_err(|e| McpServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_auth::Tier;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn execute(&self, args: serde_json::Value) -> McpServerResult<serde_json::Value> {
            Ok(args)
        }
    }

    #[tokio::test]
    async fn test_invoke_known_tool() {
        let executor = Executor::from_tools(vec![Arc::new(EchoTool)]);
        let result = executor
            .invoke("echo", serde_json::json!({"x": 1}))
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let executor = Executor::from_tools(vec![Arc::new(EchoTool)]);
        let err = executor
            .invoke("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpServerError::ToolNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_validate_tiers_accepts_registered() {
        let executor = Executor::from_tools(vec![Arc::new(EchoTool)]);
        let tiers = TierTable::new().with_requirement("echo", Tier::Basic);
        assert!(executor.validate_tiers(&tiers).is_ok());
    }

    #[test]
    fn test_validate_tiers_rejects_dangling() {
        let executor = Executor::from_tools(vec![Arc::new(EchoTool)]);
        let tiers = TierTable::new().with_requirement("ghost", Tier::Basic);
        assert!(matches!(
            executor.validate_tiers(&tiers),
            Err(McpServerError::Config(_))
        ));
    }

    #[test]
    fn test_denied_error_renders_own_code() {
        let error = McpServerError::Denied {
            code: -32001,
            message: "Token 1 not held".to_string(),
            data: Some(serde_json::json!({"balance": 0})),
        };
        let mcp = error.to_mcp_error();
        assert_eq!(mcp.code, -32001);
        assert_eq!(mcp.data, Some(serde_json::json!({"balance": 0})));
    }

    #[test]
    fn test_upstream_error_defaults_to_internal_code() {
        let error = McpServerError::Upstream {
            message: "Provider error (429): rate limited".to_string(),
            data: serde_json::json!({"status": 429}),
        };
        assert_eq!(error.to_mcp_error().code, -32603);
    }
}
