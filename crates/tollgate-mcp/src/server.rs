//! MCP protocol dispatcher
//!
//! One state machine over a single inbound message: resolve the method
//! against {initialize, tools/list, tools/call}, run the authorization
//! gate around tool execution, and shape a protocol-conformant reply.
//! The dispatcher holds no per-request state; the registry, gate, and
//! executor are shared read-only across concurrent dispatches.

use crate::catalog::{market_catalog, ToolRegistry};
use crate::clients::{CoinGeckoClient, ProviderConfig};
use crate::executor::{Executor, McpServerError, McpServerResult};
use crate::tools::market_tools;
use crate::types::{
    InitializeResult, McpError, McpRequest, McpResponse, RequestId, ServerCapabilities, ServerInfo,
    ToolCall, ToolResult,
};
use std::sync::Arc;
use tollgate_auth::AuthGate;
use tracing::debug;

/// Protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Token-gated MCP gateway server.
///
/// Owns the tool registry, the authorization gate, and the call
/// executor; dispatches inbound JSON-RPC messages against them.
pub struct McpServer {
    /// Server identity for the initialize handshake.
    info: ServerInfo,

    /// Tool catalog, immutable after construction.
    registry: ToolRegistry,

    /// Authorization gate wrapped around every tool call.
    gate: AuthGate,

    /// Name -> handler table.
    executor: Executor,
}

impl McpServer {
    /// Create a server from its parts.
    ///
    /// Fails when the gate's tier table names an operation with no
    /// registered handler; that is a deployment mistake to catch at
    /// startup, not at call time.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        registry: ToolRegistry,
        gate: AuthGate,
        executor: Executor,
    ) -> McpServerResult<Self> {
        executor.validate_tiers(gate.tiers())?;

        Ok(Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            registry,
            gate,
            executor,
        })
    }

    /// Create the market-data gateway with the standard catalog.
    ///
    /// Builds the registry from the declarative catalog and binds one
    /// provider client across all tools.
    pub fn market(gate: AuthGate, provider: ProviderConfig) -> McpServerResult<Self> {
        let registry = ToolRegistry::from_specs(&market_catalog());
        let client = Arc::new(CoinGeckoClient::new(provider));
        let executor = Executor::from_tools(market_tools(client));

        Self::new(
            "tollgate-market-mcp",
            env!("CARGO_PKG_VERSION"),
            registry,
            gate,
            executor,
        )
    }

    /// Get server info.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get the tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get the authorization gate.
    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Handle an inbound message, suppressing replies to notifications.
    ///
    /// A null request id marks a notification: dispatch still runs, but
    /// no reply frame may be produced for it.
    pub async fn handle_message(&self, request: McpRequest) -> Option<McpResponse> {
        let is_notification = request.is_notification();
        let response = self.handle_request(request).await;

        if is_notification {
            None
        } else {
            Some(response)
        }
    }

    /// Handle an MCP request.
    pub async fn handle_request(&self, request: McpRequest) -> McpResponse {
        debug!("dispatching {}", request.method);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            other => McpResponse::error(request.id, McpError::method_not_found(other)),
        }
    }

    fn handle_initialize(&self, id: RequestId) -> McpResponse {
        let result = InitializeResult {
            capabilities: ServerCapabilities {
                tools: self.registry.capability_map(),
                resources: Default::default(),
                prompts: Default::default(),
            },
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: self.info.clone(),
        };

        match serde_json::to_value(result) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
        }
    }

    fn handle_tools_list(&self, id: RequestId) -> McpResponse {
        match serde_json::to_value(self.registry.list()) {
            Ok(tools) => McpResponse::success(id, serde_json::json!({ "tools": tools })),
            Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
        }
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<serde_json::Value>) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        // Unknown tool names reuse the method-not-found code at the
        // tool level, before the gate or any handler runs.
        if !self.executor.contains(&call.name) {
            return McpResponse::error(id, McpError::method_not_found(&call.name));
        }

        let outcome: McpServerResult<serde_json::Value> = self
            .gate
            .guard(&call.name, &call.arguments, || {
                self.executor.invoke(&call.name, call.arguments.clone())
            })
            .await;

        match outcome {
            Ok(payload) => {
                let result = ToolResult::json(&payload);
                match serde_json::to_value(result) {
                    Ok(value) => McpResponse::success(id, value),
                    Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
                }
            }
            Err(e) => McpResponse::error(id, e.to_mcp_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolSpec;
    use crate::executor::Tool;
    use crate::types::ContentBlock;
    use async_trait::async_trait;
    use tollgate_auth::{
        AuthResult, CredentialVerifier, FailurePolicy, Tier, TierTable, Verdict,
    };

    struct StatusTool;

    #[async_trait]
    impl Tool for StatusTool {
        fn name(&self) -> &'static str {
            "status"
        }

        async fn execute(&self, _args: serde_json::Value) -> McpServerResult<serde_json::Value> {
            Ok(serde_json::json!({"up": true}))
        }
    }

    struct GatedTool;

    #[async_trait]
    impl Tool for GatedTool {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn execute(&self, _args: serde_json::Value) -> McpServerResult<serde_json::Value> {
            Ok(serde_json::json!({"secret": 42}))
        }
    }

    struct AllowAll;

    #[async_trait]
    impl CredentialVerifier for AllowAll {
        async fn verify(&self, _op: &str, _token: u32, _proof: &str) -> AuthResult<Verdict> {
            Ok(Verdict::Allowed)
        }
    }

    fn test_server() -> McpServer {
        let registry = ToolRegistry::from_specs(&[
            ToolSpec::new("status", "Report status"),
            ToolSpec::new("gated", "Protected data"),
        ]);
        let tiers = TierTable::new()
            .with_requirement("status", Tier::Free)
            .with_requirement("gated", Tier::Basic);
        let gate = AuthGate::new(tiers, Arc::new(AllowAll));
        let executor = Executor::from_tools(vec![Arc::new(StatusTool), Arc::new(GatedTool)]);

        McpServer::new("test-gateway", "0.0.0", registry, gate, executor).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_lists_capabilities() {
        let server = test_server();
        let resp = server
            .handle_request(McpRequest::new("1", "initialize"))
            .await;

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "test-gateway");
        assert!(result["capabilities"]["tools"]["status"]["inputSchema"].is_object());
        assert_eq!(result["capabilities"]["resources"], serde_json::json!({}));
        assert_eq!(result["capabilities"]["prompts"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_tools_list_in_declaration_order() {
        let server = test_server();
        let resp = server
            .handle_request(McpRequest::new("2", "tools/list"))
            .await;

        let tools = resp.result.unwrap()["tools"].clone();
        assert_eq!(tools[0]["name"], "status");
        assert_eq!(tools[1]["name"], "gated");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = test_server();
        let resp = server
            .handle_request(McpRequest::new("3", "frobnicate"))
            .await;

        let error = resp.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found: frobnicate");
    }

    #[tokio::test]
    async fn test_call_free_tool_wraps_single_text_item() {
        let server = test_server();
        let req = McpRequest::new("4", "tools/call")
            .with_params(serde_json::json!({"name": "status", "arguments": {}}));
        let resp = server.handle_request(req).await;

        let result: ToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.content.len(), 1);
        let ContentBlock::Text { text } = &result.content[0];
        let payload: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["up"], true);
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let server = test_server();
        let req = McpRequest::new("5", "tools/call")
            .with_params(serde_json::json!({"name": "missing", "arguments": {}}));
        let resp = server.handle_request(req).await;

        assert_eq!(resp.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_call_without_params() {
        let server = test_server();
        let resp = server
            .handle_request(McpRequest::new("6", "tools/call"))
            .await;

        assert_eq!(resp.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_protected_tool_without_proof_denied() {
        let server = test_server();
        let req = McpRequest::new("7", "tools/call")
            .with_params(serde_json::json!({"name": "gated", "arguments": {}}));
        let resp = server.handle_request(req).await;

        let error = resp.error.unwrap();
        assert_eq!(error.code, tollgate_auth::ACCESS_DENIED_CODE);
        assert!(resp.result.is_none());
    }

    #[tokio::test]
    async fn test_protected_tool_with_proof_allowed() {
        let server = test_server();
        let req = McpRequest::new("8", "tools/call")
            .with_params(serde_json::json!({"name": "gated", "arguments": {"proof": "jwt"}}));
        let resp = server.handle_request(req).await;

        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn test_notification_produces_no_reply() {
        let server = test_server();
        let reply = server
            .handle_message(McpRequest::notification("tools/list"))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_request_produces_reply() {
        let server = test_server();
        let reply = server
            .handle_message(McpRequest::new(9, "tools/list"))
            .await;
        assert!(reply.is_some());
    }

    #[test]
    fn test_startup_rejects_dangling_tier_entry() {
        let registry = ToolRegistry::from_specs(&[ToolSpec::new("status", "Report status")]);
        let tiers = TierTable::new().with_requirement("ghost", Tier::Basic);
        let gate = AuthGate::degraded(tiers, FailurePolicy::FailOpen);
        let executor = Executor::from_tools(vec![Arc::new(StatusTool)]);

        assert!(McpServer::new("test", "0.0.0", registry, gate, executor).is_err());
    }
}
