//! # Tollgate MCP
//!
//! This crate provides a token-gated MCP (Model Context Protocol)
//! gateway exposing market-data tools behind tiered credential checks.
//!
//! ## Overview
//!
//! The tollgate-mcp crate handles:
//! - **Protocol**: JSON-RPC envelope types and the MCP dispatcher
//! - **Catalog**: Declarative tool schemas and the derived registry
//! - **Execution**: The name -> handler table behind one result type
//! - **Provider**: HTTP client for the CoinGecko market-data API
//! - **Health**: Uptime, provider reachability, and gate-mode reporting
//!
//! ## MCP Protocol
//!
//! Supported methods:
//! - `initialize`: Capability handshake (tools enabled; resources and
//!   prompts empty)
//! - `tools/list`: List the catalog in declaration order
//! - `tools/call`: Execute a tool through the authorization gate
//!
//! Any other method, and any unknown tool name, answers with error
//! `-32601`. Requests with a null id are notifications and receive no
//! reply frame.
//!
//! ## Available Tools
//!
//! | Tool | Tier |
//! |------|------|
//! | `ping` | free |
//! | `getSupportedVsCurrencies` | free |
//! | `getPrice` | basic (token 1) |
//! | `getCoinMarkets` | premium (token 3) |
//! | `getGlobal` | premium (token 3) |
//! | `getTrending` | pro (token 5) |
//!
//! Protected tools read their proof from `arguments.proof`; the
//! underlying provider call is never made when verification fails.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tollgate_auth::{tier_table_from_env, AuthGate, AuthServiceConfig};
//! use tollgate_mcp::{McpRequest, McpServer, ProviderConfig};
//!
//! async fn handle(json: &str) {
//!     let gate = AuthGate::from_config(AuthServiceConfig::from_env(), tier_table_from_env());
//!     let server = McpServer::market(gate, ProviderConfig::from_env()).unwrap();
//!
//!     let request: McpRequest = serde_json::from_str(json).unwrap();
//!     if let Some(response) = server.handle_message(request).await {
//!         println!("{}", serde_json::to_string(&response).unwrap());
//!     }
//! }
//! ```

pub mod catalog;
pub mod clients;
pub mod executor;
pub mod health;
pub mod retry;
pub mod server;
pub mod tools;
pub mod types;

// Re-export main types
pub use catalog::{market_catalog, ToolRegistry, ToolSpec};
pub use clients::{CoinGeckoClient, ProviderConfig, ProviderError};
pub use executor::{Executor, McpServerError, McpServerResult, Tool};
pub use health::{GateMode, HealthChecker, HealthReport, HealthStatus};
pub use retry::{with_retry_if, RetryConfig};
pub use server::{McpServer, PROTOCOL_VERSION};
pub use types::{
    ContentBlock, InitializeResult, McpError, McpRequest, McpResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolCall, ToolCapability, ToolDescriptor, ToolResult,
};

// Re-export tool collections
pub use tools::market_tools;
