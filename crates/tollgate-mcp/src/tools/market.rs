//! Market-data tools
//!
//! One tool per provider route. Each tool validates its arguments,
//! builds the query string, performs the single upstream call, and
//! returns the provider's JSON payload unchanged. Provider failures
//! convert uniformly through the executor's error type.

use crate::clients::CoinGeckoClient;
use crate::executor::{McpServerError, McpServerResult, Tool};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Read an argument that may be a single string or an array of strings,
/// joining arrays with commas the way the provider expects.
fn string_or_list(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            if parts.len() == items.len() {
                Some(parts.join(","))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Append an optional pass-through argument to the query.
///
/// Booleans are appended only when true, matching the provider's
/// treatment of its flag parameters; numbers and strings pass through
/// as rendered.
fn push_optional(query: &mut Vec<(String, String)>, args: &serde_json::Value, key: &str) {
    match args.get(key) {
        Some(serde_json::Value::Bool(true)) => query.push((key.to_string(), "true".to_string())),
        Some(serde_json::Value::Bool(false)) | Some(serde_json::Value::Null) | None => {}
        Some(serde_json::Value::String(s)) => query.push((key.to_string(), s.clone())),
        Some(serde_json::Value::Number(n)) => query.push((key.to_string(), n.to_string())),
        Some(other) => {
            if let Some(joined) = string_or_list(other) {
                query.push((key.to_string(), joined));
            }
        }
    }
}

/// Tool to check provider availability.
pub struct PingTool {
    client: Arc<CoinGeckoClient>,
}

#[async_trait]
impl Tool for PingTool {
    fn name(&self) -> &'static str {
        "ping"
    }

    #[instrument(skip(self, _args), fields(tool = "ping"))]
    async fn execute(&self, _args: serde_json::Value) -> McpServerResult<serde_json::Value> {
        Ok(self.client.ping().await?)
    }
}

/// Tool to fetch price data for specific coins and currencies.
pub struct GetPriceTool {
    client: Arc<CoinGeckoClient>,
}

#[async_trait]
impl Tool for GetPriceTool {
    fn name(&self) -> &'static str {
        "getPrice"
    }

    #[instrument(skip(self, args), fields(tool = "getPrice"))]
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<serde_json::Value> {
        let ids = args.get("ids").and_then(string_or_list);
        let vs_currencies = args.get("vs_currencies").and_then(string_or_list);

        let (ids, vs_currencies) = match (ids, vs_currencies) {
            (Some(ids), Some(vs_currencies)) => (ids, vs_currencies),
            _ => {
                return Err(McpServerError::InvalidParams(
                    "Missing required parameters: ids, vs_currencies".to_string(),
                ))
            }
        };

        let mut query = vec![
            ("ids".to_string(), ids),
            ("vs_currencies".to_string(), vs_currencies),
        ];
        push_optional(&mut query, &args, "include_market_cap");
        push_optional(&mut query, &args, "include_24hr_vol");
        push_optional(&mut query, &args, "include_24hr_change");
        push_optional(&mut query, &args, "include_last_updated_at");
        push_optional(&mut query, &args, "precision");

        Ok(self.client.simple_price(&query).await?)
    }
}

/// Tool to list supported vs currencies.
pub struct GetSupportedVsCurrenciesTool {
    client: Arc<CoinGeckoClient>,
}

#[async_trait]
impl Tool for GetSupportedVsCurrenciesTool {
    fn name(&self) -> &'static str {
        "getSupportedVsCurrencies"
    }

    #[instrument(skip(self, _args), fields(tool = "getSupportedVsCurrencies"))]
    async fn execute(&self, _args: serde_json::Value) -> McpServerResult<serde_json::Value> {
        Ok(self.client.supported_vs_currencies().await?)
    }
}

/// Tool to fetch per-coin market data.
pub struct GetCoinMarketsTool {
    client: Arc<CoinGeckoClient>,
}

#[async_trait]
impl Tool for GetCoinMarketsTool {
    fn name(&self) -> &'static str {
        "getCoinMarkets"
    }

    #[instrument(skip(self, args), fields(tool = "getCoinMarkets"))]
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<serde_json::Value> {
        let vs_currency = match args.get("vs_currency").and_then(|v| v.as_str()) {
            Some(vs_currency) => vs_currency.to_string(),
            None => {
                return Err(McpServerError::InvalidParams(
                    "Missing required parameter: vs_currency".to_string(),
                ))
            }
        };

        let mut query = vec![("vs_currency".to_string(), vs_currency)];
        push_optional(&mut query, &args, "ids");
        push_optional(&mut query, &args, "category");
        push_optional(&mut query, &args, "order");
        push_optional(&mut query, &args, "per_page");
        push_optional(&mut query, &args, "page");
        push_optional(&mut query, &args, "sparkline");
        push_optional(&mut query, &args, "price_change_percentage");

        Ok(self.client.coin_markets(&query).await?)
    }
}

/// Tool to fetch global market data.
pub struct GetGlobalTool {
    client: Arc<CoinGeckoClient>,
}

#[async_trait]
impl Tool for GetGlobalTool {
    fn name(&self) -> &'static str {
        "getGlobal"
    }

    #[instrument(skip(self, _args), fields(tool = "getGlobal"))]
    async fn execute(&self, _args: serde_json::Value) -> McpServerResult<serde_json::Value> {
        Ok(self.client.global().await?)
    }
}

/// Tool to fetch trending coins.
pub struct GetTrendingTool {
    client: Arc<CoinGeckoClient>,
}

#[async_trait]
impl Tool for GetTrendingTool {
    fn name(&self) -> &'static str {
        "getTrending"
    }

    #[instrument(skip(self, _args), fields(tool = "getTrending"))]
    async fn execute(&self, _args: serde_json::Value) -> McpServerResult<serde_json::Value> {
        Ok(self.client.trending().await?)
    }
}

/// Get all market tools, bound to one provider client.
pub fn market_tools(client: Arc<CoinGeckoClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(PingTool {
            client: client.clone(),
        }),
        Arc::new(GetPriceTool {
            client: client.clone(),
        }),
        Arc::new(GetSupportedVsCurrenciesTool {
            client: client.clone(),
        }),
        Arc::new(GetCoinMarketsTool {
            client: client.clone(),
        }),
        Arc::new(GetGlobalTool {
            client: client.clone(),
        }),
        Arc::new(GetTrendingTool { client }),
    ]
}
