//! Declarative tool catalog and registry
//!
//! The registry is a pure data transform: it derives wire-ready tool
//! descriptors from a declarative schema at startup and serves them in
//! declaration order for the lifetime of the process. No I/O, no hot
//! reload.

use crate::types::{ToolCapability, ToolDescriptor};
use std::collections::{BTreeMap, HashMap};

/// Declarative description of one tool before normalization.
///
/// `parameters` is a raw JSON-Schema fragment and may be absent or
/// partial; the registry fills in the canonical defaults. This mirrors
/// how upstream schemas are authored: zero-argument tools simply omit
/// the parameter block.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Tool name (unique, stable identifier)
    pub name: &'static str,

    /// Human-readable description; empty means "derive from name"
    pub description: &'static str,

    /// Raw parameter schema, if the tool takes arguments
    pub parameters: Option<serde_json::Value>,
}

impl ToolSpec {
    /// Declare a zero-argument tool.
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            parameters: None,
        }
    }

    /// Declare a tool with a parameter schema.
    pub fn with_parameters(
        name: &'static str,
        description: &'static str,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name,
            description,
            parameters: Some(parameters),
        }
    }
}

/// In-memory catalog of callable tools.
///
/// Built once from a declarative schema; immutable thereafter and
/// shared read-only across concurrent dispatches.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    /// Descriptors in declaration order.
    descriptors: Vec<ToolDescriptor>,

    /// Name -> position in `descriptors`.
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry from declarative specs.
    ///
    /// Each spec's parameter shape is normalized into a canonical
    /// `{type, properties, required}` triple; a missing block becomes
    /// the empty object schema. Declaration order is preserved.
    pub fn from_specs(specs: &[ToolSpec]) -> Self {
        let mut descriptors = Vec::with_capacity(specs.len());
        let mut index = HashMap::with_capacity(specs.len());

        for spec in specs {
            let description = if spec.description.is_empty() {
                format!("Execute {} method", spec.name)
            } else {
                spec.description.to_string()
            };

            let descriptor = ToolDescriptor {
                name: spec.name.to_string(),
                description,
                input_schema: normalize_schema(spec.parameters.as_ref()),
            };

            index.insert(descriptor.name.clone(), descriptors.len());
            descriptors.push(descriptor);
        }

        Self { descriptors, index }
    }

    /// All descriptors, in declaration order. Stable across calls.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Look up a single descriptor by name.
    pub fn describe(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Whether a tool name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered tool names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Render the catalog as the initialize handshake's capability map.
    pub fn capability_map(&self) -> BTreeMap<String, ToolCapability> {
        self.descriptors
            .iter()
            .map(|d| {
                (
                    d.name.clone(),
                    ToolCapability {
                        description: d.description.clone(),
                        input_schema: d.input_schema.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Normalize a raw parameter schema into the canonical triple.
///
/// Missing `type`, `properties`, or `required` are default-filled, not
/// rejected: clients rely on every tool advertising a complete object
/// schema.
fn normalize_schema(parameters: Option<&serde_json::Value>) -> serde_json::Value {
    let schema_type = parameters
        .and_then(|p| p.get("type"))
        .and_then(|t| t.as_str())
        .unwrap_or("object");
    let properties = parameters
        .and_then(|p| p.get("properties"))
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));
    let required = parameters
        .and_then(|p| p.get("required"))
        .cloned()
        .unwrap_or_else(|| serde_json::json!([]));

    serde_json::json!({
        "type": schema_type,
        "properties": properties,
        "required": required,
    })
}

/// The market-data tool catalog, in declaration order.
///
/// Six tools against the CoinGecko API; the schemas here are what
/// clients see verbatim via `tools/list`.
pub fn market_catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new("ping", "Check API server status"),
        ToolSpec::with_parameters(
            "getPrice",
            "Get price data for specified cryptocurrencies in various currencies",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ids": {
                        "type": "array",
                        "description": "ID of coins, comma-separated (e.g. bitcoin,ethereum)",
                        "items": {"type": "string"}
                    },
                    "vs_currencies": {
                        "type": "array",
                        "description": "vs_currency of coins, comma-separated (e.g. usd,eur)",
                        "items": {"type": "string"}
                    },
                    "include_market_cap": {
                        "type": "boolean",
                        "description": "Include market cap data (true/false)"
                    },
                    "include_24hr_vol": {
                        "type": "boolean",
                        "description": "Include 24hr volume (true/false)"
                    },
                    "include_24hr_change": {
                        "type": "boolean",
                        "description": "Include 24hr change (true/false)"
                    },
                    "include_last_updated_at": {
                        "type": "boolean",
                        "description": "Include last updated timestamp (true/false)"
                    },
                    "precision": {
                        "type": "string",
                        "description": "Decimal precision for price data"
                    }
                },
                "required": ["ids", "vs_currencies"]
            }),
        ),
        ToolSpec::new(
            "getSupportedVsCurrencies",
            "Get list of supported vs currencies",
        ),
        ToolSpec::with_parameters(
            "getCoinMarkets",
            "Get market data for coins",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "vs_currency": {
                        "type": "string",
                        "description": "The target currency of market data (usd, eur, jpy, etc.)"
                    },
                    "ids": {
                        "type": "string",
                        "description": "The ids of the coins, comma separated (e.g. bitcoin,ethereum)"
                    },
                    "category": {
                        "type": "string",
                        "description": "Filter by coin category"
                    },
                    "order": {
                        "type": "string",
                        "description": "Sort results by field (e.g. market_cap_desc, volume_asc)",
                        "enum": ["market_cap_desc", "market_cap_asc", "volume_desc", "volume_asc", "id_desc", "id_asc"]
                    },
                    "per_page": {
                        "type": "number",
                        "description": "Total results per page (1-250)"
                    },
                    "page": {
                        "type": "number",
                        "description": "Page number"
                    },
                    "sparkline": {
                        "type": "boolean",
                        "description": "Include sparkline 7 days data"
                    },
                    "price_change_percentage": {
                        "type": "string",
                        "description": "Include price change percentage in 1h, 24h, 7d, 14d, 30d, 200d, 1y (e.g. '1h,24h,7d')"
                    }
                },
                "required": ["vs_currency"]
            }),
        ),
        ToolSpec::new("getGlobal", "Get global cryptocurrency data"),
        ToolSpec::new("getTrending", "Get trending coins"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_declaration_order() {
        let registry = ToolRegistry::from_specs(&market_catalog());
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "ping",
                "getPrice",
                "getSupportedVsCurrencies",
                "getCoinMarkets",
                "getGlobal",
                "getTrending"
            ]
        );
    }

    #[test]
    fn test_list_is_stable() {
        let registry = ToolRegistry::from_specs(&market_catalog());
        let first: Vec<_> = registry.list().to_vec();
        let second: Vec<_> = registry.list().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_parameters_default_to_empty_object_schema() {
        let registry = ToolRegistry::from_specs(&[ToolSpec::new("bare", "No parameters")]);
        let descriptor = registry.describe("bare").unwrap();
        assert_eq!(
            descriptor.input_schema,
            serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            })
        );
    }

    #[test]
    fn test_missing_required_is_default_filled() {
        let registry = ToolRegistry::from_specs(&[ToolSpec::with_parameters(
            "partial",
            "Schema without required",
            serde_json::json!({
                "type": "object",
                "properties": {"q": {"type": "string"}}
            }),
        )]);

        let descriptor = registry.describe("partial").unwrap();
        assert_eq!(descriptor.input_schema["required"], serde_json::json!([]));
        assert_eq!(
            descriptor.input_schema["properties"]["q"]["type"],
            "string"
        );
    }

    #[test]
    fn test_empty_description_derived_from_name() {
        let registry = ToolRegistry::from_specs(&[ToolSpec::new("mystery", "")]);
        assert_eq!(
            registry.describe("mystery").unwrap().description,
            "Execute mystery method"
        );
    }

    #[test]
    fn test_describe_unknown_tool() {
        let registry = ToolRegistry::from_specs(&market_catalog());
        assert!(registry.describe("frobnicate").is_none());
    }

    #[test]
    fn test_get_price_schema_requires_ids_and_currencies() {
        let registry = ToolRegistry::from_specs(&market_catalog());
        let descriptor = registry.describe("getPrice").unwrap();
        assert_eq!(
            descriptor.input_schema["required"],
            serde_json::json!(["ids", "vs_currencies"])
        );
    }

    #[test]
    fn test_capability_map_covers_all_tools() {
        let registry = ToolRegistry::from_specs(&market_catalog());
        let map = registry.capability_map();
        assert_eq!(map.len(), registry.len());
        assert!(map.contains_key("getTrending"));
    }
}
