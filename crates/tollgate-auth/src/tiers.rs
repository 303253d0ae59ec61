//! Credential tiers and the tier-requirement table
//!
//! This module defines the access tiers for gateway operations and the
//! table mapping each operation name to the credential token it requires.
//! The table is built once at startup and read-only thereafter.

use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Access tier for a gateway operation.
///
/// Each tier above `Free` corresponds to an on-chain access token that
/// callers must hold before the operation executes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// No credential required
    Free,

    /// Basic access token
    Basic,

    /// Premium access token
    Premium,

    /// Pro access token
    Pro,
}

impl Tier {
    /// Default token id for this tier, `None` for free access.
    pub fn default_token_id(&self) -> Option<u32> {
        match self {
            Tier::Free => None,
            Tier::Basic => Some(1),
            Tier::Premium => Some(3),
            Tier::Pro => Some(5),
        }
    }

    /// Tier name as it appears in catalog output and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Basic => "basic",
            Tier::Premium => "premium",
            Tier::Pro => "pro",
        }
    }
}

/// Read-only mapping from operation name to required credential token.
///
/// An entry with no token id means the operation is callable without
/// any proof. The table is shared by the authorization gate and never
/// mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct TierTable {
    /// Operation name -> (tier, required token id).
    requirements: BTreeMap<String, (Tier, Option<u32>)>,
}

impl TierTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requirement for an operation.
    pub fn with_requirement(mut self, operation: impl Into<String>, tier: Tier) -> Self {
        let token = tier.default_token_id();
        self.requirements.insert(operation.into(), (tier, token));
        self
    }

    /// Add a requirement with an explicit token id override.
    ///
    /// Used when deployment configuration remaps a tier to a different
    /// on-chain token.
    pub fn with_token_override(
        mut self,
        operation: impl Into<String>,
        tier: Tier,
        token_id: Option<u32>,
    ) -> Self {
        self.requirements.insert(operation.into(), (tier, token_id));
        self
    }

    /// Check whether an operation requires a credential.
    ///
    /// Operations absent from the table are treated as free: the gate
    /// only restricts what the table names.
    pub fn is_protected(&self, operation: &str) -> bool {
        self.required_token(operation).is_some()
    }

    /// Required token id for an operation, `None` for free access.
    pub fn required_token(&self, operation: &str) -> Option<u32> {
        self.requirements
            .get(operation)
            .and_then(|(_, token)| *token)
    }

    /// Tier assigned to an operation, defaulting to free.
    pub fn tier_of(&self, operation: &str) -> Tier {
        self.requirements
            .get(operation)
            .map(|(tier, _)| *tier)
            .unwrap_or(Tier::Free)
    }

    /// Names of all operations the table covers.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.requirements.keys().map(String::as_str)
    }

    /// Validate the table against the set of registered operation names.
    ///
    /// Every entry must name a registered operation. A dangling entry is
    /// a startup-time configuration error, not something to discover at
    /// call time.
    pub fn validate<'a, I>(&self, registered: I) -> AuthResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: std::collections::BTreeSet<&str> = registered.into_iter().collect();
        for name in self.requirements.keys() {
            if !known.contains(name.as_str()) {
                return Err(AuthError::UnknownOperation(name.clone()));
            }
        }
        Ok(())
    }
}
