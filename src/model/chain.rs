use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The EVM chain a market deployment lives on.
///
/// In JSON: `{"name": "local", "chain_id": 31337, "rpc_url": "http://127.0.0.1:8545"}`.
/// `chain_id` and `rpc_url` may be omitted for known chain names and are
/// filled from the built-in table by [`Chain::resolved`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Chain {
    /// Human-readable chain name (e.g. "local", "optimism", "arbitrum").
    pub name: String,
    /// EVM chain ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// JSON-RPC endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

// ── Methods ──────────────────────────────────────────────────────────

impl Chain {
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_url.as_deref()
    }

    /// Fill missing `chain_id`/`rpc_url` from the known chain with the same name.
    pub fn resolved(&self) -> Self {
        let known = Self::from_name(&self.name);
        Chain {
            name: self.name.clone(),
            chain_id: self.chain_id.or(known.chain_id),
            rpc_url: self.rpc_url.clone().or(known.rpc_url),
        }
    }
}

// ── Convenience constructors ─────────────────────────────────────────

impl Chain {
    /// Hardhat / anvil node the Lyra test system deploys to.
    pub fn local() -> Self {
        Chain {
            name: "local".into(),
            chain_id: Some(31337),
            rpc_url: Some("http://127.0.0.1:8545".into()),
        }
    }
    pub fn optimism() -> Self {
        Chain {
            name: "optimism".into(),
            chain_id: Some(10),
            rpc_url: Some("https://mainnet.optimism.io".into()),
        }
    }
    pub fn arbitrum() -> Self {
        Chain {
            name: "arbitrum".into(),
            chain_id: Some(42161),
            rpc_url: Some("https://arb1.arbitrum.io/rpc".into()),
        }
    }

    /// Match a known chain by name; unknown names get no chain_id/rpc_url.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "local" | "hardhat" | "anvil" => Self::local(),
            "optimism" => Self::optimism(),
            "arbitrum" => Self::arbitrum(),
            _ => Chain {
                name: name.into(),
                chain_id: None,
                rpc_url: None,
            },
        }
    }

    pub fn custom(name: impl Into<String>, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Chain {
            name: name.into(),
            chain_id: Some(chain_id),
            rpc_url: Some(rpc_url.into()),
        }
    }
}

// ── Display ──────────────────────────────────────────────────────────

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_fills_known_chain() {
        let partial = Chain {
            name: "optimism".into(),
            chain_id: None,
            rpc_url: Some("http://my-node:8545".into()),
        };
        let r = partial.resolved();
        assert_eq!(r.chain_id(), Some(10));
        assert_eq!(r.rpc_url(), Some("http://my-node:8545"));
    }
}
