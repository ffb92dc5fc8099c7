use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Chain;

pub const PRIVATE_KEY_ENV: &str = "STRADDLE_FLOW_PRIVATE_KEY";

/// Addresses of a deployed Lyra test system plus the straddle strategy.
///
/// Written by the deployment scripts; read by every live command.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Deployment {
    pub chain: Chain,
    /// OptionMarket contract.
    pub option_market: String,
    /// OptionToken (position NFT) contract.
    pub option_token: String,
    /// Quote asset (sUSD) ERC20.
    pub quote_asset: String,
    /// Deployed StraddleStrategy contract.
    pub straddle_strategy: String,
}

/// `Deployment` with its addresses parsed.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentAddresses {
    pub option_market: Address,
    pub option_token: Address,
    pub quote_asset: Address,
    pub straddle_strategy: Address,
}

impl Deployment {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading deployment manifest {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing deployment manifest {}", path.display()))
    }

    pub fn addresses(&self) -> Result<DeploymentAddresses> {
        Ok(DeploymentAddresses {
            option_market: parse_address("option_market", &self.option_market)?,
            option_token: parse_address("option_token", &self.option_token)?,
            quote_asset: parse_address("quote_asset", &self.quote_asset)?,
            straddle_strategy: parse_address("straddle_strategy", &self.straddle_strategy)?,
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .parse()
        .with_context(|| format!("deployment field '{field}' is not an address: {value}"))
}

/// `~/.straddle-flow/deployment.json`
pub fn default_deployment_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".straddle-flow")
        .join("deployment.json")
}

/// Runtime configuration for live commands.
pub struct RuntimeConfig {
    pub deployment: Deployment,
    /// Derived from the private key when one is set.
    pub wallet_address: Option<Address>,
    pub private_key: Option<String>,
    pub dry_run: bool,
}

impl RuntimeConfig {
    /// Load the manifest and pick up the signing key from the environment.
    /// The key is optional so read-only commands work without one.
    pub fn from_cli(deployment_path: Option<&Path>, dry_run: bool) -> Result<Self> {
        let path = deployment_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_deployment_path);
        let deployment = Deployment::load(&path)?;
        let private_key = std::env::var(PRIVATE_KEY_ENV).ok();
        Self::new(deployment, private_key, dry_run)
    }

    pub fn new(deployment: Deployment, private_key: Option<String>, dry_run: bool) -> Result<Self> {
        let wallet_address = match &private_key {
            Some(key) => {
                use alloy::signers::local::PrivateKeySigner;
                let signer: PrivateKeySigner = key
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid private key in {PRIVATE_KEY_ENV}: {e}"))?;
                Some(signer.address())
            }
            None => None,
        };

        Ok(RuntimeConfig {
            deployment,
            wallet_address,
            private_key,
            dry_run,
        })
    }
}
