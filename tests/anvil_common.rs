#![allow(dead_code)]

use std::path::PathBuf;

use alloy::node_bindings::Anvil;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::sol;

use straddle_flow::model::Chain;
use straddle_flow::run::config::{Deployment, RuntimeConfig, default_deployment_path};

// ── Test-only contract interfaces ────────────────────────────────────

sol! {
    #[sol(rpc)]
    contract IERC20Test {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

// ── Fork context ─────────────────────────────────────────────────────

pub struct ForkContext {
    pub _anvil: alloy::node_bindings::AnvilInstance,
    pub rpc_url: String,
    pub wallet_address: Address,
    pub private_key: String,
    /// Second dev account: no quote asset and no approvals on the fork.
    pub fresh_address: Address,
    pub fresh_private_key: String,
    pub deployment: Deployment,
}

/// Deployment manifest named by `STRADDLE_FLOW_DEPLOYMENT`, else the default path.
pub fn load_deployment() -> Deployment {
    let path = std::env::var("STRADDLE_FLOW_DEPLOYMENT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_deployment_path());
    Deployment::load(&path).expect("deployment manifest")
}

/// Spawn an Anvil fork of the node the deployment lives on.
///
/// Anvil's first dev account is the one the Lyra test system deploys and
/// funds with, so the fork's wallet already holds quote asset.
pub fn spawn_fork(deployment: Deployment) -> ForkContext {
    let chain = deployment.chain.resolved();
    let fork_url = chain.rpc_url().expect("deployment chain has no RPC URL");
    let anvil = Anvil::new()
        .fork(fork_url)
        .chain_id(chain.chain_id().unwrap_or(31337))
        .spawn();

    let rpc_url = anvil.endpoint();
    let wallet_address = anvil.addresses()[0];
    let private_key = hex::encode(anvil.keys()[0].to_bytes());
    let fresh_address = anvil.addresses()[1];
    let fresh_private_key = hex::encode(anvil.keys()[1].to_bytes());

    let mut deployment = deployment;
    deployment.chain = Chain::custom(chain.name.clone(), anvil.chain_id(), rpc_url.clone());

    ForkContext {
        _anvil: anvil,
        rpc_url,
        wallet_address,
        private_key,
        fresh_address,
        fresh_private_key,
        deployment,
    }
}

// ── Funding ──────────────────────────────────────────────────────────

/// Fund native ETH via anvil_setBalance.
pub async fn fund_eth(rpc_url: &str, addr: Address, amount: U256) {
    let provider = ProviderBuilder::new().connect_http(rpc_url.parse().unwrap());
    let _: () = provider
        .raw_request("anvil_setBalance".into(), (addr, amount))
        .await
        .expect("anvil_setBalance failed");
}

/// Move quote asset between accounts by impersonating `from`.
pub async fn transfer_as(rpc_url: &str, token: Address, from: Address, to: Address, amount: U256) {
    let provider = ProviderBuilder::new().connect_http(rpc_url.parse().unwrap());

    let _: () = provider
        .raw_request("anvil_impersonateAccount".into(), [from])
        .await
        .expect("anvil_impersonateAccount failed");

    let erc20 = IERC20Test::new(token, &provider);
    erc20
        .transfer(to, amount)
        .from(from)
        .send()
        .await
        .expect("ERC20 transfer failed")
        .get_receipt()
        .await
        .expect("ERC20 transfer receipt failed");

    let _: () = provider
        .raw_request("anvil_stopImpersonatingAccount".into(), [from])
        .await
        .expect("anvil_stopImpersonatingAccount failed");
}

/// Query ERC20 balance.
pub async fn balance_of(rpc_url: &str, token: Address, account: Address) -> U256 {
    let provider = ProviderBuilder::new().connect_http(rpc_url.parse().unwrap());
    let erc20 = IERC20Test::new(token, &provider);
    erc20
        .balanceOf(account)
        .call()
        .await
        .expect("balanceOf call failed")
}

pub async fn allowance(rpc_url: &str, token: Address, owner: Address, spender: Address) -> U256 {
    let provider = ProviderBuilder::new().connect_http(rpc_url.parse().unwrap());
    let erc20 = IERC20Test::new(token, &provider);
    erc20
        .allowance(owner, spender)
        .call()
        .await
        .expect("allowance call failed")
}

// ── Config builders ──────────────────────────────────────────────────

pub fn make_config(ctx: &ForkContext) -> RuntimeConfig {
    RuntimeConfig::new(ctx.deployment.clone(), Some(ctx.private_key.clone()), false)
        .expect("runtime config")
}

/// Config signing as the fork's second, never-used account.
pub fn make_fresh_config(ctx: &ForkContext) -> RuntimeConfig {
    RuntimeConfig::new(ctx.deployment.clone(), Some(ctx.fresh_private_key.clone()), false)
        .expect("runtime config")
}
