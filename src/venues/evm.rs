use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::sol;
use anyhow::{Context, Result};

// ── ERC20 contract interface ───────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

// ── Providers ──────────────────────────────────────────────────────

/// Provider for view calls and `eth_call` simulations.
pub fn read_provider(rpc_url: &str) -> Result<impl Provider + Clone> {
    Ok(ProviderBuilder::new().connect_http(rpc_url.parse().context("invalid RPC URL")?))
}

/// Provider that signs and sends transactions with `private_key`.
pub fn signing_provider(private_key: &str, rpc_url: &str) -> Result<impl Provider + Clone> {
    let signer: alloy::signers::local::PrivateKeySigner = private_key
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid key: {e}"))?;
    let wallet = alloy::network::EthereumWallet::from(signer);
    Ok(ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(rpc_url.parse().context("invalid RPC URL")?))
}

pub fn require_success(receipt: &alloy::rpc::types::TransactionReceipt, label: &str) -> Result<()> {
    if !receipt.status() {
        anyhow::bail!(
            "{} tx reverted (hash: {:?}, gas_used: {:?})",
            label,
            receipt.transaction_hash,
            receipt.gas_used,
        );
    }
    Ok(())
}

// ── Utility functions ──────────────────────────────────────────────

/// On-chain uint256 handle to a u64 id.
pub fn to_u64(value: U256, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow::anyhow!("{what} {value} does not fit in u64"))
}

pub fn short_addr(addr: &Address) -> String {
    let s = format!("{addr}");
    if s.len() > 10 {
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_addr_elides_middle() {
        let short = short_addr(&Address::repeat_byte(0x11));
        assert_eq!(short, "0x1111...1111");
    }

    #[test]
    fn to_u64_rejects_large_handles() {
        assert_eq!(to_u64(U256::from(7u64), "strike").unwrap(), 7);
        assert!(to_u64(U256::MAX, "strike").is_err());
    }
}
