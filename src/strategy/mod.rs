//! The straddle engine: collateral calculation, dry-run quoting and atomic
//! two-leg execution on top of a [`MarketGateway`] and a [`SettlementAsset`].

pub mod collateral;
pub mod error;
pub mod execute;
pub mod quote;
pub mod report;
mod transaction;

use std::fmt;

use alloy::primitives::Address;

use crate::market::{MarketGateway, SettlementAsset};

pub use collateral::MinCollateral;
pub use error::StraddleError;
pub use execute::{CostBound, Straddle};
pub use quote::Quote;
pub use report::CustodyReport;

/// Progress of one `buy_straddle` call. Any failure after `Idle` ends in
/// `Aborted` with every effect since `Idle` undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStage {
    Idle,
    Validated,
    Quoted,
    FundsPulled,
    Leg1Open,
    Leg2Open,
    Settled,
    Aborted,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Opens long-call + long-put pairs on one strike, holding the resulting
/// positions under its own address.
#[derive(Debug)]
pub struct StraddleStrategy<M, A> {
    address: Address,
    quoter_helper: Address,
    market: M,
    asset: A,
}

impl<M: MarketGateway, A: SettlementAsset> StraddleStrategy<M, A> {
    pub fn new(address: Address, market: M, asset: A) -> Self {
        StraddleStrategy {
            address,
            quoter_helper: default_quoter_helper(address),
            market,
            asset,
        }
    }

    /// The account positions and in-flight funds are held under.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn quoter_helper(&self) -> Address {
        self.quoter_helper
    }

    pub fn market(&self) -> &M {
        &self.market
    }

    pub fn market_mut(&mut self) -> &mut M {
        &mut self.market
    }

    pub fn asset(&self) -> &A {
        &self.asset
    }

    pub fn asset_mut(&mut self) -> &mut A {
        &mut self.asset
    }

    /// Market and asset together, for trades that bypass the strategy.
    pub fn parts_mut(&mut self) -> (&mut M, &mut A) {
        (&mut self.market, &mut self.asset)
    }
}

/// Scratch account for quotes: the strategy address with every byte inverted.
fn default_quoter_helper(strategy: Address) -> Address {
    let mut bytes = strategy.0.0;
    for b in bytes.iter_mut() {
        *b = !*b;
    }
    Address::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoter_helper_differs_from_strategy() {
        let strategy = Address::repeat_byte(0x5a);
        let helper = default_quoter_helper(strategy);
        assert_ne!(helper, strategy);
        assert_eq!(helper, Address::repeat_byte(0xa5));
    }
}
