pub mod evm;
pub mod lyra;
pub mod simulated;

use alloy::primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::model::{Board, Strike, StrikeId, TradeParams, TradeResult};
use crate::strategy::{CostBound, CustodyReport, MinCollateral, Quote, Straddle};

/// A live board with its strikes resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BoardListing {
    pub board: Board,
    pub strikes: Vec<Strike>,
}

// ── Unified venue trait ─────────────────────────────────────────────

/// A place straddles can be quoted and bought: the in-process simulated
/// market or a deployed on-chain strategy contract.
///
/// The simulated implementation is trivially async; the live one does
/// JSON-RPC calls and sends transactions.
#[async_trait]
pub trait StraddleVenue: Send + Sync {
    /// Account that pays for trades and approves the strategy.
    fn trader(&self) -> Address;

    /// Address of the strategy holding straddle positions.
    fn strategy(&self) -> Address;

    async fn boards(&self) -> Result<Vec<BoardListing>>;

    async fn min_collateral(&self, strike: StrikeId, amount: U256) -> Result<MinCollateral>;

    async fn quote(&mut self, strike: StrikeId, amount: U256) -> Result<Quote>;

    /// Approve the strategy for the bound (or the current minimum collateral
    /// when unbounded) and buy the straddle.
    async fn buy(&mut self, strike: StrikeId, amount: U256, bound: CostBound) -> Result<Straddle>;

    /// Open a single position directly on the market for the trader.
    async fn open_position(&mut self, params: &TradeParams) -> Result<TradeResult>;

    async fn settlement_balance(&self, owner: Address) -> Result<U256>;

    async fn custody(&self) -> Result<CustodyReport>;
}
