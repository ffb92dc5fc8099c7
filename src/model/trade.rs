use alloy::primitives::{Address, U256};
use serde::Serialize;

use super::option::{OptionType, Position, PositionId, StrikeId};

/// Input to the market's `openPosition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeParams {
    pub strike_id: StrikeId,
    /// `PositionId(0)` mints a new position.
    pub position_id: PositionId,
    pub option_type: OptionType,
    pub amount: U256,
    /// Collateral to lock. Always zero for long positions.
    pub set_collateral_to: U256,
    /// Number of sub-orders the market splits the trade into for pricing.
    pub iterations: u32,
    pub min_total_cost: U256,
    pub max_total_cost: U256,
    pub referrer: Address,
}

impl TradeParams {
    /// A new long position with no cost bounds.
    pub fn open_long(strike_id: StrikeId, option_type: OptionType, amount: U256) -> Self {
        TradeParams {
            strike_id,
            position_id: PositionId(0),
            option_type,
            amount,
            set_collateral_to: U256::ZERO,
            iterations: 1,
            min_total_cost: U256::ZERO,
            max_total_cost: U256::MAX,
            referrer: Address::ZERO,
        }
    }

    pub fn with_max_total_cost(mut self, max_total_cost: U256) -> Self {
        self.max_total_cost = max_total_cost;
        self
    }
}

/// What the market would charge for a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeCost {
    pub premium: U256,
    pub fee: U256,
    /// `premium + fee`; what leaves the trader's balance.
    pub total_cost: U256,
}

/// Outcome of a successful `openPosition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeResult {
    pub position: Position,
    pub total_cost: U256,
    pub total_fee: U256,
}
