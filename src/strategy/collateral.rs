use alloy::primitives::U256;
use serde::Serialize;

use super::{StraddleError, StraddleStrategy};
use crate::market::{MarketGateway, SettlementAsset};
use crate::model::{OptionType, StrikeId, TradeParams};

/// Funds each leg of a straddle must be backed by at current market
/// parameters (premium plus fees for a long position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinCollateral {
    pub call_collateral: U256,
    pub put_collateral: U256,
}

impl MinCollateral {
    pub fn total(&self) -> U256 {
        self.call_collateral.saturating_add(self.put_collateral)
    }
}

impl<M: MarketGateway, A: SettlementAsset> StraddleStrategy<M, A> {
    /// Minimum funds for one long call and one long put of `amount` on `strike`.
    ///
    /// Priced through the market itself, so the figure cannot drift from what
    /// `open_position` will charge.
    pub fn min_collateral(&self, strike: StrikeId, amount: U256) -> Result<MinCollateral, StraddleError> {
        self.validate(strike, amount)?;
        self.leg_costs(strike, amount)
    }

    /// Reject unknown, expired or frozen strikes and zero amounts.
    pub(crate) fn validate(&self, strike: StrikeId, amount: U256) -> Result<(), StraddleError> {
        if amount.is_zero() {
            return Err(StraddleError::InvalidAmount);
        }

        let invalid = |reason: String| StraddleError::InvalidStrike { strike, reason };

        let s = self
            .market
            .strike(strike)
            .ok_or_else(|| invalid("strike does not exist".into()))?;
        let board = self
            .market
            .board(s.board_id)
            .ok_or_else(|| invalid(format!("board {} does not exist", s.board_id)))?;

        let now = self.market.timestamp();
        if !board.is_tradable(now) {
            let reason = if board.frozen {
                format!("board {} is frozen", board.id)
            } else {
                format!("board {} expired at {} (now {})", board.id, board.expiry, now)
            };
            return Err(invalid(reason));
        }
        Ok(())
    }

    pub(crate) fn leg_costs(&self, strike: StrikeId, amount: U256) -> Result<MinCollateral, StraddleError> {
        let price = |leg: OptionType| {
            self.market
                .price_trade(&TradeParams::open_long(strike, leg, amount))
                .map(|c| c.total_cost)
                .map_err(|e| StraddleError::from_gateway(strike, leg, e))
        };

        Ok(MinCollateral {
            call_collateral: price(OptionType::LongCall)?,
            put_collateral: price(OptionType::LongPut)?,
        })
    }
}
