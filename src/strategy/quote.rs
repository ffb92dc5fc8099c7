use alloy::primitives::U256;
use serde::Serialize;
use tracing::debug;

use super::execute::purchase;
use super::transaction::Transaction;
use super::{ExecutionStage, StraddleError, StraddleStrategy};
use crate::market::{Journaled, MarketGateway, ScratchFunding};
use crate::model::StrikeId;
use crate::model::amount::{UNIT, add_bps};

/// Balance credited to the quoter helper for the length of one dry run.
fn scratch_funds() -> U256 {
    UNIT * U256::from(1_000_000_000_000u64)
}

/// Advisory cost of a straddle at the moment it was quoted.
///
/// Holds no reservation: the market may move before execution, so the cost
/// actually charged can differ. Pass it to `buy_quoted` with a slippage
/// tolerance to bound that difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub strike_id: StrikeId,
    pub amount: U256,
    pub call_cost: U256,
    pub put_cost: U256,
    pub estimated_cost: U256,
    /// Market timestamp the quote was taken at.
    pub quoted_at: u64,
}

impl Quote {
    /// The estimate grown by `slippage_bps` basis points.
    pub fn max_cost(&self, slippage_bps: u64) -> U256 {
        add_bps(self.estimated_cost, slippage_bps)
    }
}

impl<M, A> StraddleStrategy<M, A>
where
    M: MarketGateway + Journaled,
    A: ScratchFunding + Journaled,
{
    /// Simulate `buy_straddle(strike, amount)` and report what it would cost.
    ///
    /// Runs the real purchase path with a scratch-funded helper as payer, then
    /// reverts every effect. No balance, allowance or position survives.
    pub fn quote_buy_straddle(&mut self, strike: StrikeId, amount: U256) -> Result<Quote, StraddleError> {
        self.validate(strike, amount)?;
        let legs = self.leg_costs(strike, amount)?;

        let executor = self.address;
        let helper = self.quoter_helper;

        let mut tx = Transaction::begin(&mut self.market, &mut self.asset);
        let quoted_at = tx.market().timestamp();

        tx.asset()
            .fund_scratch(helper, scratch_funds())
            .map_err(StraddleError::from_token)?;
        tx.asset().approve(helper, executor, U256::MAX);
        let funded = tx.asset().balance_of(helper);

        let mut stage = ExecutionStage::Quoted;
        let straddle = purchase(&mut tx, executor, helper, strike, amount, &legs, &mut stage)?;
        let spent = funded.saturating_sub(tx.asset().balance_of(helper));
        drop(tx);

        debug!(strike = %strike, amount = %amount, cost = %spent, "straddle quoted");

        Ok(Quote {
            strike_id: strike,
            amount,
            call_cost: straddle.call_cost,
            put_cost: straddle.put_cost,
            estimated_cost: spent,
            quoted_at,
        })
    }
}
