use alloy::primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::collateral::MinCollateral;
use super::quote::Quote;
use super::transaction::Transaction;
use super::{ExecutionStage, StraddleError, StraddleStrategy};
use crate::market::{Journaled, MarketGateway, SettlementAsset};
use crate::model::{OptionType, Position, StrikeId, TradeParams, TradeResult};

/// Caller's protection against paying more than expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBound {
    /// No protection: pay whatever the market charges at execution time.
    Unbounded,
    /// Abort with `CostExceeded` if the straddle costs more than this.
    MaxCost(U256),
}

impl CostBound {
    pub fn max_cost(&self) -> Option<U256> {
        match self {
            CostBound::Unbounded => None,
            CostBound::MaxCost(max) => Some(*max),
        }
    }
}

/// One long call and one long put on the same strike and amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Straddle {
    pub long_call: Position,
    pub long_put: Position,
    pub call_cost: U256,
    pub put_cost: U256,
    /// What left the payer's balance.
    pub total_cost: U256,
}

impl<M, A> StraddleStrategy<M, A>
where
    M: MarketGateway + Journaled,
    A: SettlementAsset + Journaled,
{
    /// Atomically buy a straddle of `amount` on `strike`, paid by `caller`.
    ///
    /// `caller` must have approved this strategy for at least the straddle's
    /// cost. On success both positions belong to the strategy and its
    /// settlement balance is back where it started. On any error nothing
    /// has changed.
    pub fn buy_straddle(
        &mut self,
        caller: Address,
        strike: StrikeId,
        amount: U256,
        bound: CostBound,
    ) -> Result<Straddle, StraddleError> {
        let mut stage = ExecutionStage::Idle;
        match self.try_buy(caller, strike, amount, bound, &mut stage) {
            Ok(straddle) => {
                info!(
                    strike = %strike,
                    amount = %amount,
                    cost = %straddle.total_cost,
                    call = %straddle.long_call.id,
                    put = %straddle.long_put.id,
                    "straddle settled"
                );
                Ok(straddle)
            }
            Err(e) => {
                warn!(strike = %strike, amount = %amount, stage = %stage, error = %e, "straddle aborted");
                advance(&mut stage, ExecutionStage::Aborted);
                Err(e)
            }
        }
    }

    /// Buy at a previously fetched quote, tolerating `slippage_bps` of price
    /// movement. A larger move fails with `StalePrice`.
    pub fn buy_quoted(
        &mut self,
        caller: Address,
        quote: &Quote,
        slippage_bps: u64,
    ) -> Result<Straddle, StraddleError> {
        let bound = CostBound::MaxCost(quote.max_cost(slippage_bps));
        match self.buy_straddle(caller, quote.strike_id, quote.amount, bound) {
            Err(StraddleError::CostExceeded { required, .. }) => Err(StraddleError::StalePrice {
                quoted: quote.estimated_cost,
                actual: required,
            }),
            other => other,
        }
    }

    fn try_buy(
        &mut self,
        caller: Address,
        strike: StrikeId,
        amount: U256,
        bound: CostBound,
        stage: &mut ExecutionStage,
    ) -> Result<Straddle, StraddleError> {
        self.validate(strike, amount)?;
        advance(stage, ExecutionStage::Validated);

        let legs = self.leg_costs(strike, amount)?;
        advance(stage, ExecutionStage::Quoted);

        if let Some(max_cost) = bound.max_cost() {
            let required = legs.total();
            if required > max_cost {
                return Err(StraddleError::CostExceeded { required, max_cost });
            }
        }

        let executor = self.address;
        let idle = self.asset.balance_of(executor);
        if !idle.is_zero() {
            warn!(balance = %idle, "strategy holds settlement balance before straddle");
        }

        let mut tx = Transaction::begin(&mut self.market, &mut self.asset);
        let straddle = purchase(&mut tx, executor, caller, strike, amount, &legs, stage)?;
        tx.commit();
        advance(stage, ExecutionStage::Settled);

        Ok(straddle)
    }
}

/// Pull funds from `payer`, open both legs for `executor`, and return any
/// unspent residue to `payer`. Shared by real execution and dry-run quotes.
pub(crate) fn purchase<M, A>(
    tx: &mut Transaction<'_, M, A>,
    executor: Address,
    payer: Address,
    strike: StrikeId,
    amount: U256,
    legs: &MinCollateral,
    stage: &mut ExecutionStage,
) -> Result<Straddle, StraddleError>
where
    M: MarketGateway + Journaled,
    A: SettlementAsset + Journaled,
{
    let required = legs.total();
    let starting_balance = tx.asset().balance_of(executor);

    tx.asset()
        .transfer_from(executor, payer, executor, required)
        .map_err(StraddleError::from_token)?;
    advance(stage, ExecutionStage::FundsPulled);

    let market_addr = tx.market().address();
    tx.asset().approve(executor, market_addr, required);

    let call = open_leg(tx, executor, strike, OptionType::LongCall, amount, legs.call_collateral)?;
    advance(stage, ExecutionStage::Leg1Open);

    let put = open_leg(tx, executor, strike, OptionType::LongPut, amount, legs.put_collateral)?;
    advance(stage, ExecutionStage::Leg2Open);

    tx.asset().approve(executor, market_addr, U256::ZERO);

    let residue = tx
        .asset()
        .balance_of(executor)
        .saturating_sub(starting_balance);
    if !residue.is_zero() {
        debug!(residue = %residue, "refunding unspent funds");
        tx.asset()
            .transfer(executor, payer, residue)
            .map_err(StraddleError::from_token)?;
    }

    Ok(Straddle {
        call_cost: call.total_cost,
        put_cost: put.total_cost,
        total_cost: required - residue,
        long_call: call.position,
        long_put: put.position,
    })
}

fn open_leg<M, A>(
    tx: &mut Transaction<'_, M, A>,
    executor: Address,
    strike: StrikeId,
    leg: OptionType,
    amount: U256,
    max_cost: U256,
) -> Result<TradeResult, StraddleError>
where
    M: MarketGateway + Journaled,
    A: SettlementAsset + Journaled,
{
    let params = TradeParams::open_long(strike, leg, amount).with_max_total_cost(max_cost);
    let (market, asset) = tx.parts();
    market
        .open_position(asset, executor, &params)
        .map_err(|source| StraddleError::MarketGatewayFailure { leg, source })
}

fn advance(stage: &mut ExecutionStage, next: ExecutionStage) {
    debug!(from = %stage, to = %next, "straddle stage");
    *stage = next;
}
