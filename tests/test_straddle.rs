use alloy::primitives::{Address, U256};

use straddle_flow::market::{
    GatewayError, Journaled, MarketGateway, ScratchFunding, SettlementAsset,
};
use straddle_flow::model::amount::UNIT;
use straddle_flow::model::{
    Board, BoardId, OptionType, Position, Strike, StrikeId, TradeCost, TradeParams, TradeResult,
};
use straddle_flow::sim::journal::SnapshotId;
use straddle_flow::sim::seed::{self, ONE_WEEK, Seed};
use straddle_flow::sim::{SimulatedMarket, SimulatedToken, StrikePricing};
use straddle_flow::strategy::{CostBound, StraddleError, StraddleStrategy};

// ── Wrapper gateway ─────────────────────────────────────────────────

/// How `WrappedMarket` deviates from the simulated market it wraps.
#[derive(Clone, Copy, PartialEq)]
enum Fault {
    None,
    /// Reject every LONG_PUT open.
    RejectPut,
    /// Quote each leg `extra` above what `open_position` charges.
    Overprice { extra: U256 },
}

/// Simulated market with an injectable fault.
struct WrappedMarket {
    inner: SimulatedMarket,
    fault: Fault,
}

impl MarketGateway for WrappedMarket {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn timestamp(&self) -> u64 {
        self.inner.timestamp()
    }

    fn live_boards(&self) -> Vec<BoardId> {
        self.inner.live_boards()
    }

    fn board(&self, id: BoardId) -> Option<Board> {
        self.inner.board(id)
    }

    fn board_strikes(&self, id: BoardId) -> Result<Vec<StrikeId>, GatewayError> {
        self.inner.board_strikes(id)
    }

    fn strike(&self, id: StrikeId) -> Option<Strike> {
        self.inner.strike(id)
    }

    fn price_trade(&self, params: &TradeParams) -> Result<TradeCost, GatewayError> {
        let mut cost = self.inner.price_trade(params)?;
        if let Fault::Overprice { extra } = self.fault {
            cost.total_cost += extra;
        }
        Ok(cost)
    }

    fn open_position(
        &mut self,
        asset: &mut dyn SettlementAsset,
        trader: Address,
        params: &TradeParams,
    ) -> Result<TradeResult, GatewayError> {
        if self.fault == Fault::RejectPut && params.option_type == OptionType::LongPut {
            return Err(GatewayError::Rejected("put leg disabled".into()));
        }
        self.inner.open_position(asset, trader, params)
    }

    fn owner_positions(&self, owner: Address) -> Vec<Position> {
        self.inner.owner_positions(owner)
    }
}

impl Journaled for WrappedMarket {
    type Checkpoint = SnapshotId;

    fn checkpoint(&mut self) -> SnapshotId {
        self.inner.checkpoint()
    }

    fn commit(&mut self, checkpoint: SnapshotId) {
        self.inner.commit(checkpoint)
    }

    fn revert_to(&mut self, checkpoint: SnapshotId) {
        self.inner.revert_to(checkpoint)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

type Strategy = StraddleStrategy<WrappedMarket, SimulatedToken>;

const STRIKE: StrikeId = StrikeId(1);

fn strategy_with(fault: Fault) -> Strategy {
    let (market, token) = seed::seed_market(&Seed::default()).unwrap();
    StraddleStrategy::new(
        seed::strategy_address(),
        WrappedMarket {
            inner: market,
            fault,
        },
        token,
    )
}

fn strategy() -> Strategy {
    strategy_with(Fault::None)
}

fn trader() -> Address {
    seed::deployer()
}

fn units(n: u64) -> U256 {
    UNIT * U256::from(n)
}

/// Everything a failed or dry-run call must leave untouched.
#[derive(Debug, PartialEq)]
struct Snapshot {
    trader_balance: U256,
    strategy_balance: U256,
    pool_balance: U256,
    helper_balance: U256,
    total_supply: U256,
    allowance: U256,
    strategy_positions: Vec<Position>,
    helper_positions: Vec<Position>,
}

fn snapshot(s: &Strategy) -> Snapshot {
    Snapshot {
        trader_balance: s.asset().balance_of(trader()),
        strategy_balance: s.asset().balance_of(s.address()),
        pool_balance: s.asset().balance_of(seed::pool_address()),
        helper_balance: s.asset().balance_of(s.quoter_helper()),
        total_supply: s.asset().total_supply(),
        allowance: s.asset().allowance(trader(), s.address()),
        strategy_positions: s.market().owner_positions(s.address()),
        helper_positions: s.market().owner_positions(s.quoter_helper()),
    }
}

fn approve(s: &mut Strategy, amount: U256) {
    let spender = s.address();
    s.asset_mut().approve(trader(), spender, amount);
}

// ── Collateral ──────────────────────────────────────────────────────

#[test]
fn min_collateral_includes_fee() {
    let s = strategy();
    let mc = s.min_collateral(STRIKE, UNIT).unwrap();

    // 1500 strike: 262 call, 18 put, 1% fee.
    assert_eq!(mc.call_collateral, units(262) + units(262) / U256::from(100u64));
    assert_eq!(mc.put_collateral, units(18) + units(18) / U256::from(100u64));
    assert_eq!(mc.total(), mc.call_collateral + mc.put_collateral);
}

#[test]
fn min_collateral_scales_with_amount() {
    let s = strategy();
    let one = s.min_collateral(STRIKE, UNIT).unwrap();
    let three = s.min_collateral(STRIKE, units(3)).unwrap();
    assert_eq!(three.call_collateral, one.call_collateral * U256::from(3u64));
    assert_eq!(three.put_collateral, one.put_collateral * U256::from(3u64));
}

#[test]
fn zero_amount_is_invalid_everywhere() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    let before = snapshot(&s);

    assert_eq!(s.min_collateral(STRIKE, U256::ZERO), Err(StraddleError::InvalidAmount));
    assert_eq!(
        s.quote_buy_straddle(STRIKE, U256::ZERO),
        Err(StraddleError::InvalidAmount)
    );
    assert!(matches!(
        s.buy_straddle(trader(), STRIKE, U256::ZERO, CostBound::Unbounded),
        Err(StraddleError::InvalidAmount)
    ));
    assert_eq!(snapshot(&s), before);
}

#[test]
fn unknown_strike_is_invalid() {
    let s = strategy();
    let err = s.min_collateral(StrikeId(99), UNIT).unwrap_err();
    assert!(matches!(err, StraddleError::InvalidStrike { strike: StrikeId(99), .. }));
}

#[test]
fn expired_strike_is_invalid() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    s.market_mut().inner.advance_time(ONE_WEEK);
    let before = snapshot(&s);

    assert!(matches!(
        s.min_collateral(STRIKE, UNIT),
        Err(StraddleError::InvalidStrike { .. })
    ));
    assert!(matches!(
        s.quote_buy_straddle(STRIKE, UNIT),
        Err(StraddleError::InvalidStrike { .. })
    ));
    assert!(matches!(
        s.buy_straddle(trader(), STRIKE, UNIT, CostBound::Unbounded),
        Err(StraddleError::InvalidStrike { .. })
    ));
    assert_eq!(snapshot(&s), before);
}

#[test]
fn frozen_board_is_invalid() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    s.market_mut().inner.set_board_frozen(BoardId(1), true).unwrap();

    let err = s
        .buy_straddle(trader(), STRIKE, UNIT, CostBound::Unbounded)
        .unwrap_err();
    assert!(matches!(err, StraddleError::InvalidStrike { .. }));
    assert!(err.to_string().contains("frozen"));
}

// ── Execution ───────────────────────────────────────────────────────

#[test]
fn approving_both_legs_buys_straddle() {
    let mut s = strategy();
    let mc = s.min_collateral(STRIKE, UNIT).unwrap();
    approve(&mut s, mc.total());
    let before = snapshot(&s);

    let straddle = s
        .buy_straddle(trader(), STRIKE, UNIT, CostBound::Unbounded)
        .unwrap();

    assert_eq!(straddle.long_call.option_type, OptionType::LongCall);
    assert_eq!(straddle.long_put.option_type, OptionType::LongPut);
    assert_eq!(straddle.long_call.strike_id, STRIKE);
    assert_eq!(straddle.long_put.strike_id, STRIKE);
    assert_eq!(straddle.long_call.amount, UNIT);
    assert_eq!(straddle.long_put.amount, UNIT);
    assert_eq!(straddle.call_cost, mc.call_collateral);
    assert_eq!(straddle.put_cost, mc.put_collateral);
    assert_eq!(straddle.total_cost, mc.total());

    let after = snapshot(&s);
    assert_eq!(after.trader_balance, before.trader_balance - mc.total());
    assert_eq!(after.pool_balance, before.pool_balance + mc.total());
    assert_eq!(after.strategy_balance, U256::ZERO);
    assert_eq!(after.allowance, U256::ZERO);
    assert_eq!(after.strategy_positions.len(), 2);
    assert_eq!(s.market().inner.position_count(s.address()), 2);
    assert_eq!(s.asset().allowance(s.address(), s.market().address()), U256::ZERO);
}

#[test]
fn approving_only_call_leg_fails_without_trace() {
    let mut s = strategy();
    let mc = s.min_collateral(STRIKE, UNIT).unwrap();
    approve(&mut s, mc.call_collateral);
    let before = snapshot(&s);

    let err = s
        .buy_straddle(trader(), STRIKE, UNIT, CostBound::Unbounded)
        .unwrap_err();

    assert_eq!(
        err,
        StraddleError::InsufficientAllowance {
            allowance: mc.call_collateral,
            required: mc.total(),
        }
    );
    assert_eq!(snapshot(&s), before);
    assert!(s.market().owner_positions(s.address()).is_empty());
}

#[test]
fn unfunded_caller_fails_with_insufficient_balance() {
    let mut s = strategy();
    let broke = Address::repeat_byte(0xbb);
    let spender = s.address();
    s.asset_mut().approve(broke, spender, U256::MAX);

    let err = s
        .buy_straddle(broke, STRIKE, UNIT, CostBound::Unbounded)
        .unwrap_err();
    assert!(matches!(err, StraddleError::InsufficientBalance { balance, .. } if balance.is_zero()));
    assert!(s.market().owner_positions(s.address()).is_empty());
}

#[test]
fn max_cost_below_estimate_is_rejected() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    let quote = s.quote_buy_straddle(STRIKE, UNIT).unwrap();
    let before = snapshot(&s);

    let max_cost = quote.estimated_cost - U256::from(1u64);
    let err = s
        .buy_straddle(trader(), STRIKE, UNIT, CostBound::MaxCost(max_cost))
        .unwrap_err();

    assert_eq!(
        err,
        StraddleError::CostExceeded {
            required: quote.estimated_cost,
            max_cost,
        }
    );
    assert_eq!(snapshot(&s), before);
}

#[test]
fn max_cost_at_estimate_succeeds() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    let quote = s.quote_buy_straddle(STRIKE, UNIT).unwrap();

    let straddle = s
        .buy_straddle(trader(), STRIKE, UNIT, CostBound::MaxCost(quote.estimated_cost))
        .unwrap();
    assert_eq!(straddle.total_cost, quote.estimated_cost);
}

#[test]
fn second_leg_failure_undoes_first_leg() {
    let mut s = strategy_with(Fault::RejectPut);
    approve(&mut s, U256::MAX);
    let before = snapshot(&s);

    let err = s
        .buy_straddle(trader(), STRIKE, UNIT, CostBound::Unbounded)
        .unwrap_err();

    match err {
        StraddleError::MarketGatewayFailure { leg, source } => {
            assert_eq!(leg, OptionType::LongPut);
            assert!(matches!(source, GatewayError::Rejected(_)));
        }
        other => panic!("expected gateway failure, got {other:?}"),
    }
    assert_eq!(snapshot(&s), before);
    assert_eq!(s.asset().allowance(s.address(), s.market().address()), U256::ZERO);
}

#[test]
fn unspent_funds_are_refunded_to_caller() {
    let extra = units(5);
    let mut s = strategy_with(Fault::Overprice { extra });
    approve(&mut s, U256::MAX);
    let mc = s.min_collateral(STRIKE, UNIT).unwrap();
    let before = snapshot(&s);

    let straddle = s
        .buy_straddle(trader(), STRIKE, UNIT, CostBound::Unbounded)
        .unwrap();

    let charged = mc.total() - extra - extra;
    assert_eq!(straddle.total_cost, charged);
    let after = snapshot(&s);
    assert_eq!(after.trader_balance, before.trader_balance - charged);
    assert_eq!(after.strategy_balance, U256::ZERO);
}

#[test]
fn repeated_buys_stay_paired() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);

    for strike in [StrikeId(1), StrikeId(2), StrikeId(3), StrikeId(1)] {
        s.buy_straddle(trader(), strike, units(2), CostBound::Unbounded)
            .unwrap();
    }

    let report = s.custody_report();
    assert!(report.is_settled());
    assert_eq!(report.straddle_count(), 4);
    assert!(report.unpaired().is_empty());
    assert_eq!(report.positions.len(), 8);
}

// ── Quoting ─────────────────────────────────────────────────────────

#[test]
fn quote_matches_actual_charge() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    let quote = s.quote_buy_straddle(StrikeId(2), units(3)).unwrap();
    let before = s.asset().balance_of(trader());

    let straddle = s
        .buy_straddle(trader(), StrikeId(2), units(3), CostBound::Unbounded)
        .unwrap();

    let charged = before - s.asset().balance_of(trader());
    assert_eq!(charged, quote.estimated_cost);
    assert_eq!(straddle.call_cost, quote.call_cost);
    assert_eq!(straddle.put_cost, quote.put_cost);
}

#[test]
fn quote_leaves_no_trace() {
    let mut s = strategy();
    let before = snapshot(&s);

    let quote = s.quote_buy_straddle(STRIKE, UNIT).unwrap();

    assert!(!quote.estimated_cost.is_zero());
    assert_eq!(quote.quoted_at, s.market().timestamp());
    assert_eq!(snapshot(&s), before);
    assert_eq!(s.asset().allowance(s.quoter_helper(), s.address()), U256::ZERO);
}

#[test]
fn quote_needs_no_caller_approval() {
    let mut s = strategy();
    assert_eq!(s.asset().allowance(trader(), s.address()), U256::ZERO);
    assert!(s.quote_buy_straddle(STRIKE, UNIT).is_ok());
}

#[test]
fn buy_quoted_within_tolerance_succeeds() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    let quote = s.quote_buy_straddle(STRIKE, UNIT).unwrap();

    // Call premium 262 -> 263: about 0.36% of the straddle.
    s.market_mut()
        .inner
        .set_pricing(
            STRIKE,
            StrikePricing {
                call_premium: units(263),
                put_premium: units(18),
            },
        )
        .unwrap();

    let straddle = s.buy_quoted(trader(), &quote, 50).unwrap();
    assert!(straddle.total_cost > quote.estimated_cost);
    assert!(straddle.total_cost <= quote.max_cost(50));
}

#[test]
fn buy_quoted_after_large_move_is_stale() {
    let mut s = strategy();
    approve(&mut s, U256::MAX);
    let quote = s.quote_buy_straddle(STRIKE, UNIT).unwrap();

    s.market_mut()
        .inner
        .set_pricing(
            STRIKE,
            StrikePricing {
                call_premium: units(300),
                put_premium: units(18),
            },
        )
        .unwrap();
    let moved = s.min_collateral(STRIKE, UNIT).unwrap().total();
    let before = snapshot(&s);

    let err = s.buy_quoted(trader(), &quote, 50).unwrap_err();
    assert_eq!(
        err,
        StraddleError::StalePrice {
            quoted: quote.estimated_cost,
            actual: moved,
        }
    );
    assert_eq!(snapshot(&s), before);
}

// ── Scratch funding sanity ──────────────────────────────────────────

#[test]
fn scratch_funds_outside_a_checkpoint_persist() {
    // fund_scratch is only safe inside a reverted checkpoint.
    let mut token = SimulatedToken::new("sUSD");
    let who = Address::repeat_byte(0x42);
    token.fund_scratch(who, units(10)).unwrap();
    assert_eq!(token.balance_of(who), units(10));

    let cp = token.checkpoint();
    token.fund_scratch(who, units(10)).unwrap();
    token.revert_to(cp);
    assert_eq!(token.balance_of(who), units(10));
}
