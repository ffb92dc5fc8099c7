use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{BoardListing, StraddleVenue};
use crate::market::{MarketGateway, SettlementAsset, TokenError};
use crate::model::{StrikeId, TradeParams, TradeResult};
use crate::sim::seed::{self, Seed};
use crate::sim::{SimulatedMarket, SimulatedToken};
use crate::strategy::{CostBound, CustodyReport, MinCollateral, Quote, Straddle, StraddleStrategy};

pub type SimulatedStrategy = StraddleStrategy<SimulatedMarket, SimulatedToken>;

/// Straddle venue backed by the in-process seeded market.
pub struct SimulatedVenue {
    strategy: SimulatedStrategy,
    trader: Address,
}

impl SimulatedVenue {
    pub fn new(strategy: SimulatedStrategy, trader: Address) -> Self {
        SimulatedVenue { strategy, trader }
    }

    /// The seeded local market with the deployer as trader.
    pub fn seeded(seed: &Seed) -> Result<Self, TokenError> {
        let (market, token) = seed::seed_market(seed)?;
        let strategy = StraddleStrategy::new(seed::strategy_address(), market, token);
        Ok(Self::new(strategy, seed::deployer()))
    }

    pub fn strategy_ref(&self) -> &SimulatedStrategy {
        &self.strategy
    }
}

#[async_trait]
impl StraddleVenue for SimulatedVenue {
    fn trader(&self) -> Address {
        self.trader
    }

    fn strategy(&self) -> Address {
        self.strategy.address()
    }

    async fn boards(&self) -> Result<Vec<BoardListing>> {
        let market = self.strategy.market();
        let mut listings = Vec::new();
        for id in market.live_boards() {
            let board = market
                .board(id)
                .with_context(|| format!("live board {id} missing from registry"))?;
            let strikes = board
                .strike_ids
                .iter()
                .filter_map(|s| market.strike(*s))
                .collect();
            listings.push(BoardListing { board, strikes });
        }
        Ok(listings)
    }

    async fn min_collateral(&self, strike: StrikeId, amount: U256) -> Result<MinCollateral> {
        Ok(self.strategy.min_collateral(strike, amount)?)
    }

    async fn quote(&mut self, strike: StrikeId, amount: U256) -> Result<Quote> {
        Ok(self.strategy.quote_buy_straddle(strike, amount)?)
    }

    async fn buy(&mut self, strike: StrikeId, amount: U256, bound: CostBound) -> Result<Straddle> {
        let approval = match bound.max_cost() {
            Some(max) => max,
            None => self.strategy.min_collateral(strike, amount)?.total(),
        };
        let strategy_addr = self.strategy.address();
        self.strategy
            .asset_mut()
            .approve(self.trader, strategy_addr, approval);

        Ok(self.strategy.buy_straddle(self.trader, strike, amount, bound)?)
    }

    /// Approves exactly the priced cost for the trade, then puts the
    /// trader's previous allowance back whether or not the trade succeeded.
    async fn open_position(&mut self, params: &TradeParams) -> Result<TradeResult> {
        let trader = self.trader;
        let (market, asset) = self.strategy.parts_mut();
        let spender = market.address();
        let cost = market.price_trade(params)?.total_cost;

        let prior = asset.allowance(trader, spender);
        asset.approve(trader, spender, cost);
        let result = market.open_position(&mut *asset, trader, params);
        asset.approve(trader, spender, prior);

        Ok(result?)
    }

    async fn settlement_balance(&self, owner: Address) -> Result<U256> {
        Ok(self.strategy.asset().balance_of(owner))
    }

    async fn custody(&self) -> Result<CustodyReport> {
        Ok(self.strategy.custody_report())
    }
}
