use std::collections::{BTreeMap, HashMap};

use alloy::primitives::{Address, U256};
use tracing::debug;

use super::journal::{Journal, SnapshotId};
use crate::market::{GatewayError, Journaled, MarketGateway, SettlementAsset};
use crate::model::amount::{bps_of, mul_unit};
use crate::model::{
    Board, BoardId, OptionType, Position, PositionId, PositionState, Strike, StrikeId, TradeCost,
    TradeParams, TradeResult,
};

/// Premium per whole option (18 decimals) for each side of a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikePricing {
    pub call_premium: U256,
    pub put_premium: U256,
}

/// Strike listing used when creating a board.
#[derive(Debug, Clone, Copy)]
pub struct StrikeListing {
    pub strike_price: U256,
    pub pricing: StrikePricing,
}

#[derive(Debug, Clone, Default)]
struct PositionBook {
    positions: Vec<(Address, Position)>,
    last_id: u64,
}

/// In-memory options market with a fixed premium table per strike.
///
/// Only long positions can be opened. Premiums plus a flat fee are pulled
/// from the trader into the liquidity pool address.
#[derive(Debug)]
pub struct SimulatedMarket {
    address: Address,
    pool: Address,
    timestamp: u64,
    fee_bps: u64,
    boards: BTreeMap<BoardId, Board>,
    strikes: BTreeMap<StrikeId, Strike>,
    pricing: HashMap<StrikeId, StrikePricing>,
    last_board_id: u64,
    last_strike_id: u64,
    book: PositionBook,
    journal: Journal<PositionBook>,
}

impl SimulatedMarket {
    pub fn new(address: Address, pool: Address, timestamp: u64, fee_bps: u64) -> Self {
        Self {
            address,
            pool,
            timestamp,
            fee_bps,
            boards: BTreeMap::new(),
            strikes: BTreeMap::new(),
            pricing: HashMap::new(),
            last_board_id: 0,
            last_strike_id: 0,
            book: PositionBook::default(),
            journal: Journal::new(),
        }
    }

    pub fn create_board(&mut self, expiry: u64, listings: &[StrikeListing]) -> BoardId {
        self.last_board_id += 1;
        let board_id = BoardId(self.last_board_id);

        let mut strike_ids = Vec::with_capacity(listings.len());
        for listing in listings {
            self.last_strike_id += 1;
            let id = StrikeId(self.last_strike_id);
            self.strikes.insert(
                id,
                Strike {
                    id,
                    board_id,
                    strike_price: listing.strike_price,
                },
            );
            self.pricing.insert(id, listing.pricing);
            strike_ids.push(id);
        }

        self.boards.insert(
            board_id,
            Board {
                id: board_id,
                expiry,
                frozen: false,
                strike_ids,
            },
        );
        board_id
    }

    pub fn set_board_frozen(&mut self, board: BoardId, frozen: bool) -> Result<(), GatewayError> {
        let b = self
            .boards
            .get_mut(&board)
            .ok_or(GatewayError::UnknownBoard(board))?;
        b.frozen = frozen;
        Ok(())
    }

    /// Move the market: replaces the premium table of one strike.
    pub fn set_pricing(&mut self, strike: StrikeId, pricing: StrikePricing) -> Result<(), GatewayError> {
        let slot = self
            .pricing
            .get_mut(&strike)
            .ok_or(GatewayError::UnknownStrike(strike))?;
        *slot = pricing;
        Ok(())
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.timestamp += secs;
    }

    /// Number of active positions owned by `owner` (the option token's `balanceOf`).
    pub fn position_count(&self, owner: Address) -> usize {
        self.book
            .positions
            .iter()
            .filter(|(o, p)| *o == owner && p.is_active())
            .count()
    }

    fn tradable_strike(&self, id: StrikeId) -> Result<(&Strike, StrikePricing), GatewayError> {
        let strike = self.strikes.get(&id).ok_or(GatewayError::UnknownStrike(id))?;
        let board = self
            .boards
            .get(&strike.board_id)
            .ok_or(GatewayError::UnknownBoard(strike.board_id))?;
        if !board.is_tradable(self.timestamp) {
            return Err(if board.frozen {
                GatewayError::BoardFrozen(board.id)
            } else {
                GatewayError::BoardExpired {
                    board: board.id,
                    expiry: board.expiry,
                }
            });
        }
        let pricing = self
            .pricing
            .get(&id)
            .copied()
            .ok_or(GatewayError::UnknownStrike(id))?;
        Ok((strike, pricing))
    }
}

impl MarketGateway for SimulatedMarket {
    fn address(&self) -> Address {
        self.address
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn live_boards(&self) -> Vec<BoardId> {
        self.boards
            .values()
            .filter(|b| b.expiry > self.timestamp)
            .map(|b| b.id)
            .collect()
    }

    fn board(&self, id: BoardId) -> Option<Board> {
        self.boards.get(&id).cloned()
    }

    fn board_strikes(&self, id: BoardId) -> Result<Vec<StrikeId>, GatewayError> {
        self.boards
            .get(&id)
            .map(|b| b.strike_ids.clone())
            .ok_or(GatewayError::UnknownBoard(id))
    }

    fn strike(&self, id: StrikeId) -> Option<Strike> {
        self.strikes.get(&id).cloned()
    }

    fn price_trade(&self, params: &TradeParams) -> Result<TradeCost, GatewayError> {
        let (_, pricing) = self.tradable_strike(params.strike_id)?;
        if params.amount.is_zero() {
            return Err(GatewayError::ZeroAmount);
        }
        if params.iterations == 0 {
            return Err(GatewayError::InvalidIterations);
        }

        let unit_premium = match params.option_type {
            OptionType::LongCall => pricing.call_premium,
            OptionType::LongPut => pricing.put_premium,
            other => return Err(GatewayError::UnsupportedOptionType(other)),
        };

        let premium = mul_unit(params.amount, unit_premium).ok_or(GatewayError::PricingOverflow)?;
        let fee = bps_of(premium, self.fee_bps);
        let total_cost = premium
            .checked_add(fee)
            .ok_or(GatewayError::PricingOverflow)?;

        Ok(TradeCost {
            premium,
            fee,
            total_cost,
        })
    }

    fn open_position(
        &mut self,
        asset: &mut dyn SettlementAsset,
        trader: Address,
        params: &TradeParams,
    ) -> Result<TradeResult, GatewayError> {
        if params.position_id != PositionId(0) {
            return Err(GatewayError::Rejected(format!(
                "adjusting position {} is not supported",
                params.position_id
            )));
        }

        let cost = self.price_trade(params)?;
        if cost.total_cost < params.min_total_cost || cost.total_cost > params.max_total_cost {
            return Err(GatewayError::TotalCostOutsideOfSpecifiedBounds {
                total_cost: cost.total_cost,
                min: params.min_total_cost,
                max: params.max_total_cost,
            });
        }

        asset.transfer_from(self.address, trader, self.pool, cost.total_cost)?;

        self.book.last_id += 1;
        let position = Position {
            id: PositionId(self.book.last_id),
            strike_id: params.strike_id,
            option_type: params.option_type,
            amount: params.amount,
            collateral: params.set_collateral_to,
            state: PositionState::Active,
        };
        self.book.positions.push((trader, position.clone()));

        debug!(
            position = %position.id,
            strike = %params.strike_id,
            option_type = %params.option_type,
            cost = %cost.total_cost,
            "position opened"
        );

        Ok(TradeResult {
            position,
            total_cost: cost.total_cost,
            total_fee: cost.fee,
        })
    }

    fn owner_positions(&self, owner: Address) -> Vec<Position> {
        self.book
            .positions
            .iter()
            .filter(|(o, p)| *o == owner && p.is_active())
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl Journaled for SimulatedMarket {
    type Checkpoint = SnapshotId;

    fn checkpoint(&mut self) -> SnapshotId {
        self.journal.checkpoint(&self.book)
    }

    fn commit(&mut self, checkpoint: SnapshotId) {
        self.journal.commit(checkpoint);
    }

    fn revert_to(&mut self, checkpoint: SnapshotId) {
        self.journal.revert(checkpoint, &mut self.book);
    }
}
