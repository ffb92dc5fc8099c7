//! Interfaces of the external collaborators the straddle engine drives:
//! the options market and the settlement asset it charges in.

pub mod error;

use alloy::primitives::{Address, U256};

use crate::model::{Board, BoardId, Position, Strike, StrikeId, TradeCost, TradeParams, TradeResult};

pub use error::{GatewayError, TokenError};

// ── Settlement asset ────────────────────────────────────────────────

/// ERC20-like ledger of the asset premiums are paid in.
pub trait SettlementAsset: Send + Sync {
    fn balance_of(&self, owner: Address) -> U256;

    fn allowance(&self, owner: Address, spender: Address) -> U256;

    /// Set `spender`'s allowance over `owner`'s balance (overwrites).
    fn approve(&mut self, owner: Address, spender: Address, amount: U256);

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError>;
}

/// Lets a dry run credit a throwaway account. Only meaningful inside a
/// checkpoint that is reverted afterwards.
pub trait ScratchFunding: SettlementAsset {
    fn fund_scratch(&mut self, account: Address, amount: U256) -> Result<(), TokenError>;
}

// ── Options market ──────────────────────────────────────────────────

/// The options market: board/strike registry, trade pricing and position
/// minting. Owns all option state.
pub trait MarketGateway: Send + Sync {
    /// Address the market pulls premiums as (the `spender` in `transfer_from`).
    fn address(&self) -> Address;

    /// Current market time (unix seconds).
    fn timestamp(&self) -> u64;

    /// Boards not yet expired, in creation order.
    fn live_boards(&self) -> Vec<BoardId>;

    fn board(&self, id: BoardId) -> Option<Board>;

    fn board_strikes(&self, id: BoardId) -> Result<Vec<StrikeId>, GatewayError>;

    fn strike(&self, id: StrikeId) -> Option<Strike>;

    /// Price a trade without executing it. Same path `open_position` charges by.
    fn price_trade(&self, params: &TradeParams) -> Result<TradeCost, GatewayError>;

    /// Open a position for `trader`, paid from `trader`'s settlement balance
    /// through the market's allowance.
    fn open_position(
        &mut self,
        asset: &mut dyn SettlementAsset,
        trader: Address,
        params: &TradeParams,
    ) -> Result<TradeResult, GatewayError>;

    fn owner_positions(&self, owner: Address) -> Vec<Position>;
}

// ── Journal ─────────────────────────────────────────────────────────

/// Checkpointed state, so a multi-step operation can be undone as a whole.
///
/// Checkpoints nest: reverting to or committing an outer checkpoint discards
/// every checkpoint taken after it.
pub trait Journaled {
    type Checkpoint;

    fn checkpoint(&mut self) -> Self::Checkpoint;

    /// Keep all changes made since `checkpoint`.
    fn commit(&mut self, checkpoint: Self::Checkpoint);

    /// Discard all changes made since `checkpoint`.
    fn revert_to(&mut self, checkpoint: Self::Checkpoint);
}
