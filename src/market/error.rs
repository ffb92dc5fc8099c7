use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::model::{BoardId, OptionType, StrikeId};

/// Failures raised by a settlement asset ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: {account} holds {balance}, needs {required}")]
    InsufficientBalance {
        account: Address,
        balance: U256,
        required: U256,
    },

    #[error("insufficient allowance: {owner} allows {spender} {allowance}, needs {required}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: U256,
        required: U256,
    },

    #[error("balance overflow crediting {0}")]
    Overflow(Address),
}

/// Rejections raised by the options market.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("unknown board {0}")]
    UnknownBoard(BoardId),

    #[error("unknown strike {0}")]
    UnknownStrike(StrikeId),

    #[error("board {board} expired at {expiry}")]
    BoardExpired { board: BoardId, expiry: u64 },

    #[error("board {0} is frozen")]
    BoardFrozen(BoardId),

    #[error("trade amount must be positive")]
    ZeroAmount,

    #[error("iterations must be at least 1")]
    InvalidIterations,

    #[error("option type {0} is not supported by this market")]
    UnsupportedOptionType(OptionType),

    #[error("total cost {total_cost} outside of bounds [{min}, {max}]")]
    TotalCostOutsideOfSpecifiedBounds {
        total_cost: U256,
        min: U256,
        max: U256,
    },

    #[error("pricing overflow")]
    PricingOverflow,

    #[error("settlement transfer failed: {0}")]
    Token(#[from] TokenError),

    #[error("{0}")]
    Rejected(String),
}
