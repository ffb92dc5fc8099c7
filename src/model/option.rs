use std::fmt;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

// ── Handles ─────────────────────────────────────────────────────────

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for U256 {
            fn from(v: $name) -> U256 {
                U256::from(v.0)
            }
        }
    };
}

id_newtype!(
    /// Handle of a board (a set of strikes sharing one expiry).
    BoardId
);
id_newtype!(
    /// Handle of an (expiry, strike price) pair inside a board.
    StrikeId
);
id_newtype!(
    /// Handle of a minted option position. `PositionId(0)` opens a new one.
    PositionId
);

// ── Option type ─────────────────────────────────────────────────────

/// The market's option types. Discriminants match the on-chain enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OptionType {
    LongCall = 0,
    LongPut = 1,
    ShortCallBase = 2,
    ShortCallQuote = 3,
    ShortPutQuote = 4,
}

impl OptionType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for OptionType {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        match v {
            0 => Ok(OptionType::LongCall),
            1 => Ok(OptionType::LongPut),
            2 => Ok(OptionType::ShortCallBase),
            3 => Ok(OptionType::ShortCallQuote),
            4 => Ok(OptionType::ShortPutQuote),
            other => Err(other),
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "LONG_CALL" => Ok(OptionType::LongCall),
            "LONG_PUT" => Ok(OptionType::LongPut),
            "SHORT_CALL_BASE" => Ok(OptionType::ShortCallBase),
            "SHORT_CALL_QUOTE" => Ok(OptionType::ShortCallQuote),
            "SHORT_PUT_QUOTE" => Ok(OptionType::ShortPutQuote),
            other => Err(format!(
                "unknown option type '{other}' (expected LONG_CALL, LONG_PUT, \
                 SHORT_CALL_BASE, SHORT_CALL_QUOTE or SHORT_PUT_QUOTE)"
            )),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionType::LongCall => "LONG_CALL",
            OptionType::LongPut => "LONG_PUT",
            OptionType::ShortCallBase => "SHORT_CALL_BASE",
            OptionType::ShortCallQuote => "SHORT_CALL_QUOTE",
            OptionType::ShortPutQuote => "SHORT_PUT_QUOTE",
        };
        f.write_str(s)
    }
}

// ── Position state ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PositionState {
    Empty = 0,
    Active = 1,
    Closed = 2,
    Liquidated = 3,
    Settled = 4,
    Merged = 5,
}

impl TryFrom<u8> for PositionState {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        match v {
            0 => Ok(PositionState::Empty),
            1 => Ok(PositionState::Active),
            2 => Ok(PositionState::Closed),
            3 => Ok(PositionState::Liquidated),
            4 => Ok(PositionState::Settled),
            5 => Ok(PositionState::Merged),
            other => Err(other),
        }
    }
}

// ── Registry records ────────────────────────────────────────────────

/// A set of strikes sharing one expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub id: BoardId,
    /// Unix timestamp (seconds).
    pub expiry: u64,
    pub frozen: bool,
    pub strike_ids: Vec<StrikeId>,
}

impl Board {
    /// Tradable at `now`: not frozen and not yet expired.
    pub fn is_tradable(&self, now: u64) -> bool {
        !self.frozen && self.expiry > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strike {
    pub id: StrikeId,
    pub board_id: BoardId,
    /// Quote-asset price per base unit, 18 decimals.
    pub strike_price: U256,
}

/// An option position as recorded by the market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub id: PositionId,
    pub strike_id: StrikeId,
    pub option_type: OptionType,
    pub amount: U256,
    pub collateral: U256,
    pub state: PositionState,
}

impl Position {
    pub fn is_active(&self) -> bool {
        self.state == PositionState::Active
    }
}
