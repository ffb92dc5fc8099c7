use alloy::primitives::U256;
use thiserror::Error;

use crate::market::{GatewayError, TokenError};
use crate::model::{OptionType, StrikeId};

/// Why a straddle call failed. Every failure leaves market and settlement
/// state exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StraddleError {
    #[error("invalid strike {strike}: {reason}")]
    InvalidStrike { strike: StrikeId, reason: String },

    #[error("amount must be strictly positive")]
    InvalidAmount,

    #[error("straddle costs {required}, above max cost {max_cost}")]
    CostExceeded { required: U256, max_cost: U256 },

    #[error("insufficient allowance: approved {allowance}, straddle needs {required}")]
    InsufficientAllowance { allowance: U256, required: U256 },

    #[error("insufficient balance: holds {balance}, straddle needs {required}")]
    InsufficientBalance { balance: U256, required: U256 },

    #[error("market rejected {leg} leg: {source}")]
    MarketGatewayFailure {
        leg: OptionType,
        #[source]
        source: GatewayError,
    },

    #[error("price moved since quote: quoted {quoted}, now {actual}")]
    StalePrice { quoted: U256, actual: U256 },

    #[error("settlement asset failure: {0}")]
    Settlement(TokenError),
}

impl StraddleError {
    pub(crate) fn from_token(err: TokenError) -> Self {
        match err {
            TokenError::InsufficientAllowance {
                allowance,
                required,
                ..
            } => StraddleError::InsufficientAllowance {
                allowance,
                required,
            },
            TokenError::InsufficientBalance {
                balance, required, ..
            } => StraddleError::InsufficientBalance { balance, required },
            other => StraddleError::Settlement(other),
        }
    }

    /// Map a rejection of `leg` by the market. Registry rejections become
    /// `InvalidStrike`/`InvalidAmount`; everything else is a gateway failure.
    pub(crate) fn from_gateway(strike: StrikeId, leg: OptionType, err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownStrike(_)
            | GatewayError::UnknownBoard(_)
            | GatewayError::BoardExpired { .. }
            | GatewayError::BoardFrozen(_) => StraddleError::InvalidStrike {
                strike,
                reason: err.to_string(),
            },
            GatewayError::ZeroAmount => StraddleError::InvalidAmount,
            source => StraddleError::MarketGatewayFailure { leg, source },
        }
    }
}
