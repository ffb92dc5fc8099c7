pub mod amount;
pub mod chain;
pub mod option;
pub mod trade;

pub use chain::Chain;
pub use option::{Board, BoardId, OptionType, Position, PositionId, PositionState, Strike, StrikeId};
pub use trade::{TradeCost, TradeParams, TradeResult};
