//! In-process stand-ins for the external market and settlement asset.

pub mod journal;
pub mod market;
pub mod seed;
pub mod token;

pub use market::{SimulatedMarket, StrikeListing, StrikePricing};
pub use token::SimulatedToken;
