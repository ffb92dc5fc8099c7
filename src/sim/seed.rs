use alloy::primitives::{Address, U256};

use super::market::{SimulatedMarket, StrikeListing, StrikePricing};
use super::token::SimulatedToken;
use crate::market::TokenError;
use crate::model::amount::UNIT;

pub const ONE_WEEK: u64 = 7 * 86_400;

/// Settlement asset symbol of the seeded market.
pub const QUOTE_SYMBOL: &str = "sUSD";

/// (strike price, call premium, put premium), in whole quote units.
const SEED_STRIKES: [(u64, u64, u64); 3] = [(1500, 262, 18), (2000, 41, 297), (2500, 6, 764)];

pub fn deployer() -> Address {
    Address::repeat_byte(0xd0)
}

pub fn market_address() -> Address {
    Address::repeat_byte(0x0a)
}

pub fn pool_address() -> Address {
    Address::repeat_byte(0x0b)
}

pub fn strategy_address() -> Address {
    Address::repeat_byte(0x5a)
}

/// Parameters of the seeded local market.
#[derive(Debug, Clone)]
pub struct Seed {
    /// Market start time (unix seconds). The board expires one week later.
    pub start: u64,
    pub fee_bps: u64,
    /// Quote asset minted to the deployer, in whole units.
    pub deployer_funds: u64,
}

impl Default for Seed {
    fn default() -> Self {
        Seed {
            start: 1_700_000_000,
            fee_bps: 100,
            deployer_funds: 100_000,
        }
    }
}

/// One live board with three strikes and a funded deployer.
pub fn seed_market(seed: &Seed) -> Result<(SimulatedMarket, SimulatedToken), TokenError> {
    let mut market = SimulatedMarket::new(market_address(), pool_address(), seed.start, seed.fee_bps);

    let listings: Vec<StrikeListing> = SEED_STRIKES
        .iter()
        .map(|&(strike, call, put)| StrikeListing {
            strike_price: UNIT * U256::from(strike),
            pricing: StrikePricing {
                call_premium: UNIT * U256::from(call),
                put_premium: UNIT * U256::from(put),
            },
        })
        .collect();
    market.create_board(seed.start + ONE_WEEK, &listings);

    let mut token = SimulatedToken::new(QUOTE_SYMBOL);
    token.mint(deployer(), UNIT * U256::from(seed.deployer_funds))?;

    Ok((market, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MarketGateway, SettlementAsset};

    #[test]
    fn seeded_market_has_one_live_board() {
        let (market, token) = seed_market(&Seed::default()).unwrap();
        let boards = market.live_boards();
        assert_eq!(boards.len(), 1);
        assert_eq!(market.board_strikes(boards[0]).unwrap().len(), 3);
        assert_eq!(token.balance_of(deployer()), UNIT * U256::from(100_000u64));
    }
}
