use std::collections::BTreeMap;

use alloy::primitives::U256;
use serde::Serialize;

use super::StraddleStrategy;
use crate::market::{MarketGateway, SettlementAsset};
use crate::model::{OptionType, Position, StrikeId};

/// What the strategy currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustodyReport {
    pub settlement_balance: U256,
    pub positions: Vec<Position>,
}

impl CustodyReport {
    /// No user funds left idle in the strategy.
    pub fn is_settled(&self) -> bool {
        self.settlement_balance.is_zero()
    }

    /// Number of complete long-call/long-put pairs.
    pub fn straddle_count(&self) -> usize {
        self.pairing().0
    }

    /// Positions that are not half of a LONG_CALL/LONG_PUT pair on the same
    /// strike and amount, ordered by position id.
    pub fn unpaired(&self) -> Vec<&Position> {
        self.pairing().1
    }

    fn pairing(&self) -> (usize, Vec<&Position>) {
        let mut groups: BTreeMap<(StrikeId, U256), (Vec<&Position>, Vec<&Position>)> = BTreeMap::new();
        let mut unpaired = Vec::new();

        for p in &self.positions {
            let slot = groups.entry((p.strike_id, p.amount)).or_default();
            match p.option_type {
                OptionType::LongCall => slot.0.push(p),
                OptionType::LongPut => slot.1.push(p),
                _ => unpaired.push(p),
            }
        }

        let mut pairs = 0;
        for (calls, puts) in groups.into_values() {
            let n = calls.len().min(puts.len());
            pairs += n;
            unpaired.extend(calls.into_iter().skip(n));
            unpaired.extend(puts.into_iter().skip(n));
        }
        unpaired.sort_by_key(|p| p.id);
        (pairs, unpaired)
    }
}

impl<M: MarketGateway, A: SettlementAsset> StraddleStrategy<M, A> {
    pub fn custody_report(&self) -> CustodyReport {
        CustodyReport {
            settlement_balance: self.asset.balance_of(self.address),
            positions: self.market.owner_positions(self.address),
        }
    }
}
