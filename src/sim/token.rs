use std::collections::HashMap;

use alloy::primitives::{Address, U256};

use super::journal::{Journal, SnapshotId};
use crate::market::{Journaled, ScratchFunding, SettlementAsset, TokenError};

#[derive(Debug, Clone, Default)]
struct Ledger {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

/// In-memory ERC20 ledger standing in for the market's quote asset.
#[derive(Debug)]
pub struct SimulatedToken {
    symbol: String,
    ledger: Ledger,
    journal: Journal<Ledger>,
}

impl SimulatedToken {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ledger: Ledger::default(),
            journal: Journal::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), TokenError> {
        let balance = self.balance_of(to);
        let new_balance = balance.checked_add(amount).ok_or(TokenError::Overflow(to))?;
        let supply = self
            .ledger
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow(to))?;
        self.ledger.balances.insert(to, new_balance);
        self.ledger.total_supply = supply;
        Ok(())
    }

    fn debit(&mut self, from: Address, amount: U256) -> Result<(), TokenError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                account: from,
                balance,
                required: amount,
            });
        }
        self.ledger.balances.insert(from, balance - amount);
        Ok(())
    }

    fn credit(&mut self, to: Address, amount: U256) -> Result<(), TokenError> {
        let balance = self.balance_of(to);
        let new_balance = balance.checked_add(amount).ok_or(TokenError::Overflow(to))?;
        self.ledger.balances.insert(to, new_balance);
        Ok(())
    }
}

impl SettlementAsset for SimulatedToken {
    fn balance_of(&self, owner: Address) -> U256 {
        self.ledger.balances.get(&owner).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.ledger.allowances.insert((owner, spender), amount);
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from,
                spender,
                allowance,
                required: amount,
            });
        }
        self.debit(from, amount)?;
        self.credit(to, amount)?;
        // Infinite approvals are never decremented, as in OpenZeppelin's ERC20.
        if allowance != U256::MAX {
            self.ledger
                .allowances
                .insert((from, spender), allowance - amount);
        }
        Ok(())
    }
}

impl ScratchFunding for SimulatedToken {
    fn fund_scratch(&mut self, account: Address, amount: U256) -> Result<(), TokenError> {
        self.mint(account, amount)
    }
}

impl Journaled for SimulatedToken {
    type Checkpoint = SnapshotId;

    fn checkpoint(&mut self) -> SnapshotId {
        self.journal.checkpoint(&self.ledger)
    }

    fn commit(&mut self, checkpoint: SnapshotId) {
        self.journal.commit(checkpoint);
    }

    fn revert_to(&mut self, checkpoint: SnapshotId) {
        self.journal.revert(checkpoint, &mut self.ledger);
    }
}
