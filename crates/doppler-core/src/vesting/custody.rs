//! Token balances backing the vesting ledger

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::safe_math::{safe_add_u256, safe_sub_u256};

/// Minimal token surface the ledger needs. Implementations must leave
/// balances untouched when they return an error.
pub trait TokenCustody {
    fn balance_of(&self, account: Address) -> U256;

    fn mint(&mut self, to: Address, amount: U256) -> CoreResult<()>;

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> CoreResult<()>;
}

/// Balance table kept in memory, used for simulation and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryToken {
    balances: BTreeMap<Address, U256>,
    total_supply: U256,
    reject_transfers: bool,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Make every subsequent transfer fail
    pub fn set_reject_transfers(&mut self, reject: bool) {
        self.reject_transfers = reject;
    }
}

impl TokenCustody for InMemoryToken {
    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn mint(&mut self, to: Address, amount: U256) -> CoreResult<()> {
        let total_supply = safe_add_u256(self.total_supply, amount)?;
        let balance = safe_add_u256(self.balance_of(to), amount)?;
        self.total_supply = total_supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> CoreResult<()> {
        if self.reject_transfers {
            return Err(DopplerCoreError::TransferRejected("transfers disabled".to_string()));
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(DopplerCoreError::InsufficientBalance {
                account: from,
                balance: from_balance,
                needed: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let from_balance = safe_sub_u256(from_balance, amount)?;
        let to_balance = safe_add_u256(self.balance_of(to), amount)?;
        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}
