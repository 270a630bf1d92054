//! ERC20-style fungible token ledger.
//!
//! One ledger instance backs the standalone token program; the stablecoin
//! embeds two more (its own supply and the depositor coin).

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

use crate::crypto::Address;
use crate::runtime::revert::Revert;
use crate::programs::math::{safe_add, safe_sub};

pub const ERR_TRANSFER_EXCEEDED: &str = "ERC20: Transfer amount exceeded.";
pub const ERR_ALLOWANCE_EXCEEDED: &str = "ERC20: Allowance amount exceeded.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

impl TokenLedger {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: 18,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Move `amount` from the caller to `to`. Reverts when the caller's
    /// balance is insufficient; balances are untouched in that case.
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<bool, Revert> {
        self.move_balance(caller, to, amount)?;
        Ok(true)
    }

    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: u128) -> Result<bool, Revert> {
        self.allowances.insert((caller.clone(), spender.clone()), amount);
        Ok(true)
    }

    /// Spend `caller`'s allowance on `from`'s balance.
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<bool, Revert> {
        let allowed = self.allowance(from, caller);
        if allowed < amount {
            return Err(Revert::msg(ERR_ALLOWANCE_EXCEEDED));
        }
        self.move_balance(from, to, amount)?;
        self.allowances.insert((from.clone(), caller.clone()), allowed - amount);
        Ok(true)
    }

    /// Create `amount` new tokens for `to`. Not callable externally; genesis
    /// and the stablecoin use it.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), Revert> {
        self.total_supply = safe_add(self.total_supply, amount)?;
        let bal = self.balance_of(to);
        self.balances.insert(to.clone(), safe_add(bal, amount)?);
        Ok(())
    }

    /// Destroy `amount` of `from`'s tokens.
    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<(), Revert> {
        let bal = self.balance_of(from);
        if bal < amount {
            return Err(Revert::msg(ERR_TRANSFER_EXCEEDED));
        }
        self.balances.insert(from.clone(), bal - amount);
        self.total_supply = safe_sub(self.total_supply, amount)?;
        Ok(())
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), Revert> {
        let from_bal = self.balance_of(from);
        if from_bal < amount {
            return Err(Revert::msg(ERR_TRANSFER_EXCEEDED));
        }
        if from == to {
            return Ok(());
        }
        self.balances.insert(from.clone(), from_bal - amount);
        let to_bal = self.balance_of(to);
        self.balances.insert(to.clone(), safe_add(to_bal, amount)?);
        Ok(())
    }

    /// Sum of all balances; equals `total_supply` at all times.
    #[cfg(test)]
    pub fn balance_sum(&self) -> u128 {
        self.balances.values().sum()
    }
}
