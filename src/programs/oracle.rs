//! Price oracle program: an owner-settable ETH/USD rate read by the
//! stablecoin at mint/burn time.

use serde::{Serialize, Deserialize};

use crate::crypto::Address;
use crate::runtime::revert::Revert;

pub const ERR_NOT_OWNER: &str = "Oracle: caller is not the owner.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOracle {
    pub owner: Address,
    price: u128,
}

impl PriceOracle {
    pub fn new(owner: Address, price: u128) -> Self {
        Self { owner, price }
    }

    pub fn latest_price(&self) -> u128 {
        self.price
    }

    pub fn set_price(&mut self, caller: &Address, price: u128) -> Result<(), Revert> {
        if caller != &self.owner {
            return Err(Revert::msg(ERR_NOT_OWNER));
        }
        self.price = price;
        Ok(())
    }
}
