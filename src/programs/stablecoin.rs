//! Collateral-backed stablecoin program.
//!
//! Value model: 1 STC is worth 1 USD. Minting deposits ETH and issues
//! `value * price` STC; burning retires STC and refunds its ETH value.
//! Depositors back the peg with an ETH buffer and hold depositor coins (DPC)
//! representing pro-rata claims on the contract's USD surplus. The percentage
//! fee on the wei leg of mint/burn accrues to that buffer, so it is charged
//! only while depositor coins are outstanding.
//!
//! The program never touches accounts directly: the environment passes in the
//! oracle price and the contract's wei balance and applies the returned wei
//! movements, so a revert here rolls back cleanly.

use serde::{Serialize, Deserialize};

use crate::crypto::Address;
use crate::runtime::revert::Revert;
use crate::programs::math::{safe_add, safe_sub, safe_mul, safe_div, mul_div};
use crate::programs::token::TokenLedger;

/// First buffer deposit must reach this share of the ETH backing the
/// outstanding supply, on top of covering any deficit.
pub const INITIAL_COLLATERAL_RATIO_PERCENTAGE: u128 = 10;

pub const ERR_MINT_NO_VALUE: &str = "STC: Mint requires a deposit.";
pub const ERR_BURN_IN_DEFICIT: &str = "STC: Cannot burn while in deficit.";
pub const ERR_INSUFFICIENT_DPC: &str = "STC: Sender has insufficient DPC funds.";
pub const ERR_NO_DEPOSITORS: &str = "STC: No depositor funds to withdraw.";
pub const INITIAL_RATIO_MSG: &str = "STC: Initial collateral ratio not met, minimum is ";

/// Contract USD position relative to the outstanding supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferStatus {
    /// Collateral shortfall in USD (zero surplus counts as a zero deficit).
    Deficit(u128),
    /// Strictly positive USD surplus.
    Surplus(u128),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableCoin {
    pub fee_rate_percentage: u128,
    /// Address of the oracle program supplying the ETH/USD rate.
    pub oracle: Address,
    /// The stablecoin ledger itself.
    pub ledger: TokenLedger,
    /// Depositor coin ledger; reset whenever the buffer is re-initialized.
    pub depositor: TokenLedger,
}

impl StableCoin {
    pub fn new(fee_rate_percentage: u128, oracle: Address) -> Self {
        Self {
            fee_rate_percentage,
            oracle,
            ledger: TokenLedger::new("Oxyr Stable", "STC"),
            depositor: TokenLedger::new("Oxyr Depositor", "DPC"),
        }
    }

    /// Issue stablecoins against the attached `value_wei` at the oracle
    /// `price`. Returns the minted amount.
    pub fn mint(&mut self, caller: &Address, value_wei: u128, price: u128) -> Result<u128, Revert> {
        if value_wei == 0 {
            return Err(Revert::msg(ERR_MINT_NO_VALUE));
        }
        let fee = self.fee(value_wei)?;
        let remaining = safe_sub(value_wei, fee)?;
        let minted = safe_mul(remaining, price)?;
        self.ledger.mint(caller, minted)?;
        Ok(minted)
    }

    /// Retire `amount` of the caller's stablecoins. Returns the wei refund
    /// owed to the caller. `contract_wei` is the contract balance before any
    /// refund.
    pub fn burn(
        &mut self,
        caller: &Address,
        amount: u128,
        price: u128,
        contract_wei: u128,
    ) -> Result<u128, Revert> {
        match self.buffer_status(contract_wei, price)? {
            BufferStatus::Deficit(d) if d > 0 => return Err(Revert::msg(ERR_BURN_IN_DEFICIT)),
            _ => {}
        }
        self.ledger.burn(caller, amount)?;
        let refund = safe_div(amount, price)?;
        let fee = self.fee(refund)?;
        safe_sub(refund, fee)
    }

    /// Deposit `value_wei` into the collateral buffer. `contract_wei` is the
    /// contract balance including the attached value. Returns the DPC minted.
    pub fn deposit_collateral_buffer(
        &mut self,
        caller: &Address,
        value_wei: u128,
        price: u128,
        contract_wei: u128,
    ) -> Result<u128, Revert> {
        let wei_before = safe_sub(contract_wei, value_wei)?;
        match self.buffer_status(wei_before, price)? {
            BufferStatus::Deficit(deficit_usd) => {
                let deficit_wei = safe_div(deficit_usd, price)?;
                let required_surplus_usd = mul_div(
                    self.ledger.total_supply(),
                    INITIAL_COLLATERAL_RATIO_PERCENTAGE,
                    100,
                )?;
                let required_surplus_wei = safe_div(required_surplus_usd, price)?;
                let minimum = safe_add(deficit_wei, required_surplus_wei)?;
                if value_wei < minimum {
                    return Err(Revert::InitialCollateralRatio {
                        message: INITIAL_RATIO_MSG.to_string(),
                        minimum_wei: minimum,
                    });
                }
                let surplus_wei = safe_sub(value_wei, deficit_wei)?;
                let surplus_usd = safe_mul(surplus_wei, price)?;
                // fresh DPC issue; claims on the wiped buffer are void
                self.depositor = TokenLedger::new("Oxyr Depositor", "DPC");
                self.depositor.mint(caller, surplus_usd)?;
                Ok(surplus_usd)
            }
            BufferStatus::Surplus(surplus_usd) => {
                let value_usd = safe_mul(value_wei, price)?;
                let dpc_supply = self.depositor.total_supply();
                if dpc_supply == 0 {
                    // surplus accrued with no outstanding DPC: start at par
                    self.depositor = TokenLedger::new("Oxyr Depositor", "DPC");
                    self.depositor.mint(caller, value_usd)?;
                    return Ok(value_usd);
                }
                let minted = mul_div(value_usd, dpc_supply, surplus_usd)?;
                self.depositor.mint(caller, minted)?;
                Ok(minted)
            }
        }
    }

    /// Burn `amount` of the caller's DPC and return the pro-rata wei refund.
    /// `contract_wei` is the contract balance before the refund.
    pub fn withdraw_collateral_buffer(
        &mut self,
        caller: &Address,
        amount: u128,
        price: u128,
        contract_wei: u128,
    ) -> Result<u128, Revert> {
        if self.depositor.balance_of(caller) < amount {
            return Err(Revert::msg(ERR_INSUFFICIENT_DPC));
        }
        let surplus_usd = match self.buffer_status(contract_wei, price)? {
            BufferStatus::Surplus(s) => s,
            BufferStatus::Deficit(_) => return Err(Revert::msg(ERR_NO_DEPOSITORS)),
        };
        let dpc_supply = self.depositor.total_supply();
        let refund_usd = mul_div(amount, surplus_usd, dpc_supply)?;
        self.depositor.burn(caller, amount)?;
        safe_div(refund_usd, price)
    }

    /// Percentage fee on a wei amount; zero while no depositor coins are
    /// outstanding.
    pub fn fee(&self, wei: u128) -> Result<u128, Revert> {
        if self.depositor.total_supply() == 0 {
            return Ok(0);
        }
        mul_div(wei, self.fee_rate_percentage, 100)
    }

    fn buffer_status(&self, contract_wei: u128, price: u128) -> Result<BufferStatus, Revert> {
        let contract_usd = safe_mul(contract_wei, price)?;
        let supply_usd = self.ledger.total_supply();
        if contract_usd <= supply_usd {
            Ok(BufferStatus::Deficit(contract_usd.abs_diff(supply_usd)))
        } else {
            Ok(BufferStatus::Surplus(contract_usd - supply_usd))
        }
    }
}
