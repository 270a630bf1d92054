//! Deterministic execution environment.
//!
//! Dispatches typed calls against the built-in programs. Every call is
//! atomic: the environment snapshots the account state up front and restores
//! it wholesale when dispatch reverts, so a failed call leaves no trace —
//! not in native balances, not in program state.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::crypto::{Address, program_address};
use crate::programs::{PriceOracle, StableCoin, TokenLedger};
use crate::runtime::call::{Call, CallOutcome, CallReturn, Event, MsgContext, OracleCall, StableCall, TokenCall};
use crate::runtime::revert::Revert;
use crate::state::{Account, AccountCache};

pub const TOKEN_LABEL: &str = "token";
pub const STABLECOIN_LABEL: &str = "stablecoin";
pub const ORACLE_LABEL: &str = "oracle";

pub fn token_address() -> Address {
    program_address(TOKEN_LABEL)
}

pub fn stablecoin_address() -> Address {
    program_address(STABLECOIN_LABEL)
}

pub fn oracle_address() -> Address {
    program_address(ORACLE_LABEL)
}

#[derive(Clone)]
pub struct ExecutionEnv {
    cache: AccountCache,
}

impl ExecutionEnv {
    pub fn new(cache: AccountCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &AccountCache {
        &self.cache
    }

    /// Execute one call atomically. On revert the pre-call state is
    /// reinstated before the reason is returned.
    pub fn call(
        &self,
        caller: &Address,
        call: Call,
        value_wei: u128,
    ) -> Result<CallOutcome, Revert> {
        let snapshot = self.cache.snapshot().map_err(internal)?;
        let ctx = MsgContext { caller: caller.clone(), value_wei };
        match self.dispatch(&ctx, &call) {
            Ok(outcome) => Ok(outcome),
            Err(revert) => {
                self.cache.restore(snapshot).map_err(internal)?;
                Err(revert)
            }
        }
    }

    fn dispatch(&self, ctx: &MsgContext, call: &Call) -> Result<CallOutcome, Revert> {
        if ctx.value_wei > 0 && !call.payable() {
            return Err(Revert::msg("Call is not payable."));
        }
        match call {
            Call::NativeTransfer { to } => {
                self.transfer_wei(&ctx.caller, to, ctx.value_wei)?;
                Ok(CallOutcome { ret: CallReturn::None, events: vec![] })
            }
            Call::Token(tc) => self.dispatch_token(ctx, tc),
            Call::Oracle(oc) => self.dispatch_oracle(ctx, oc),
            Call::Stable(sc) => self.dispatch_stable(ctx, sc),
        }
    }

    fn dispatch_token(&self, ctx: &MsgContext, call: &TokenCall) -> Result<CallOutcome, Revert> {
        let addr = token_address();
        let mut ledger: TokenLedger = self.load_state(&addr)?;
        let (ret, event) = match call {
            TokenCall::Transfer { to, amount } => {
                let ok = ledger.transfer(&ctx.caller, to, *amount)?;
                (
                    CallReturn::Bool(ok),
                    Event::Transfer {
                        token: addr.clone(),
                        from: ctx.caller.clone(),
                        to: to.clone(),
                        amount: *amount,
                    },
                )
            }
            TokenCall::Approve { spender, amount } => {
                let ok = ledger.approve(&ctx.caller, spender, *amount)?;
                (
                    CallReturn::Bool(ok),
                    Event::Approval {
                        token: addr.clone(),
                        owner: ctx.caller.clone(),
                        spender: spender.clone(),
                        amount: *amount,
                    },
                )
            }
            TokenCall::TransferFrom { from, to, amount } => {
                let ok = ledger.transfer_from(&ctx.caller, from, to, *amount)?;
                (
                    CallReturn::Bool(ok),
                    Event::Transfer {
                        token: addr.clone(),
                        from: from.clone(),
                        to: to.clone(),
                        amount: *amount,
                    },
                )
            }
        };
        self.store_state(&addr, &ledger)?;
        Ok(CallOutcome { ret, events: vec![event] })
    }

    fn dispatch_oracle(&self, ctx: &MsgContext, call: &OracleCall) -> Result<CallOutcome, Revert> {
        let addr = oracle_address();
        let mut oracle: PriceOracle = self.load_state(&addr)?;
        let OracleCall::SetPrice { price } = call;
        oracle.set_price(&ctx.caller, *price)?;
        self.store_state(&addr, &oracle)?;
        Ok(CallOutcome {
            ret: CallReturn::None,
            events: vec![Event::PriceUpdated { price: *price }],
        })
    }

    fn dispatch_stable(&self, ctx: &MsgContext, call: &StableCall) -> Result<CallOutcome, Revert> {
        let addr = stablecoin_address();
        let mut stc: StableCoin = self.load_state(&addr)?;
        let price = self.oracle_price()?;

        // payable calls carry their value into the contract before dispatch
        if ctx.value_wei > 0 {
            self.transfer_wei(&ctx.caller, &addr, ctx.value_wei)?;
        }
        let contract_wei = self.balance_wei(&addr)?;

        let (ret, event) = match call {
            StableCall::Mint => {
                let minted = stc.mint(&ctx.caller, ctx.value_wei, price)?;
                (
                    CallReturn::Amount(minted),
                    Event::Minted {
                        to: ctx.caller.clone(),
                        value_wei: ctx.value_wei,
                        amount: minted,
                    },
                )
            }
            StableCall::Burn { amount } => {
                let refund = stc.burn(&ctx.caller, *amount, price, contract_wei)?;
                self.transfer_wei(&addr, &ctx.caller, refund)?;
                (
                    CallReturn::Amount(refund),
                    Event::Burned {
                        from: ctx.caller.clone(),
                        amount: *amount,
                        refund_wei: refund,
                    },
                )
            }
            StableCall::DepositCollateralBuffer => {
                let minted =
                    stc.deposit_collateral_buffer(&ctx.caller, ctx.value_wei, price, contract_wei)?;
                (
                    CallReturn::Amount(minted),
                    Event::BufferDeposited {
                        from: ctx.caller.clone(),
                        value_wei: ctx.value_wei,
                        dpc_minted: minted,
                    },
                )
            }
            StableCall::WithdrawCollateralBuffer { amount } => {
                let refund =
                    stc.withdraw_collateral_buffer(&ctx.caller, *amount, price, contract_wei)?;
                self.transfer_wei(&addr, &ctx.caller, refund)?;
                (
                    CallReturn::Amount(refund),
                    Event::BufferWithdrawn {
                        to: ctx.caller.clone(),
                        dpc_burned: *amount,
                        refund_wei: refund,
                    },
                )
            }
        };
        self.store_state(&addr, &stc)?;
        Ok(CallOutcome { ret, events: vec![event] })
    }

    /// Move native currency between accounts, creating the recipient if it
    /// does not exist yet.
    fn transfer_wei(&self, from: &Address, to: &Address, amount: u128) -> Result<(), Revert> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let from_acc = self
            .cache
            .get(from)
            .map_err(internal)?
            .ok_or_else(|| Revert::msg("insufficient funds"))?;
        if from_acc.wei < amount {
            return Err(Revert::msg("insufficient funds"));
        }
        self.cache
            .modify(from, |acc| {
                acc.wei -= amount;
                Ok(())
            })
            .map_err(internal)?;
        if self.cache.get(to).map_err(internal)?.is_none() {
            self.cache.insert(to.clone(), Account::user(0)).map_err(internal)?;
        }
        self.cache
            .modify(to, |acc| {
                acc.wei = acc.wei.saturating_add(amount);
                Ok(())
            })
            .map_err(internal)?;
        Ok(())
    }

    // ---- read-only views ----

    pub fn balance_wei(&self, addr: &Address) -> Result<u128, Revert> {
        Ok(self.cache.get(addr).map_err(internal)?.map(|a| a.wei).unwrap_or(0))
    }

    pub fn nonce(&self, addr: &Address) -> Result<u64, Revert> {
        Ok(self.cache.get(addr).map_err(internal)?.map(|a| a.nonce).unwrap_or(0))
    }

    pub fn token(&self) -> Result<TokenLedger, Revert> {
        self.load_state(&token_address())
    }

    pub fn stablecoin(&self) -> Result<StableCoin, Revert> {
        self.load_state(&stablecoin_address())
    }

    pub fn oracle_price(&self) -> Result<u128, Revert> {
        let oracle: PriceOracle = self.load_state(&oracle_address())?;
        Ok(oracle.latest_price())
    }

    // ---- program state plumbing ----

    fn load_state<T: DeserializeOwned>(&self, addr: &Address) -> Result<T, Revert> {
        let acc = self
            .cache
            .get(addr)
            .map_err(internal)?
            .ok_or_else(|| Revert::msg(format!("no program at {}", addr)))?;
        bincode::deserialize(&acc.data).map_err(internal)
    }

    fn store_state<T: Serialize>(&self, addr: &Address, state: &T) -> Result<(), Revert> {
        let data = bincode::serialize(state).map_err(internal)?;
        self.cache
            .modify(addr, |acc| {
                acc.data = data;
                Ok(())
            })
            .map_err(internal)
    }
}

fn internal<E: std::fmt::Display>(e: E) -> Revert {
    Revert::Message(format!("runtime: {}", e))
}
