//! Runtime module: the deterministic execution environment and its driver.
//!
//! Exposes:
//! - ExecutionEnv: atomic call dispatch against the built-in programs.
//! - Executor: drains the tx pool sequentially and records receipts.
//! - call: the typed call/return/event surface.
//! - revert: typed revert reasons.

pub mod call;
pub mod revert;
pub mod env;
pub mod executor;

pub use call::{Call, TokenCall, StableCall, OracleCall, CallReturn, CallOutcome, Event, MsgContext};
pub use revert::Revert;
pub use env::{ExecutionEnv, token_address, stablecoin_address, oracle_address};
pub use executor::{Executor, Receipt};
