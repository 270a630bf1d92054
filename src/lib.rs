//! Oxyr: a single-node deterministic execution environment for financial
//! token programs.
//!
//! The node hosts three built-in programs — an ERC20-style fungible token,
//! a price oracle, and a collateral-backed stablecoin — over an in-memory
//! account state with atomic per-call revert semantics, and exposes them
//! through signed transactions and a JSON-RPC surface.

pub mod utils;
pub mod crypto;
pub mod state;
pub mod programs;
pub mod runtime;
pub mod txpool;
pub mod rpc;
pub mod node;

#[cfg(test)]
mod tests;

pub use crypto::{Address, Keypair};
pub use runtime::{Call, ExecutionEnv, Executor, Revert};
pub use txpool::{Tx, TxPool};
