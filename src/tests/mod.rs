//! Test module for the node.
//!
//! - Integration tests (genesis, runtime, txpool, rpc, end-to-end)
//! - Fuzz tests (random transfers, bogus calls, tx parsing)

pub mod integration;
pub mod fuzz;
