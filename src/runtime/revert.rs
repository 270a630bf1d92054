//! Typed revert reasons.
//!
//! A revert aborts the whole call: the environment rolls every state change
//! back before surfacing the reason. Two shapes exist, mirroring the external
//! error surface: plain message reverts for simple precondition failures, and
//! structured reverts carrying data alongside the message.

use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Revert {
    /// Plain string revert, e.g. `"ERC20: Transfer amount exceeded."`
    #[error("{0}")]
    Message(String),

    /// Structured revert raised when the first collateral-buffer deposit does
    /// not reach the minimum ratio. Carries the minimum acceptable deposit.
    #[error("{message}{minimum_wei}")]
    InitialCollateralRatio {
        message: String,
        #[serde(with = "crate::utils::serde_helpers::amount_str")]
        minimum_wei: u128,
    },
}

impl Revert {
    pub fn msg(m: impl Into<String>) -> Self {
        Revert::Message(m.into())
    }

    /// Checked-arithmetic failure. Callers treat overflow as a revert rather
    /// than wrapping.
    pub fn overflow() -> Self {
        Revert::Message("STC: Arithmetic overflow.".to_string())
    }
}
