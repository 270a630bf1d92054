//! The runtime's typed call surface: what a transaction can invoke, what a
//! call returns, and the events a successful call emits.

use serde::{Serialize, Deserialize};

use crate::crypto::Address;
use crate::utils::serde_helpers::amount_str;

/// Call context passed to program dispatch.
#[derive(Debug, Clone)]
pub struct MsgContext {
    pub caller: Address,
    /// Native currency attached to the call (payable calls only).
    pub value_wei: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Move native currency; the attached value is the amount.
    NativeTransfer { to: Address },
    Token(TokenCall),
    Stable(StableCall),
    Oracle(OracleCall),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCall {
    Transfer {
        to: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    Approve {
        spender: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    TransferFrom {
        from: Address,
        to: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StableCall {
    /// Payable: mints against the attached value.
    Mint,
    Burn {
        #[serde(with = "amount_str")]
        amount: u128,
    },
    /// Payable: deposits the attached value into the collateral buffer.
    DepositCollateralBuffer,
    WithdrawCollateralBuffer {
        #[serde(with = "amount_str")]
        amount: u128,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleCall {
    SetPrice {
        #[serde(with = "amount_str")]
        price: u128,
    },
}

impl Call {
    /// Whether native currency may be attached to this call.
    pub fn payable(&self) -> bool {
        matches!(
            self,
            Call::NativeTransfer { .. }
                | Call::Stable(StableCall::Mint)
                | Call::Stable(StableCall::DepositCollateralBuffer)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallReturn {
    None,
    Bool(bool),
    Amount(#[serde(with = "amount_str")] u128),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    Approval {
        token: Address,
        owner: Address,
        spender: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    Minted {
        to: Address,
        #[serde(with = "amount_str")]
        value_wei: u128,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    Burned {
        from: Address,
        #[serde(with = "amount_str")]
        amount: u128,
        #[serde(with = "amount_str")]
        refund_wei: u128,
    },
    BufferDeposited {
        from: Address,
        #[serde(with = "amount_str")]
        value_wei: u128,
        #[serde(with = "amount_str")]
        dpc_minted: u128,
    },
    BufferWithdrawn {
        to: Address,
        #[serde(with = "amount_str")]
        dpc_burned: u128,
        #[serde(with = "amount_str")]
        refund_wei: u128,
    },
    PriceUpdated {
        #[serde(with = "amount_str")]
        price: u128,
    },
}

/// Result of a successful call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub ret: CallReturn,
    pub events: Vec<Event>,
}
