//! Built-in programs: the fungible token, the price oracle, and the
//! collateral stablecoin. Program state is a plain struct, bincode-encoded
//! into the data field of the owning program account; the execution
//! environment loads it, applies one operation, and stores it back (or rolls
//! the whole call back on revert).

pub mod math;
pub mod token;
pub mod oracle;
pub mod stablecoin;

pub use token::TokenLedger;
pub use oracle::PriceOracle;
pub use stablecoin::{StableCoin, INITIAL_COLLATERAL_RATIO_PERCENTAGE};
