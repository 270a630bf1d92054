//! Crypto primitives: ed25519 keypairs, addresses, signatures.

pub mod keys;
pub mod sign;

pub use keys::{Keypair, PublicKey, Address, program_address};
pub use sign::{Signature, Signer, Verifier};
