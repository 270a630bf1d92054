//! Keypairs and address derivation.
//!
//! Addresses are `0x`-prefixed hex of the first 20 bytes of the blake3 hash
//! of the ed25519 public key. Program accounts live at addresses derived from
//! a well-known label instead of a key.

use ed25519_dalek::{Keypair as DalekKeypair, PublicKey as DalekPublic, SecretKey};
use rand_core::OsRng;
use serde::{Serialize, Deserialize};
use anyhow::Result;

/// Account address (hex string with `0x` prefix)
pub type Address = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "crate::utils::serde_helpers::hex_array")] pub [u8; 32]);

impl PublicKey {
    /// Derive the account address for this key.
    pub fn address(&self) -> Address {
        let digest = blake3::hash(&self.0);
        format!("0x{}", hex::encode(&digest.as_bytes()[..20]))
    }
}

/// Derive the deterministic address of a built-in program.
pub fn program_address(label: &str) -> Address {
    let digest = blake3::hash(format!("oxyr/program/{}", label).as_bytes());
    format!("0x{}", hex::encode(&digest.as_bytes()[..20]))
}

pub struct Keypair {
    pub keypair: DalekKeypair,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let kp = DalekKeypair::generate(&mut OsRng);
        Self { keypair: kp }
    }

    /// Construct from raw secret bytes
    pub fn from_bytes(secret: &[u8]) -> Result<Self> {
        let sk = SecretKey::from_bytes(secret)?;
        let pk = DalekPublic::from(&sk);
        let kp = DalekKeypair { secret: sk, public: pk };
        Ok(Self { keypair: kp })
    }

    /// Deterministic keypair for development account `index` (genesis signers)
    pub fn dev(index: u8) -> Self {
        let mut secret = [0u8; 32];
        secret[0] = index;
        secret[1..5].copy_from_slice(b"oxyr");
        Self::from_bytes(&secret).expect("32-byte secret is always valid")
    }

    /// Get public key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.keypair.public.to_bytes())
    }

    /// Account address of this keypair
    pub fn address(&self) -> Address {
        self.public().address()
    }

    /// Export secret as bytes
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.keypair.secret.to_bytes()
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_bytes(&self.secret_bytes()).expect("round-trip of valid secret")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_derivation_stable() {
        let kp = Keypair::dev(1);
        let addr = kp.address();
        assert!(addr.starts_with("0x"));
        assert_eq!(addr.len(), 42);
        assert_eq!(addr, Keypair::dev(1).address());
        assert_ne!(addr, Keypair::dev(2).address());
    }

    #[test]
    fn test_program_address_distinct() {
        assert_ne!(program_address("token"), program_address("stablecoin"));
        assert_eq!(program_address("token"), program_address("token"));
    }

    #[test]
    fn test_generate_and_rebuild() {
        let kp = Keypair::generate();
        let rebuilt = Keypair::from_bytes(&kp.secret_bytes()).unwrap();
        assert_eq!(kp.public(), rebuilt.public());
    }
}
