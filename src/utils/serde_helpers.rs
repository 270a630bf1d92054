use serde::{Deserialize, Serializer, Deserializer};
use serde::de::Error as DeError;

/// Serialize bytes as hex string
pub fn as_hex<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&hex::encode(bytes))
}

/// Deserialize hex string into bytes
pub fn from_hex<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    hex::decode(&s).map_err(D::Error::custom)
}

/// Wei / token amounts as decimal strings.
///
/// u128 does not fit in a JSON number, so every amount that crosses the RPC
/// boundary is encoded as a decimal string. Use with `#[serde(with = "...")]`.
pub mod amount_str {
    use super::*;

    pub fn serialize<S>(v: &u128, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse::<u128>().map_err(D::Error::custom)
    }
}

/// Fixed-size byte arrays as hex strings (public keys, signatures).
pub mod hex_array {
    use super::*;

    pub fn serialize<S, const N: usize>(v: &[u8; N], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&hex::encode(v))
    }

    pub fn deserialize<'de, D, const N: usize>(d: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected {} bytes", N)))
    }
}
