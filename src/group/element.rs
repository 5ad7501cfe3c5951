//! Distinct value types for the two rings the protocol works in.
//!
//! [`Element`] lives in `Z_p` (group elements, commitments, published terms) and
//! [`Scalar`] lives in `Z_q` (secrets, challenges, responses). Neither type knows
//! its modulus; arithmetic goes through [`GroupParameters`](super::GroupParameters).

use std::fmt;

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An element of `Z_p`. Values produced by this crate are always in `[1, p)`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(BigUint);

/// An exponent in `Z_q`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scalar(BigUint);

impl Element {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn one() -> Self {
        Self(BigUint::one())
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }
}

impl Scalar {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }
}

impl From<u64> for Element {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element(0x{})", self.0.to_str_radix(16))
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar(0x{})", self.0.to_str_radix(16))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.to_str_radix(16))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.to_str_radix(16))
    }
}

/// Serde helpers encoding a `BigUint` as a big-endian hex string.
pub mod hex_biguint {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value.to_bytes_be()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        let trimmed = text.strip_prefix("0x").unwrap_or(&text);
        // hex::decode wants an even number of digits
        let padded = if trimmed.len() % 2 == 1 {
            format!("0{trimmed}")
        } else {
            trimmed.to_string()
        };
        let bytes = hex::decode(padded).map_err(D::Error::custom)?;
        Ok(BigUint::from_bytes_be(&bytes))
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex_biguint::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        hex_biguint::deserialize(deserializer).map(Self)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex_biguint::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        hex_biguint::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_encoding_accepts_prefix_and_odd_length() {
        let parsed: Element = serde_json::from_str("\"0x1cd\"").unwrap();
        assert_eq!(parsed, Element::from(461));

        let json = serde_json::to_string(&Scalar::from(1019)).unwrap();
        assert_eq!(json, "\"03fb\"");
    }

    #[test]
    fn test_rejects_non_hex() {
        assert!(serde_json::from_str::<Scalar>("\"zz\"").is_err());
    }
}
