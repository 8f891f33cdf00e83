//! Field element type (Felt)

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul};
use std::str::FromStr;

use starknet_crypto::FieldElement;
use thiserror::Error;

/// Field element parsing error
#[derive(Debug, Error)]
pub enum FeltError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid decimal string
    #[error("invalid decimal string: {0}")]
    InvalidDecimal(String),
    /// Value does not fit below the field modulus
    #[error("value out of field range: {0}")]
    OutOfRange(String),
}

/// Element of the STARK prime field.
///
/// All on-chain values (addresses, selectors, hashes, calldata) are felts.
/// On the wire they travel as `0x`-prefixed hex strings without leading zeros.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Felt(FieldElement);

impl Felt {
    /// Zero
    pub const ZERO: Felt = Felt(FieldElement::ZERO);

    /// One
    pub const ONE: Felt = Felt(FieldElement::ONE);

    /// Two
    pub const TWO: Felt = Felt(FieldElement::TWO);

    /// Create from big-endian bytes, rejecting values not below the modulus
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Result<Self, FeltError> {
        FieldElement::from_bytes_be(bytes)
            .map(Felt)
            .map_err(|_| FeltError::OutOfRange(format!("0x{}", hex::encode(bytes))))
    }

    /// Parse from hex string
    ///
    /// Accepts both with and without "0x" prefix, odd lengths and mixed case.
    pub fn from_hex(s: &str) -> Result<Self, FeltError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || digits.len() > 64 {
            return Err(FeltError::InvalidHex(s.to_string()));
        }
        let padded = format!("{:0>64}", digits);
        let decoded = hex::decode(&padded).map_err(|_| FeltError::InvalidHex(s.to_string()))?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Self::from_bytes_be(&bytes)
    }

    /// Parse from decimal string
    pub fn from_dec_str(s: &str) -> Result<Self, FeltError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FeltError::InvalidDecimal(s.to_string()));
        }
        FieldElement::from_dec_str(s)
            .map(Felt)
            .map_err(|_| FeltError::OutOfRange(s.to_string()))
    }

    /// Get big-endian bytes
    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.0.to_bytes_be()
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == FieldElement::ZERO
    }

    /// Convert to the canonical wire form: `0x` followed by hex without leading zeros
    pub fn to_hex(&self) -> String {
        let encoded = hex::encode(self.to_bytes_be());
        let trimmed = encoded.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }

    /// Convert to a zero-padded 64 digit hex string
    pub fn to_fixed_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes_be()))
    }

    /// Convert to u64 if the value fits
    pub fn to_u64(&self) -> Option<u64> {
        let bytes = self.to_bytes_be();
        if bytes[..24].iter().any(|&b| b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[24..]);
        Some(u64::from_be_bytes(low))
    }

    /// Convert to u128 if the value fits
    pub fn to_u128(&self) -> Option<u128> {
        let bytes = self.to_bytes_be();
        if bytes[..16].iter().any(|&b| b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&bytes[16..]);
        Some(u128::from_be_bytes(low))
    }

    /// Get the underlying field element
    pub fn as_field_element(&self) -> &FieldElement {
        &self.0
    }
}

impl Default for Felt {
    fn default() -> Self {
        Felt::ZERO
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({})", self.to_hex())
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Felt {
    type Err = FeltError;

    /// Hex when prefixed with "0x", decimal otherwise
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") || s.starts_with("0X") {
            Felt::from_hex(s)
        } else {
            Felt::from_dec_str(s)
        }
    }
}

impl PartialOrd for Felt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Felt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes_be().cmp(&other.to_bytes_be())
    }
}

impl Hash for Felt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes_be().hash(state);
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Felt(FieldElement::from(value))
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        // 128-bit values are always below the modulus
        Felt::from_bytes_be(&bytes).unwrap_or(Felt::ZERO)
    }
}

impl From<usize> for Felt {
    fn from(value: usize) -> Self {
        Felt::from(value as u64)
    }
}

impl From<FieldElement> for Felt {
    fn from(value: FieldElement) -> Self {
        Felt(value)
    }
}

impl From<Felt> for FieldElement {
    fn from(value: Felt) -> Self {
        value.0
    }
}

impl Add for Felt {
    type Output = Felt;

    fn add(self, rhs: Felt) -> Felt {
        Felt(self.0 + rhs.0)
    }
}

impl Mul for Felt {
    type Output = Felt;

    fn mul(self, rhs: Felt) -> Felt {
        Felt(self.0 * rhs.0)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Felt {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    struct FeltVisitor;

    impl<'de> Visitor<'de> for FeltVisitor {
        type Value = Felt;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a hex or decimal field element")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Felt, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Felt, E> {
            Ok(Felt::from(v))
        }
    }

    impl<'de> Deserialize<'de> for Felt {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Felt, D::Error> {
            deserializer.deserialize_any(FeltVisitor)
        }
    }
}
