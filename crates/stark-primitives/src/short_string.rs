//! Cairo short strings
//!
//! A short string packs up to 31 ASCII characters into a single felt,
//! big-endian. Chain ids (`SN_MAIN`, `SN_GOERLI`) and the transaction hash
//! prefixes are short strings.

use thiserror::Error;

use crate::felt::Felt;

/// Maximum number of characters in a short string
pub const MAX_SHORT_STRING_LEN: usize = 31;

/// Short string conversion error
#[derive(Debug, Error)]
pub enum ShortStringError {
    /// More than 31 characters
    #[error("short string too long: {0} characters")]
    TooLong(usize),
    /// Contains a non-ASCII character
    #[error("short string must be ASCII: {0}")]
    NonAscii(String),
    /// Felt bytes do not decode to ASCII
    #[error("felt is not an ASCII short string: {0}")]
    NotAscii(Felt),
}

impl Felt {
    /// Encode an ASCII string of at most 31 characters
    pub fn from_short_string(s: &str) -> Result<Self, ShortStringError> {
        if !s.is_ascii() {
            return Err(ShortStringError::NonAscii(s.to_string()));
        }
        if s.len() > MAX_SHORT_STRING_LEN {
            return Err(ShortStringError::TooLong(s.len()));
        }
        let mut bytes = [0u8; 32];
        bytes[32 - s.len()..].copy_from_slice(s.as_bytes());
        // 31 bytes never reach the modulus
        Ok(Felt::from_bytes_be(&bytes).unwrap_or(Felt::ZERO))
    }

    /// Decode the felt back into its ASCII characters
    pub fn to_short_string(&self) -> Result<String, ShortStringError> {
        let bytes = self.to_bytes_be();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(32);
        let chars = &bytes[start..];
        if bytes[0] != 0 || !chars.is_ascii() {
            return Err(ShortStringError::NotAscii(*self));
        }
        Ok(chars.iter().map(|&b| b as char).collect())
    }
}
