//! # stark-primitives
//!
//! Primitive types for the Starknet client.
//!
//! Everything on Starknet is a field element; this crate provides the
//! [`Felt`] type with its hex, decimal and short-string codecs.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod felt;
mod short_string;

pub use error::PrimitiveError;
pub use felt::{Felt, FeltError};
pub use short_string::{ShortStringError, MAX_SHORT_STRING_LEN};

/// Contract address type
pub type ContractAddress = Felt;

/// Class hash type
pub type ClassHash = Felt;

/// Transaction hash type
pub type TxHash = Felt;

/// Block number type
pub type BlockNumber = u64;
