//! # stark-crypto
//!
//! Cryptographic helpers for the Starknet client.
//!
//! - Pedersen hash chains (`compute_hash_on_elements`)
//! - Entry point selectors (`starknet_keccak`)
//! - ECDSA signing/verification over the STARK curve
//! - Fixed-size Merkle trees for policy proofs
//!
//! The curve arithmetic itself comes from `starknet-crypto`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod merkle;
mod signature;

pub use error::CryptoError;
pub use hash::{
    compute_hash_on_elements, get_selector_from_name, hash_elements, pedersen_hash,
    starknet_keccak,
};
pub use merkle::{merkle_hash, verify_merkle_path, FixedSizeMerkleTree};
pub use signature::{verify, Signature, SigningKey};
