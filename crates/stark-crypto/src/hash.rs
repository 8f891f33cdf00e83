//! Pedersen hash chains and entry point selectors

use sha3::{Digest, Keccak256};
use stark_primitives::Felt;

use crate::error::CryptoError;

/// Entry point names that map to the zero selector
const DEFAULT_ENTRY_POINT_NAME: &str = "__default__";
const DEFAULT_L1_ENTRY_POINT_NAME: &str = "__l1_default__";

/// Pedersen hash of two field elements
pub fn pedersen_hash(a: &Felt, b: &Felt) -> Felt {
    Felt::from(starknet_crypto::pedersen_hash(
        a.as_field_element(),
        b.as_field_element(),
    ))
}

/// Pedersen chain without the trailing length: `h(...h(h(0, e0), e1)..., en)`
pub fn hash_elements(elements: &[Felt]) -> Felt {
    elements
        .iter()
        .fold(Felt::ZERO, |acc, element| pedersen_hash(&acc, element))
}

/// Hash a list of elements
///
/// `h(h(h(h(0, e0), e1), ...), en), n)`. Used for calldata and transaction
/// hashes.
pub fn compute_hash_on_elements(elements: &[Felt]) -> Felt {
    pedersen_hash(&hash_elements(elements), &Felt::from(elements.len()))
}

/// Keccak-256 truncated to 250 bits
pub fn starknet_keccak(data: &[u8]) -> Felt {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut bytes: [u8; 32] = hasher.finalize().into();
    bytes[0] &= 0x03;
    // 250-bit values are always below the modulus
    Felt::from_bytes_be(&bytes).unwrap_or(Felt::ZERO)
}

/// Compute the selector of an entry point from its name
///
/// The default entry points map to zero. Names must be ASCII.
pub fn get_selector_from_name(name: &str) -> Result<Felt, CryptoError> {
    if name == DEFAULT_ENTRY_POINT_NAME || name == DEFAULT_L1_ENTRY_POINT_NAME {
        return Ok(Felt::ZERO);
    }
    if !name.is_ascii() {
        return Err(CryptoError::InvalidSelectorName(name.to_string()));
    }
    Ok(starknet_keccak(name.as_bytes()))
}
