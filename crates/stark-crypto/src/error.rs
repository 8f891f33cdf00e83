//! Cryptographic errors

use stark_primitives::Felt;
use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signing failed
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Signature verification could not be performed
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid private key
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Entry point name cannot be turned into a selector
    #[error("invalid entry point name: {0}")]
    InvalidSelectorName(String),

    /// Merkle tree built without leaves
    #[error("merkle tree needs at least one leaf")]
    EmptyMerkleTree,

    /// Leaf is not part of the tree
    #[error("key {0} not found in merkle tree")]
    LeafNotFound(Felt),
}
