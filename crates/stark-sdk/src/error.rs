//! SDK error types

use stark_crypto::CryptoError;
use stark_primitives::{FeltError, PrimitiveError, ShortStringError};
use thiserror::Error;

/// JSON-RPC "method not found"
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC "invalid params"
pub const CODE_INVALID_PARAMS: i64 = -32602;
/// JSON-RPC "internal error"
pub const CODE_INTERNAL_ERROR: i64 = -32603;
/// Starknet "contract not found"
pub const CODE_CONTRACT_NOT_FOUND: i64 = 20;
/// Starknet "block not found"
pub const CODE_BLOCK_NOT_FOUND: i64 = 24;
/// Starknet "transaction hash not found"
pub const CODE_TRANSACTION_HASH_NOT_FOUND: i64 = 25;
/// Starknet "invalid transaction index in a block"
pub const CODE_INVALID_TRANSACTION_INDEX: i64 = 27;
/// Starknet "class hash not found"
pub const CODE_CLASS_HASH_NOT_FOUND: i64 = 28;
/// Starknet "contract error"
pub const CODE_CONTRACT_ERROR: i64 = 40;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// RPC error from node without a dedicated variant
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Node answered with a null result
    #[error("Not found")]
    NotFound,

    /// Method not exposed by the node
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Node internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Parameters rejected by the node
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Contract not found
    #[error("Contract not found")]
    ContractNotFound,

    /// Block not found
    #[error("Block not found")]
    BlockNotFound,

    /// Transaction hash not found
    #[error("Transaction hash not found")]
    TransactionHashNotFound,

    /// Invalid transaction index in a block
    #[error("Invalid transaction index in a block")]
    InvalidTransactionIndex,

    /// Class hash not found
    #[error("Class hash not found")]
    ClassHashNotFound,

    /// Contract execution failed
    #[error("Contract error: {0}")]
    ContractError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Response decoded but does not hold the expected value
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Nonce could not be resolved
    #[error("Nonce error: {0}")]
    Nonce(String),

    /// Operation not available for this account version
    #[error("Unsupported account version: {0}")]
    UnsupportedAccountVersion(String),

    /// More than one plugin configured on an account
    #[error("multiple plugins not supported")]
    MultiplePlugins,

    /// Merkle proofs of a batch differ in length
    #[error("proof does not match proof size: expected {expected}, got {got}")]
    ProofLengthMismatch {
        /// Length of the first proof
        expected: usize,
        /// Length of the offending proof
        got: usize,
    },

    /// Node speaks an incompatible RPC spec version
    #[error("RPC version incompatible: provider {provider}, sdk {sdk}")]
    VersionIncompatible {
        /// Version reported by the node
        provider: String,
        /// Version this SDK targets
        sdk: String,
    },

    /// Cryptographic failure
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Primitive conversion failure
    #[error("Primitive error: {0}")]
    Primitive(#[from] PrimitiveError),
}

impl SdkError {
    /// Map a node error code onto the typed taxonomy
    pub fn from_rpc(code: i64, message: String) -> Self {
        match code {
            CODE_METHOD_NOT_FOUND => SdkError::MethodNotFound(message),
            CODE_INVALID_PARAMS => SdkError::InvalidParams(message),
            CODE_INTERNAL_ERROR => SdkError::Internal(message),
            CODE_CONTRACT_NOT_FOUND => SdkError::ContractNotFound,
            CODE_BLOCK_NOT_FOUND => SdkError::BlockNotFound,
            CODE_TRANSACTION_HASH_NOT_FOUND => SdkError::TransactionHashNotFound,
            CODE_INVALID_TRANSACTION_INDEX => SdkError::InvalidTransactionIndex,
            CODE_CLASS_HASH_NOT_FOUND => SdkError::ClassHashNotFound,
            CODE_CONTRACT_ERROR => SdkError::ContractError(message),
            _ => SdkError::Rpc { code, message },
        }
    }

    /// Re-map raw `Rpc` errors, leave everything else untouched
    pub fn classify(self) -> Self {
        match self {
            SdkError::Rpc { code, message } => SdkError::from_rpc(code, message),
            other => other,
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<FeltError> for SdkError {
    fn from(e: FeltError) -> Self {
        SdkError::Primitive(e.into())
    }
}

impl From<ShortStringError> for SdkError {
    fn from(e: ShortStringError) -> Self {
        SdkError::Primitive(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rpc_known_codes() {
        assert!(matches!(
            SdkError::from_rpc(-32601, "x".into()),
            SdkError::MethodNotFound(_)
        ));
        assert!(matches!(
            SdkError::from_rpc(-32602, "x".into()),
            SdkError::InvalidParams(_)
        ));
        assert!(matches!(
            SdkError::from_rpc(-32603, "x".into()),
            SdkError::Internal(_)
        ));
        assert!(matches!(SdkError::from_rpc(20, "x".into()), SdkError::ContractNotFound));
        assert!(matches!(SdkError::from_rpc(24, "x".into()), SdkError::BlockNotFound));
        assert!(matches!(
            SdkError::from_rpc(25, "x".into()),
            SdkError::TransactionHashNotFound
        ));
        assert!(matches!(
            SdkError::from_rpc(27, "x".into()),
            SdkError::InvalidTransactionIndex
        ));
        assert!(matches!(SdkError::from_rpc(28, "x".into()), SdkError::ClassHashNotFound));
        assert!(matches!(
            SdkError::from_rpc(40, "boom".into()),
            SdkError::ContractError(m) if m == "boom"
        ));
    }

    #[test]
    fn test_from_rpc_unknown_code_passes_through() {
        match SdkError::from_rpc(53, "Max fee too small".into()) {
            SdkError::Rpc { code, message } => {
                assert_eq!(code, 53);
                assert_eq!(message, "Max fee too small");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_classify_leaves_other_errors() {
        let err = SdkError::Transport("connection refused".into()).classify();
        assert!(matches!(err, SdkError::Transport(_)));
    }

    #[test]
    fn test_error_display() {
        let err = SdkError::ProofLengthMismatch { expected: 2, got: 3 };
        assert!(err.to_string().contains("expected 2, got 3"));
        let err = SdkError::VersionIncompatible {
            provider: "0.5.1".into(),
            sdk: "0.3.0".into(),
        };
        assert!(err.to_string().contains("0.5.1"));
    }
}
