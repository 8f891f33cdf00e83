//! # stark-sdk
//!
//! Rust client for Starknet nodes.
//!
//! ## Features
//!
//! - **Provider**: typed wrappers over the `starknet_*` JSON-RPC methods
//! - **Account**: multicall formatting, transaction hashing, signing, fee
//!   estimation and submission
//! - **SessionKeyPlugin**: wraps batches into a `use_plugin` call carrying
//!   Merkle proofs of the session policies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use stark_sdk::{Account, ExecuteDetails, Felt, FunctionCall, Provider, SigningKey};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Arc::new(Provider::connect("http://localhost:9545"));
//!     println!("chain id: {}", provider.chain_id().await?);
//!
//!     let key = SigningKey::from_hex("0x1234")?;
//!     let address = Felt::from_hex("0x0123")?;
//!     let account = Account::new(provider, address, key);
//!
//!     let token = Felt::from_hex("0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7")?;
//!     let transfer = FunctionCall::new(token, "transfer", vec![address, Felt::from(1u64), Felt::ZERO]);
//!     let sent = account.execute(&[transfer], ExecuteDetails::default()).await?;
//!     println!("tx: {}", sent.transaction_hash);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod calldata;
pub mod dispatch;
pub mod error;
pub mod plugin;
pub mod provider;
pub mod session;
pub mod transaction;
pub mod transport;
pub mod types;
pub mod version;

pub use account::{Account, AccountBuilder, AccountVersion};
pub use error::SdkError;
pub use plugin::AccountPlugin;
pub use provider::Provider;
pub use session::{Policy, Session, SessionKeyPlugin};
pub use transaction::{Transaction, TransactionReceipt, TransactionStatus, TransactionType};
pub use transport::{MockTransport, RecordedRequest, Transport};
pub use types::{BlockId, EntryPoint, ExecuteDetails, FeeEstimate, FunctionCall};
pub use version::RPC_SPEC_VERSION;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export commonly used types
pub use stark_crypto::{Signature, SigningKey};
pub use stark_primitives::Felt;
