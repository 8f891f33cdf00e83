//! Provider - node queries over JSON-RPC

use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use stark_primitives::Felt;
use tracing::{debug, info, warn};

use crate::dispatch::dispatch;
use crate::transaction::{Transaction, TransactionReceipt};
use crate::transport::{MockTransport, Transport};
use crate::types::{
    AddDeclareTransactionOutput, AddDeployAccountTransactionOutput, AddInvokeTransactionOutput,
    BlockHashAndNumber, BlockId, BlockWithTxHashes, BlockWithTxs, EventFilter, EventsChunk,
    FeeEstimate, FunctionCall, InvokeRequest, StateUpdate, SyncStatus,
};
use crate::version::{check_version_compatibility, RPC_SPEC_VERSION};
use crate::SdkError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Starknet node client
///
/// Holds the transport and a chain id cache. Share it between accounts
/// with `Arc<Provider>`.
pub struct Provider {
    transport: Box<dyn Transport>,
    chain_id: RwLock<Option<Felt>>,
}

impl Provider {
    /// Create a provider with HTTP transport
    #[cfg(feature = "http")]
    pub fn connect(url: &str) -> Self {
        debug!(url, "connecting provider");
        Self::with_transport(HttpTransport::new(url))
    }

    /// Create a provider with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Create a provider with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            chain_id: RwLock::new(None),
        }
    }

    /// Helper method to make RPC request and deserialize
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T, SdkError> {
        dispatch(self.transport.as_ref(), method, params).await
    }

    // ==================== Chain Info ====================

    /// Get the chain id, queried once and cached
    pub async fn chain_id(&self) -> Result<Felt, SdkError> {
        if let Some(id) = *self.chain_id.read() {
            return Ok(id);
        }
        let id: Felt = self.request("starknet_chainId", vec![]).await?;
        *self.chain_id.write() = Some(id);
        Ok(id)
    }

    /// Get the sync status
    pub async fn syncing(&self) -> Result<SyncStatus, SdkError> {
        self.request("starknet_syncing", vec![]).await
    }

    /// Get the RPC spec version the node implements
    pub async fn spec_version(&self) -> Result<String, SdkError> {
        self.request("starknet_specVersion", vec![]).await
    }

    /// Check the node's spec version against [`RPC_SPEC_VERSION`]
    pub async fn check_version_compatibility(&self) -> Result<(), SdkError> {
        let version = self.spec_version().await?;
        check_version_compatibility(&version, RPC_SPEC_VERSION).map_err(|e| {
            warn!(provider = %version, sdk = RPC_SPEC_VERSION, "rpc version mismatch");
            e
        })
    }

    /// Whether the node's spec version matches [`RPC_SPEC_VERSION`]
    pub async fn is_compatible(&self) -> Result<bool, SdkError> {
        match self.check_version_compatibility().await {
            Ok(()) => Ok(true),
            Err(SdkError::VersionIncompatible { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ==================== Block Queries ====================

    /// Get the latest block number
    pub async fn block_number(&self) -> Result<u64, SdkError> {
        self.request("starknet_blockNumber", vec![]).await
    }

    /// Get the latest block hash and number
    pub async fn block_hash_and_number(&self) -> Result<BlockHashAndNumber, SdkError> {
        self.request("starknet_blockHashAndNumber", vec![]).await
    }

    /// Get a block with transaction hashes
    pub async fn get_block_with_tx_hashes(&self, block: BlockId) -> Result<BlockWithTxHashes, SdkError> {
        self.request("starknet_getBlockWithTxHashes", vec![serde_json::to_value(block)?])
            .await
    }

    /// Get a block with full transactions
    pub async fn get_block_with_txs(&self, block: BlockId) -> Result<BlockWithTxs, SdkError> {
        self.request("starknet_getBlockWithTxs", vec![serde_json::to_value(block)?])
            .await
    }

    /// Get the number of transactions in a block
    pub async fn get_block_transaction_count(&self, block: BlockId) -> Result<u64, SdkError> {
        self.request("starknet_getBlockTransactionCount", vec![serde_json::to_value(block)?])
            .await
    }

    /// Get the state changes of a block
    pub async fn get_state_update(&self, block: BlockId) -> Result<StateUpdate, SdkError> {
        self.request("starknet_getStateUpdate", vec![serde_json::to_value(block)?])
            .await
    }

    // ==================== Transaction Queries ====================

    /// Get a transaction by hash
    pub async fn get_transaction_by_hash(&self, hash: Felt) -> Result<Transaction, SdkError> {
        self.request("starknet_getTransactionByHash", vec![json!(hash)])
            .await
    }

    /// Get a transaction by its position in a block
    pub async fn get_transaction_by_block_id_and_index(
        &self,
        block: BlockId,
        index: u64,
    ) -> Result<Transaction, SdkError> {
        self.request(
            "starknet_getTransactionByBlockIdAndIndex",
            vec![serde_json::to_value(block)?, json!(index)],
        )
        .await
    }

    /// Get a transaction receipt
    pub async fn get_transaction_receipt(&self, hash: Felt) -> Result<TransactionReceipt, SdkError> {
        self.request("starknet_getTransactionReceipt", vec![json!(hash)])
            .await
    }

    /// Poll the receipt until the transaction reaches a final status
    ///
    /// A missing receipt counts as not yet final. Never gives up on its own;
    /// bound it with `tokio::time::timeout`.
    pub async fn wait_for_transaction(
        &self,
        hash: Felt,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt, SdkError> {
        loop {
            match self.get_transaction_receipt(hash).await {
                Ok(receipt) if receipt.is_final() => {
                    info!(tx_hash = %hash, status = ?receipt.status(), "transaction final");
                    return Ok(receipt);
                }
                Ok(receipt) => {
                    debug!(tx_hash = %hash, status = ?receipt.status(), "transaction not final");
                }
                Err(SdkError::TransactionHashNotFound | SdkError::NotFound) => {
                    debug!(tx_hash = %hash, "receipt not available yet");
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    // ==================== Contract Queries ====================

    /// Get a class definition by hash
    pub async fn get_class(&self, block: BlockId, class_hash: Felt) -> Result<Value, SdkError> {
        self.request("starknet_getClass", vec![serde_json::to_value(block)?, json!(class_hash)])
            .await
    }

    /// Get the class definition of a deployed contract
    pub async fn get_class_at(&self, block: BlockId, contract_address: Felt) -> Result<Value, SdkError> {
        self.request(
            "starknet_getClassAt",
            vec![serde_json::to_value(block)?, json!(contract_address)],
        )
        .await
    }

    /// Get the class hash of a deployed contract
    pub async fn get_class_hash_at(&self, block: BlockId, contract_address: Felt) -> Result<Felt, SdkError> {
        self.request(
            "starknet_getClassHashAt",
            vec![serde_json::to_value(block)?, json!(contract_address)],
        )
        .await
    }

    /// Get a storage slot value
    pub async fn get_storage_at(
        &self,
        contract_address: Felt,
        key: Felt,
        block: BlockId,
    ) -> Result<Felt, SdkError> {
        self.request(
            "starknet_getStorageAt",
            vec![json!(contract_address), json!(key), serde_json::to_value(block)?],
        )
        .await
    }

    /// Get a contract's nonce
    pub async fn get_nonce(&self, block: BlockId, contract_address: Felt) -> Result<Felt, SdkError> {
        self.request(
            "starknet_getNonce",
            vec![serde_json::to_value(block)?, json!(contract_address)],
        )
        .await
    }

    /// Call a view function, returning the raw result strings
    pub async fn call_raw(&self, call: &FunctionCall, block: BlockId) -> Result<Vec<String>, SdkError> {
        let request = call.to_request()?;
        self.request(
            "starknet_call",
            vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
        )
        .await
    }

    /// Call a view function
    pub async fn call(&self, call: &FunctionCall, block: BlockId) -> Result<Vec<Felt>, SdkError> {
        self.call_raw(call, block)
            .await?
            .iter()
            .map(|s| {
                s.parse::<Felt>()
                    .map_err(|e| SdkError::InvalidResponse(format!("call result {}: {}", s, e)))
            })
            .collect()
    }

    /// Estimate the fee of a signed invoke
    pub async fn estimate_fee(&self, request: &InvokeRequest, block: BlockId) -> Result<FeeEstimate, SdkError> {
        self.request(
            "starknet_estimateFee",
            vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
        )
        .await
    }

    // ==================== Events ====================

    /// Get one page of events
    pub async fn get_events(
        &self,
        filter: &EventFilter,
        chunk_size: u64,
        continuation_token: Option<&str>,
    ) -> Result<EventsChunk, SdkError> {
        let mut params = serde_json::to_value(filter)?;
        if let Value::Object(map) = &mut params {
            map.insert("chunk_size".into(), json!(chunk_size));
            if let Some(token) = continuation_token {
                map.insert("continuation_token".into(), json!(token));
            }
        }
        self.request("starknet_getEvents", vec![params]).await
    }

    // ==================== Submission ====================

    /// Submit a signed invoke transaction
    pub async fn add_invoke_transaction(
        &self,
        request: &InvokeRequest,
    ) -> Result<AddInvokeTransactionOutput, SdkError> {
        let output: AddInvokeTransactionOutput = self
            .request("starknet_addInvokeTransaction", vec![serde_json::to_value(request)?])
            .await?;
        info!(tx_hash = %output.transaction_hash, "invoke transaction submitted");
        Ok(output)
    }

    /// Submit a declare transaction, passed through as built by the caller
    pub async fn add_declare_transaction(
        &self,
        transaction: Value,
    ) -> Result<AddDeclareTransactionOutput, SdkError> {
        let output: AddDeclareTransactionOutput = self
            .request("starknet_addDeclareTransaction", vec![transaction])
            .await?;
        info!(tx_hash = %output.transaction_hash, class_hash = %output.class_hash, "declare transaction submitted");
        Ok(output)
    }

    /// Submit a deploy-account transaction, passed through as built by the caller
    pub async fn add_deploy_account_transaction(
        &self,
        transaction: Value,
    ) -> Result<AddDeployAccountTransactionOutput, SdkError> {
        let output: AddDeployAccountTransactionOutput = self
            .request("starknet_addDeployAccountTransaction", vec![transaction])
            .await?;
        info!(
            tx_hash = %output.transaction_hash,
            contract_address = %output.contract_address,
            "deploy account transaction submitted"
        );
        Ok(output)
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("chain_id", &*self.chain_id.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chain_id_is_cached() {
        let transport = MockTransport::new();
        let provider = Provider::with_transport(transport.clone());

        let first = provider.chain_id().await.unwrap();
        let second = provider.chain_id().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Felt::from_short_string("SN_GOERLI").unwrap());
        assert_eq!(transport.call_count("starknet_chainId"), 1);
    }

    #[tokio::test]
    async fn test_chain_id_error_not_cached() {
        let transport = MockTransport::new();
        transport.set_error("starknet_chainId", -32603, "boom");
        let provider = Provider::with_transport(transport.clone());

        assert!(matches!(provider.chain_id().await, Err(SdkError::Internal(_))));
        transport.clear_responses();
        assert!(provider.chain_id().await.is_ok());
        assert_eq!(transport.call_count("starknet_chainId"), 2);
    }

    #[tokio::test]
    async fn test_call_rejects_garbage() {
        let transport = MockTransport::new();
        transport.set_response("starknet_call", json!(["0x1", "zz"]));
        let provider = Provider::with_transport(transport);
        let call = FunctionCall::new(Felt::ONE, "get_balance", vec![]);
        assert!(matches!(
            provider.call(&call, BlockId::LATEST).await,
            Err(SdkError::InvalidResponse(_))
        ));
    }
}
