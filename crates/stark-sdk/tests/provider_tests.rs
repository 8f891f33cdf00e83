//! Provider integration tests for stark-sdk
//!
//! Tests RPC method wrappers, parameter encoding and error mapping.

use std::time::Duration;

use serde_json::json;
use stark_sdk::types::{BlockId, EventFilter, SyncStatus};
use stark_sdk::{
    Felt, FunctionCall, MockTransport, Provider, SdkError, Transaction, TransactionStatus,
};

fn provider() -> (MockTransport, Provider) {
    let transport = MockTransport::new();
    let provider = Provider::with_transport(transport.clone());
    (transport, provider)
}

// ==================== Chain Info Tests ====================

#[tokio::test]
async fn test_chain_id() {
    let (_, provider) = provider();
    let chain_id = provider.chain_id().await.unwrap();
    assert_eq!(chain_id.to_short_string().unwrap(), "SN_GOERLI");
}

#[tokio::test]
async fn test_block_number() {
    let (_, provider) = provider();
    assert_eq!(provider.block_number().await.unwrap(), 256);
}

#[tokio::test]
async fn test_block_hash_and_number() {
    let (_, provider) = provider();
    let latest = provider.block_hash_and_number().await.unwrap();
    assert_eq!(latest.block_hash, Felt::from(0x1234u64));
    assert_eq!(latest.block_number, 256);
}

#[tokio::test]
async fn test_syncing() {
    let (transport, provider) = provider();
    assert_eq!(provider.syncing().await.unwrap(), SyncStatus::NotSyncing);

    transport.set_response(
        "starknet_syncing",
        json!({
            "starting_block_hash": "0x1",
            "starting_block_num": "0x1",
            "current_block_hash": "0x2",
            "current_block_num": "0x2",
            "highest_block_hash": "0x3",
            "highest_block_num": "0x3",
        }),
    );
    assert!(provider.syncing().await.unwrap().is_syncing());
}

// ==================== Version Tests ====================

#[tokio::test]
async fn test_compatible_version() {
    let (transport, provider) = provider();
    transport.set_response("starknet_specVersion", json!("0.3.1"));
    assert!(provider.is_compatible().await.unwrap());
    assert!(provider.check_version_compatibility().await.is_ok());
}

#[tokio::test]
async fn test_incompatible_version() {
    let (transport, provider) = provider();
    transport.set_response("starknet_specVersion", json!("0.6.0"));
    assert!(!provider.is_compatible().await.unwrap());
    assert!(matches!(
        provider.check_version_compatibility().await,
        Err(SdkError::VersionIncompatible { .. })
    ));
}

#[tokio::test]
async fn test_spec_version_unavailable() {
    let (transport, provider) = provider();
    transport.set_error("starknet_specVersion", -32601, "Method not found");
    assert!(matches!(
        provider.is_compatible().await,
        Err(SdkError::MethodNotFound(_))
    ));
}

// ==================== Block Queries ====================

#[tokio::test]
async fn test_get_block_with_tx_hashes_params() {
    let (transport, provider) = provider();
    transport.set_response(
        "starknet_getBlockWithTxHashes",
        json!({
            "status": "ACCEPTED_ON_L2",
            "block_hash": "0xb1",
            "parent_hash": "0xb0",
            "block_number": 7,
            "new_root": "0x99",
            "timestamp": 1_680_000_000u64,
            "sequencer_address": "0x5",
            "transactions": ["0x1", "0x2", "0x3"],
        }),
    );

    let block = provider
        .get_block_with_tx_hashes(BlockId::Number(7))
        .await
        .unwrap();
    assert_eq!(block.header.block_number, Some(7));
    assert_eq!(block.transactions.len(), 3);

    let recorded = &transport.requests_for("starknet_getBlockWithTxHashes")[0];
    assert_eq!(recorded.params, vec![json!({ "block_number": 7 })]);
}

#[tokio::test]
async fn test_get_block_with_txs() {
    let (transport, provider) = provider();
    transport.set_response(
        "starknet_getBlockWithTxs",
        json!({
            "parent_hash": "0xb0",
            "timestamp": 1_680_000_000u64,
            "sequencer_address": "0x5",
            "transactions": [{
                "type": "INVOKE",
                "version": "0x1",
                "transaction_hash": "0x11",
                "max_fee": "0x1",
                "signature": [],
                "nonce": "0x0",
                "sender_address": "0x22",
                "calldata": [],
            }],
        }),
    );

    let block = provider.get_block_with_txs(BlockId::PENDING).await.unwrap();
    assert!(block.header.block_hash.is_none());
    assert!(matches!(block.transactions[0], Transaction::InvokeV1(_)));
}

#[tokio::test]
async fn test_unknown_block() {
    let (transport, provider) = provider();
    transport.set_error("starknet_getBlockTransactionCount", 24, "Block not found");
    assert!(matches!(
        provider
            .get_block_transaction_count(BlockId::Hash(Felt::from(0xdeadu64)))
            .await,
        Err(SdkError::BlockNotFound)
    ));
}

#[tokio::test]
async fn test_get_state_update() {
    let (transport, provider) = provider();
    transport.set_response(
        "starknet_getStateUpdate",
        json!({
            "block_hash": "0x1",
            "new_root": "0x2",
            "old_root": "0x3",
            "state_diff": {
                "storage_diffs": [{
                    "address": "0x10",
                    "storage_entries": [{ "key": "0x1", "value": "0x2" }],
                }],
                "nonces": [{ "contract_address": "0x10", "nonce": "0x4" }],
            },
        }),
    );

    let update = provider.get_state_update(BlockId::LATEST).await.unwrap();
    assert_eq!(update.state_diff.storage_diffs.len(), 1);
    assert_eq!(update.state_diff.nonces[0].nonce, Felt::from(4u64));
    assert!(update.state_diff.deployed_contracts.is_empty());
}

// ==================== Transaction Queries ====================

#[tokio::test]
async fn test_transaction_not_found() {
    let (transport, provider) = provider();
    transport.set_error("starknet_getTransactionByHash", 25, "Transaction hash not found");
    assert!(matches!(
        provider.get_transaction_by_hash(Felt::ONE).await,
        Err(SdkError::TransactionHashNotFound)
    ));
}

#[tokio::test]
async fn test_transaction_null_result() {
    let (transport, provider) = provider();
    transport.set_response("starknet_getTransactionReceipt", serde_json::Value::Null);
    assert!(matches!(
        provider.get_transaction_receipt(Felt::ONE).await,
        Err(SdkError::NotFound)
    ));
}

#[tokio::test]
async fn test_transaction_by_block_and_index() {
    let (transport, provider) = provider();
    transport.set_error("starknet_getTransactionByBlockIdAndIndex", 27, "Invalid index");
    assert!(matches!(
        provider
            .get_transaction_by_block_id_and_index(BlockId::LATEST, 99)
            .await,
        Err(SdkError::InvalidTransactionIndex)
    ));
    let recorded = &transport.requests_for("starknet_getTransactionByBlockIdAndIndex")[0];
    assert_eq!(recorded.params, vec![json!("latest"), json!(99)]);
}

#[tokio::test]
async fn test_wait_for_transaction_polls_until_final() {
    let (transport, provider) = provider();
    transport.set_error("starknet_getTransactionReceipt", 25, "Transaction hash not found");
    transport.push_response(
        "starknet_getTransactionReceipt",
        json!({ "transaction_hash": "0x1", "status": "RECEIVED" }),
    );
    transport.push_response(
        "starknet_getTransactionReceipt",
        json!({ "transaction_hash": "0x1", "status": "PENDING" }),
    );
    transport.push_response(
        "starknet_getTransactionReceipt",
        json!({
            "type": "INVOKE",
            "transaction_hash": "0x1",
            "status": "ACCEPTED_ON_L2",
            "block_hash": "0x2",
            "block_number": 3,
        }),
    );

    let receipt = provider
        .wait_for_transaction(Felt::ONE, Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(receipt.status(), Some(TransactionStatus::AcceptedOnL2));
    assert_eq!(transport.call_count("starknet_getTransactionReceipt"), 3);
}

#[tokio::test]
async fn test_wait_for_transaction_tolerates_missing_receipt() {
    let (transport, provider) = provider();
    transport.set_error("starknet_getTransactionReceipt", 25, "Transaction hash not found");
    let result = tokio::time::timeout(
        Duration::from_millis(50),
        provider.wait_for_transaction(Felt::ONE, Duration::from_millis(5)),
    )
    .await;
    assert!(result.is_err(), "still waiting when the timeout fires");
    assert!(transport.call_count("starknet_getTransactionReceipt") >= 2);
}

#[tokio::test]
async fn test_wait_for_transaction_other_error_stops() {
    let (transport, provider) = provider();
    transport.set_error("starknet_getTransactionReceipt", -32603, "down");
    let result = provider
        .wait_for_transaction(Felt::ONE, Duration::from_millis(1))
        .await;
    assert!(matches!(result, Err(SdkError::Internal(_))));
}

// ==================== Contract Queries ====================

#[tokio::test]
async fn test_call_encodes_selector() {
    let (transport, provider) = provider();
    transport.set_response("starknet_call", json!(["0x64", "0x0"]));

    let call = FunctionCall::new(Felt::from(0x49du64), "balanceOf", vec![Felt::from(0xau64)]);
    let result = provider.call(&call, BlockId::LATEST).await.unwrap();
    assert_eq!(result, vec![Felt::from(100u64), Felt::ZERO]);

    let recorded = &transport.requests_for("starknet_call")[0];
    assert_eq!(
        recorded.params[0],
        json!({
            "contract_address": "0x49d",
            "entry_point_selector": "0x2e4263afad30923c891518314c3c95dbe830a16874e8abc5777a9a20b54c76e",
            "calldata": ["0xa"],
        })
    );
}

#[tokio::test]
async fn test_call_contract_error() {
    let (transport, provider) = provider();
    transport.set_error("starknet_call", 40, "Contract error");
    let call = FunctionCall::new(Felt::ONE, "boom", vec![]);
    assert!(matches!(
        provider.call(&call, BlockId::LATEST).await,
        Err(SdkError::ContractError(_))
    ));
}

#[tokio::test]
async fn test_get_nonce_params() {
    let (transport, provider) = provider();
    transport.set_response("starknet_getNonce", json!("0x5"));
    let nonce = provider
        .get_nonce(BlockId::PENDING, Felt::from(0xacc0u64))
        .await
        .unwrap();
    assert_eq!(nonce, Felt::from(5u64));
    let recorded = &transport.requests_for("starknet_getNonce")[0];
    assert_eq!(recorded.params, vec![json!("pending"), json!("0xacc0")]);
}

#[tokio::test]
async fn test_get_storage_at() {
    let (transport, provider) = provider();
    transport.set_response("starknet_getStorageAt", json!("0x2a"));
    let value = provider
        .get_storage_at(Felt::ONE, Felt::TWO, BlockId::LATEST)
        .await
        .unwrap();
    assert_eq!(value, Felt::from(42u64));
}

#[tokio::test]
async fn test_class_queries() {
    let (transport, provider) = provider();
    transport.set_response("starknet_getClassHashAt", json!("0xc1a5"));
    transport.set_error("starknet_getClass", 28, "Class hash not found");
    transport.set_error("starknet_getClassAt", 20, "Contract not found");

    assert_eq!(
        provider.get_class_hash_at(BlockId::LATEST, Felt::ONE).await.unwrap(),
        Felt::from(0xc1a5u64)
    );
    assert!(matches!(
        provider.get_class(BlockId::LATEST, Felt::ONE).await,
        Err(SdkError::ClassHashNotFound)
    ));
    assert!(matches!(
        provider.get_class_at(BlockId::LATEST, Felt::ONE).await,
        Err(SdkError::ContractNotFound)
    ));
}

// ==================== Events ====================

#[tokio::test]
async fn test_get_events() {
    let (transport, provider) = provider();
    transport.set_response(
        "starknet_getEvents",
        json!({
            "events": [{
                "from_address": "0x1",
                "keys": ["0x2"],
                "data": ["0x3"],
                "block_hash": "0x4",
                "block_number": 5,
                "transaction_hash": "0x6",
            }],
            "continuation_token": "10",
        }),
    );

    let filter = EventFilter {
        address: Some(Felt::ONE),
        ..Default::default()
    };
    let chunk = provider.get_events(&filter, 10, Some("5")).await.unwrap();
    assert_eq!(chunk.events.len(), 1);
    assert_eq!(chunk.continuation_token.as_deref(), Some("10"));

    let recorded = &transport.requests_for("starknet_getEvents")[0];
    assert_eq!(
        recorded.params[0],
        json!({ "address": "0x1", "chunk_size": 10, "continuation_token": "5" })
    );
}

// ==================== Submission ====================

#[tokio::test]
async fn test_add_declare_and_deploy_account() {
    let (transport, provider) = provider();
    transport.set_response(
        "starknet_addDeclareTransaction",
        json!({ "transaction_hash": "0x1", "class_hash": "0x2" }),
    );
    transport.set_response(
        "starknet_addDeployAccountTransaction",
        json!({ "transaction_hash": "0x3", "contract_address": "0x4" }),
    );

    let declared = provider
        .add_declare_transaction(json!({ "type": "DECLARE" }))
        .await
        .unwrap();
    assert_eq!(declared.class_hash, Felt::TWO);

    let deployed = provider
        .add_deploy_account_transaction(json!({ "type": "DEPLOY_ACCOUNT" }))
        .await
        .unwrap();
    assert_eq!(deployed.contract_address, Felt::from(4u64));
}
