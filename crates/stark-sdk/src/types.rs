//! SDK types

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use stark_crypto::get_selector_from_name;
use stark_primitives::Felt;

use crate::transaction::Transaction;
use crate::SdkError;

// ==================== Block identifiers ====================

/// Named block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// Latest accepted block
    Latest,
    /// Block currently being built
    Pending,
}

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    /// Tagged block
    Tag(BlockTag),
    /// Block by hash
    Hash(Felt),
    /// Block by number
    Number(u64),
}

impl BlockId {
    /// Latest block
    pub const LATEST: BlockId = BlockId::Tag(BlockTag::Latest);
    /// Pending block
    pub const PENDING: BlockId = BlockId::Tag(BlockTag::Pending);
}

impl Default for BlockId {
    fn default() -> Self {
        BlockId::LATEST
    }
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            BlockId::Tag(BlockTag::Latest) => serializer.serialize_str("latest"),
            BlockId::Tag(BlockTag::Pending) => serializer.serialize_str("pending"),
            BlockId::Hash(hash) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("block_hash", hash)?;
                map.end()
            }
            BlockId::Number(n) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("block_number", n)?;
                map.end()
            }
        }
    }
}

impl FromStr for BlockId {
    type Err = SdkError;

    /// `latest`, `pending`, a `0x` block hash or a decimal block number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(BlockId::LATEST),
            "pending" => Ok(BlockId::PENDING),
            _ if s.starts_with("0x") => Ok(BlockId::Hash(Felt::from_hex(s)?)),
            _ => s
                .parse::<u64>()
                .map(BlockId::Number)
                .map_err(|_| SdkError::InvalidParams(format!("invalid block id: {}", s))),
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Tag(BlockTag::Latest) => write!(f, "latest"),
            BlockId::Tag(BlockTag::Pending) => write!(f, "pending"),
            BlockId::Hash(hash) => write!(f, "{}", hash),
            BlockId::Number(n) => write!(f, "{}", n),
        }
    }
}

// ==================== Calls ====================

/// Entry point of a call, by name or already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    /// Function name, hashed with `starknet_keccak` on use
    Name(String),
    /// Selector
    Selector(Felt),
}

impl EntryPoint {
    /// Resolve to a selector
    pub fn selector(&self) -> Result<Felt, SdkError> {
        match self {
            EntryPoint::Name(name) => Ok(get_selector_from_name(name)?),
            EntryPoint::Selector(selector) => Ok(*selector),
        }
    }
}

impl From<&str> for EntryPoint {
    fn from(name: &str) -> Self {
        EntryPoint::Name(name.to_string())
    }
}

impl From<String> for EntryPoint {
    fn from(name: String) -> Self {
        EntryPoint::Name(name)
    }
}

impl From<Felt> for EntryPoint {
    fn from(selector: Felt) -> Self {
        EntryPoint::Selector(selector)
    }
}

/// One contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Target contract
    pub contract_address: Felt,
    /// Entry point
    pub entry_point: EntryPoint,
    /// Arguments
    pub calldata: Vec<Felt>,
}

impl FunctionCall {
    /// Create a call
    pub fn new(
        contract_address: Felt,
        entry_point: impl Into<EntryPoint>,
        calldata: Vec<Felt>,
    ) -> Self {
        FunctionCall {
            contract_address,
            entry_point: entry_point.into(),
            calldata,
        }
    }

    /// Selector of the entry point
    pub fn selector(&self) -> Result<Felt, SdkError> {
        self.entry_point.selector()
    }

    /// Wire form for `starknet_call`
    pub fn to_request(&self) -> Result<CallRequest, SdkError> {
        Ok(CallRequest {
            contract_address: self.contract_address,
            entry_point_selector: self.selector()?,
            calldata: self.calldata.clone(),
        })
    }
}

/// `FUNCTION_CALL` object as sent to the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Target contract
    pub contract_address: Felt,
    /// Entry point selector
    pub entry_point_selector: Felt,
    /// Arguments
    pub calldata: Vec<Felt>,
}

/// Optional execution parameters; absent values are queried from the node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteDetails {
    /// Account nonce
    pub nonce: Option<Felt>,
    /// Maximum fee
    pub max_fee: Option<Felt>,
}

impl ExecuteDetails {
    /// Set the nonce
    pub fn with_nonce(mut self, nonce: Felt) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the max fee
    pub fn with_max_fee(mut self, max_fee: Felt) -> Self {
        self.max_fee = Some(max_fee);
        self
    }
}

/// Signed invoke transaction as submitted to the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Always `INVOKE`
    #[serde(rename = "type")]
    pub tx_type: String,
    /// Account contract
    pub contract_address: Felt,
    /// `__execute__`
    pub entry_point_selector: Felt,
    /// Formatted multicall calldata
    pub calldata: Vec<String>,
    /// `[r, s]`
    pub signature: Vec<String>,
    /// Maximum fee
    pub max_fee: Felt,
    /// Transaction version
    pub version: Felt,
    /// Nonce, carried only outside the calldata (v1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Felt>,
}

// ==================== Results ====================

/// Fee estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    /// Gas consumed
    pub gas_consumed: Felt,
    /// Gas price
    pub gas_price: Felt,
    /// Overall fee
    pub overall_fee: Felt,
}

/// Sync progress of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    /// Block the sync started from
    pub starting_block_hash: Felt,
    /// Number of the starting block
    pub starting_block_num: Felt,
    /// Block currently synced
    pub current_block_hash: Felt,
    /// Number of the current block
    pub current_block_num: Felt,
    /// Highest known block
    pub highest_block_hash: Felt,
    /// Number of the highest block
    pub highest_block_num: Felt,
}

/// Result of `starknet_syncing`: `false` or a progress object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Node is up to date
    NotSyncing,
    /// Node is catching up
    Syncing(SyncProgress),
}

impl SyncStatus {
    /// Whether the node is syncing
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncStatus::Syncing(_))
    }
}

impl<'de> Deserialize<'de> for SyncStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Progress(SyncProgress),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(SyncStatus::NotSyncing),
            Raw::Flag(true) => Err(de::Error::custom("syncing flag must be false")),
            Raw::Progress(progress) => Ok(SyncStatus::Syncing(progress)),
        }
    }
}

impl Serialize for SyncStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SyncStatus::NotSyncing => serializer.serialize_bool(false),
            SyncStatus::Syncing(progress) => progress.serialize(serializer),
        }
    }
}

/// Latest block hash and number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHashAndNumber {
    /// Block hash
    pub block_hash: Felt,
    /// Block number
    pub block_number: u64,
}

// ==================== Blocks ====================

/// Block status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockStatus {
    /// Not yet accepted
    #[serde(rename = "PENDING")]
    Pending,
    /// Accepted on L2
    #[serde(rename = "ACCEPTED_ON_L2")]
    AcceptedOnL2,
    /// Accepted on L1
    #[serde(rename = "ACCEPTED_ON_L1")]
    AcceptedOnL1,
    /// Rejected
    #[serde(rename = "REJECTED")]
    Rejected,
}

/// Block header; hash, number and root are absent on pending blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BlockStatus>,
    /// Block hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Felt>,
    /// Parent block hash
    pub parent_hash: Felt,
    /// Block number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// State root after the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_root: Option<Felt>,
    /// Unix timestamp
    pub timestamp: u64,
    /// Sequencer address
    pub sequencer_address: Felt,
}

/// Block with transaction hashes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWithTxHashes {
    /// Header
    #[serde(flatten)]
    pub header: BlockHeader,
    /// Transaction hashes
    pub transactions: Vec<Felt>,
}

/// Block with full transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockWithTxs {
    /// Header
    #[serde(flatten)]
    pub header: BlockHeader,
    /// Transactions
    pub transactions: Vec<Transaction>,
}

// ==================== State ====================

/// Storage slot update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    /// Storage key
    pub key: Felt,
    /// New value
    pub value: Felt,
}

/// Storage updates of one contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStorageDiff {
    /// Contract address
    pub address: Felt,
    /// Updated slots
    pub storage_entries: Vec<StorageEntry>,
}

/// Newly deployed contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    /// Contract address
    pub address: Felt,
    /// Class hash
    pub class_hash: Felt,
}

/// Nonce update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractNonce {
    /// Contract address
    pub contract_address: Felt,
    /// New nonce
    pub nonce: Felt,
}

/// State changes of a block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDiff {
    /// Storage updates
    #[serde(default)]
    pub storage_diffs: Vec<ContractStorageDiff>,
    /// Declared class hashes
    #[serde(default)]
    pub declared_contract_hashes: Vec<Felt>,
    /// Deployed contracts
    #[serde(default)]
    pub deployed_contracts: Vec<DeployedContract>,
    /// Nonce updates
    #[serde(default)]
    pub nonces: Vec<ContractNonce>,
}

/// Result of `starknet_getStateUpdate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Block hash, absent on pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Felt>,
    /// New state root, absent on pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_root: Option<Felt>,
    /// Previous state root
    pub old_root: Felt,
    /// Changes
    pub state_diff: StateDiff,
}

// ==================== Events ====================

/// Filter for `starknet_getEvents`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventFilter {
    /// First block (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockId>,
    /// Last block (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockId>,
    /// Emitting contract
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Felt>,
    /// Keys per position; an empty position matches anything
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Vec<Felt>>,
}

/// Event as returned by `starknet_getEvents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Emitting contract
    pub from_address: Felt,
    /// Keys
    pub keys: Vec<Felt>,
    /// Data
    pub data: Vec<Felt>,
    /// Block hash, absent on pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Felt>,
    /// Block number, absent on pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Emitting transaction
    pub transaction_hash: Felt,
}

/// One page of events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsChunk {
    /// Events
    pub events: Vec<EmittedEvent>,
    /// Token for the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

// ==================== Submission results ====================

/// Result of `starknet_addInvokeTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInvokeTransactionOutput {
    /// Hash of the submitted transaction
    pub transaction_hash: Felt,
}

/// Result of `starknet_addDeclareTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDeclareTransactionOutput {
    /// Hash of the submitted transaction
    pub transaction_hash: Felt,
    /// Declared class
    pub class_hash: Felt,
}

/// Result of `starknet_addDeployAccountTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDeployAccountTransactionOutput {
    /// Hash of the submitted transaction
    pub transaction_hash: Felt,
    /// Address of the new account
    pub contract_address: Felt,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== BlockId ====================

    #[test]
    fn test_block_id_serialization() {
        assert_eq!(serde_json::to_value(BlockId::LATEST).unwrap(), json!("latest"));
        assert_eq!(serde_json::to_value(BlockId::PENDING).unwrap(), json!("pending"));
        assert_eq!(
            serde_json::to_value(BlockId::Number(42)).unwrap(),
            json!({ "block_number": 42 })
        );
        assert_eq!(
            serde_json::to_value(BlockId::Hash(Felt::from(0xabcu64))).unwrap(),
            json!({ "block_hash": "0xabc" })
        );
    }

    #[test]
    fn test_block_id_from_str() {
        assert_eq!("latest".parse::<BlockId>().unwrap(), BlockId::LATEST);
        assert_eq!("pending".parse::<BlockId>().unwrap(), BlockId::PENDING);
        assert_eq!("12".parse::<BlockId>().unwrap(), BlockId::Number(12));
        assert_eq!(
            "0x12".parse::<BlockId>().unwrap(),
            BlockId::Hash(Felt::from(0x12u64))
        );
        assert!("earliest".parse::<BlockId>().is_err());
    }

    // ==================== Calls ====================

    #[test]
    fn test_entry_point_selector() {
        let by_name = EntryPoint::from("transfer");
        let by_selector = EntryPoint::Selector(by_name.selector().unwrap());
        assert_eq!(by_name.selector().unwrap(), by_selector.selector().unwrap());
        assert!(EntryPoint::from("naïve").selector().is_err());
    }

    #[test]
    fn test_call_request_wire_form() {
        let call = FunctionCall::new(Felt::from(1u64), Felt::from(2u64), vec![Felt::from(3u64)]);
        assert_eq!(
            serde_json::to_value(call.to_request().unwrap()).unwrap(),
            json!({
                "contract_address": "0x1",
                "entry_point_selector": "0x2",
                "calldata": ["0x3"],
            })
        );
    }

    #[test]
    fn test_invoke_request_omits_missing_nonce() {
        let request = InvokeRequest {
            tx_type: "INVOKE".into(),
            contract_address: Felt::ONE,
            entry_point_selector: Felt::TWO,
            calldata: vec!["0x0".into()],
            signature: vec!["0x1".into(), "0x2".into()],
            max_fee: Felt::from(100u64),
            version: Felt::ZERO,
            nonce: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], json!("INVOKE"));
        assert_eq!(value["max_fee"], json!("0x64"));
        assert!(value.get("nonce").is_none());
    }

    #[test]
    fn test_execute_details_builder() {
        let details = ExecuteDetails::default()
            .with_nonce(Felt::ONE)
            .with_max_fee(Felt::TWO);
        assert_eq!(details.nonce, Some(Felt::ONE));
        assert_eq!(details.max_fee, Some(Felt::TWO));
    }

    // ==================== Results ====================

    #[test]
    fn test_sync_status_false() {
        let status: SyncStatus = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(status, SyncStatus::NotSyncing);
        assert!(!status.is_syncing());
        assert_eq!(serde_json::to_value(&status).unwrap(), json!(false));
    }

    #[test]
    fn test_sync_status_progress() {
        let status: SyncStatus = serde_json::from_value(json!({
            "starting_block_hash": "0x1",
            "starting_block_num": "0x10",
            "current_block_hash": "0x2",
            "current_block_num": "0x20",
            "highest_block_hash": "0x3",
            "highest_block_num": "0x30",
        }))
        .unwrap();
        match status {
            SyncStatus::Syncing(progress) => {
                assert_eq!(progress.current_block_num, Felt::from(0x20u64))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sync_status_true_rejected() {
        assert!(serde_json::from_value::<SyncStatus>(json!(true)).is_err());
    }

    #[test]
    fn test_pending_block_header() {
        let block: BlockWithTxHashes = serde_json::from_value(json!({
            "parent_hash": "0x1",
            "timestamp": 1_700_000_000u64,
            "sequencer_address": "0x2",
            "transactions": ["0xa", "0xb"],
        }))
        .unwrap();
        assert!(block.header.block_number.is_none());
        assert_eq!(block.transactions.len(), 2);
    }

    #[test]
    fn test_event_filter_serialization() {
        let filter = EventFilter {
            from_block: Some(BlockId::Number(1)),
            to_block: Some(BlockId::LATEST),
            address: Some(Felt::from(5u64)),
            keys: vec![],
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "from_block": { "block_number": 1 },
                "to_block": "latest",
                "address": "0x5",
            })
        );
    }
}
