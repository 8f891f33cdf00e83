//! Transactions and receipts as returned by the node
//!
//! Both are closed enums dispatched on the `type` field (and `version` for
//! transactions). The variant payloads are plain data contracts with no
//! validation beyond decoding.

use serde::de::{self, Deserializer};
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stark_primitives::Felt;

// ==================== Transactions ====================

/// Invoke v0: calls `entry_point_selector` on `contract_address`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeTransactionV0 {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Maximum fee
    pub max_fee: Felt,
    /// Signature
    #[serde(default)]
    pub signature: Vec<Felt>,
    /// Target contract
    pub contract_address: Felt,
    /// Entry point selector
    pub entry_point_selector: Felt,
    /// Calldata
    pub calldata: Vec<Felt>,
}

/// Invoke v1: `__execute__` on the sender account, nonce outside calldata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeTransactionV1 {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Maximum fee
    pub max_fee: Felt,
    /// Signature
    #[serde(default)]
    pub signature: Vec<Felt>,
    /// Nonce
    pub nonce: Felt,
    /// Sender account
    pub sender_address: Felt,
    /// Calldata
    pub calldata: Vec<Felt>,
}

/// Invoke v3: fees paid through resource bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeTransactionV3 {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Signature
    #[serde(default)]
    pub signature: Vec<Felt>,
    /// Nonce
    pub nonce: Felt,
    /// Sender account
    pub sender_address: Felt,
    /// Calldata
    pub calldata: Vec<Felt>,
    /// Resource bounds, kept undecoded
    #[serde(default)]
    pub resource_bounds: Value,
    /// Tip
    #[serde(default)]
    pub tip: Felt,
    /// Paymaster data
    #[serde(default)]
    pub paymaster_data: Vec<Felt>,
    /// Account deployment data
    #[serde(default)]
    pub account_deployment_data: Vec<Felt>,
}

/// Declare v1 (Cairo 0 class)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareTransactionV1 {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Maximum fee
    pub max_fee: Felt,
    /// Signature
    #[serde(default)]
    pub signature: Vec<Felt>,
    /// Nonce
    pub nonce: Felt,
    /// Declared class
    pub class_hash: Felt,
    /// Sender account
    pub sender_address: Felt,
}

/// Declare v2 (Sierra class)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareTransactionV2 {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Maximum fee
    pub max_fee: Felt,
    /// Signature
    #[serde(default)]
    pub signature: Vec<Felt>,
    /// Nonce
    pub nonce: Felt,
    /// Declared class
    pub class_hash: Felt,
    /// Hash of the compiled class
    pub compiled_class_hash: Felt,
    /// Sender account
    pub sender_address: Felt,
}

/// Declare v3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareTransactionV3 {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Signature
    #[serde(default)]
    pub signature: Vec<Felt>,
    /// Nonce
    pub nonce: Felt,
    /// Declared class
    pub class_hash: Felt,
    /// Hash of the compiled class
    pub compiled_class_hash: Felt,
    /// Sender account
    pub sender_address: Felt,
    /// Resource bounds, kept undecoded
    #[serde(default)]
    pub resource_bounds: Value,
}

/// Legacy deploy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployTransaction {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Deployed class
    pub class_hash: Felt,
    /// Address salt
    pub contract_address_salt: Felt,
    /// Constructor arguments
    pub constructor_calldata: Vec<Felt>,
}

/// Account deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployAccountTransaction {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Maximum fee, absent for v3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee: Option<Felt>,
    /// Signature
    #[serde(default)]
    pub signature: Vec<Felt>,
    /// Nonce
    pub nonce: Felt,
    /// Account class
    pub class_hash: Felt,
    /// Address salt
    pub contract_address_salt: Felt,
    /// Constructor arguments
    pub constructor_calldata: Vec<Felt>,
}

/// Message from L1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L1HandlerTransaction {
    /// Hash
    #[serde(default)]
    pub transaction_hash: Felt,
    /// Nonce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Felt>,
    /// Target contract
    pub contract_address: Felt,
    /// Handler selector
    pub entry_point_selector: Felt,
    /// Calldata, sender first
    pub calldata: Vec<Felt>,
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Invoke
    #[serde(rename = "INVOKE")]
    Invoke,
    /// Declare
    #[serde(rename = "DECLARE")]
    Declare,
    /// Legacy deploy
    #[serde(rename = "DEPLOY")]
    Deploy,
    /// Account deployment
    #[serde(rename = "DEPLOY_ACCOUNT")]
    DeployAccount,
    /// L1 handler
    #[serde(rename = "L1_HANDLER")]
    L1Handler,
}

impl TransactionType {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Invoke => "INVOKE",
            TransactionType::Declare => "DECLARE",
            TransactionType::Deploy => "DEPLOY",
            TransactionType::DeployAccount => "DEPLOY_ACCOUNT",
            TransactionType::L1Handler => "L1_HANDLER",
        }
    }
}

/// Transaction as returned by the node
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    /// Invoke v0
    InvokeV0(InvokeTransactionV0),
    /// Invoke v1
    InvokeV1(InvokeTransactionV1),
    /// Invoke v3
    InvokeV3(InvokeTransactionV3),
    /// Declare v1
    DeclareV1(DeclareTransactionV1),
    /// Declare v2
    DeclareV2(DeclareTransactionV2),
    /// Declare v3
    DeclareV3(DeclareTransactionV3),
    /// Deploy
    Deploy(DeployTransaction),
    /// Deploy account
    DeployAccount(DeployAccountTransaction),
    /// L1 handler
    L1Handler(L1HandlerTransaction),
}

impl Transaction {
    /// Kind of the transaction
    pub fn tx_type(&self) -> TransactionType {
        match self {
            Transaction::InvokeV0(_) | Transaction::InvokeV1(_) | Transaction::InvokeV3(_) => {
                TransactionType::Invoke
            }
            Transaction::DeclareV1(_) | Transaction::DeclareV2(_) | Transaction::DeclareV3(_) => {
                TransactionType::Declare
            }
            Transaction::Deploy(_) => TransactionType::Deploy,
            Transaction::DeployAccount(_) => TransactionType::DeployAccount,
            Transaction::L1Handler(_) => TransactionType::L1Handler,
        }
    }

    /// Transaction version
    pub fn version(&self) -> u64 {
        match self {
            Transaction::InvokeV0(_)
            | Transaction::Deploy(_)
            | Transaction::DeployAccount(_)
            | Transaction::L1Handler(_) => 0,
            Transaction::InvokeV1(_) | Transaction::DeclareV1(_) => 1,
            Transaction::DeclareV2(_) => 2,
            Transaction::InvokeV3(_) | Transaction::DeclareV3(_) => 3,
        }
    }

    /// Transaction hash
    pub fn transaction_hash(&self) -> Felt {
        match self {
            Transaction::InvokeV0(tx) => tx.transaction_hash,
            Transaction::InvokeV1(tx) => tx.transaction_hash,
            Transaction::InvokeV3(tx) => tx.transaction_hash,
            Transaction::DeclareV1(tx) => tx.transaction_hash,
            Transaction::DeclareV2(tx) => tx.transaction_hash,
            Transaction::DeclareV3(tx) => tx.transaction_hash,
            Transaction::Deploy(tx) => tx.transaction_hash,
            Transaction::DeployAccount(tx) => tx.transaction_hash,
            Transaction::L1Handler(tx) => tx.transaction_hash,
        }
    }
}

/// Read `version` as a number; accepts `"0x1"`, `"1"` and `1`.
/// Query versions (`0x100000000000000000000000000000001`) keep their low bits.
fn parse_version(value: Option<&Value>) -> Result<u64, String> {
    let felt = match value {
        None => return Ok(0),
        Some(Value::Number(n)) => n.as_u64().map(Felt::from),
        Some(Value::String(s)) => s.parse::<Felt>().ok(),
        Some(_) => None,
    }
    .ok_or_else(|| format!("invalid transaction version: {:?}", value))?;

    let bytes = felt.to_bytes_be();
    let mut low = [0u8; 8];
    low.copy_from_slice(&bytes[24..]);
    Ok(u64::from_be_bytes(low))
}

fn from_object<T: serde::de::DeserializeOwned, E: de::Error>(object: Map<String, Value>) -> Result<T, E> {
    serde_json::from_value(Value::Object(object)).map_err(E::custom)
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let tx_type: TransactionType = match object.get("type") {
            Some(value) => serde_json::from_value(value.clone()).map_err(de::Error::custom)?,
            None => return Err(de::Error::missing_field("type")),
        };
        let version = parse_version(object.get("version")).map_err(de::Error::custom)?;

        match (tx_type, version) {
            (TransactionType::Invoke, 0) => from_object(object).map(Transaction::InvokeV0),
            (TransactionType::Invoke, 1) => from_object(object).map(Transaction::InvokeV1),
            (TransactionType::Invoke, 3) => from_object(object).map(Transaction::InvokeV3),
            (TransactionType::Declare, 0 | 1) => from_object(object).map(Transaction::DeclareV1),
            (TransactionType::Declare, 2) => from_object(object).map(Transaction::DeclareV2),
            (TransactionType::Declare, 3) => from_object(object).map(Transaction::DeclareV3),
            (TransactionType::Deploy, _) => from_object(object).map(Transaction::Deploy),
            (TransactionType::DeployAccount, _) => {
                from_object(object).map(Transaction::DeployAccount)
            }
            (TransactionType::L1Handler, _) => from_object(object).map(Transaction::L1Handler),
            (tx_type, version) => Err(de::Error::custom(format!(
                "unsupported {} transaction version {}",
                tx_type.as_str(),
                version
            ))),
        }
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            Transaction::InvokeV0(tx) => serde_json::to_value(tx),
            Transaction::InvokeV1(tx) => serde_json::to_value(tx),
            Transaction::InvokeV3(tx) => serde_json::to_value(tx),
            Transaction::DeclareV1(tx) => serde_json::to_value(tx),
            Transaction::DeclareV2(tx) => serde_json::to_value(tx),
            Transaction::DeclareV3(tx) => serde_json::to_value(tx),
            Transaction::Deploy(tx) => serde_json::to_value(tx),
            Transaction::DeployAccount(tx) => serde_json::to_value(tx),
            Transaction::L1Handler(tx) => serde_json::to_value(tx),
        }
        .map_err(S::Error::custom)?;

        let mut object = match body {
            Value::Object(object) => object,
            _ => return Err(S::Error::custom("transaction body is not an object")),
        };
        object.insert("type".into(), Value::String(self.tx_type().as_str().into()));
        object.insert("version".into(), Value::String(format!("{:#x}", self.version())));
        object.serialize(serializer)
    }
}

// ==================== Receipts ====================

/// Transaction status (pre-0.4 nodes report it in `status`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Received by the sequencer
    #[serde(rename = "RECEIVED")]
    Received,
    /// In the pending block
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
    /// Executed but reverted
    #[serde(rename = "REVERTED")]
    Reverted,
}

impl TransactionStatus {
    /// Whether the status can no longer change in a way that matters to a sender
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TransactionStatus::AcceptedOnL2
                | TransactionStatus::AcceptedOnL1
                | TransactionStatus::Rejected
                | TransactionStatus::Reverted
        )
    }
}

/// Message sent to L1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgToL1 {
    /// L1 recipient
    pub to_address: Felt,
    /// Payload
    pub payload: Vec<Felt>,
}

/// Event emitted by a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Emitting contract
    pub from_address: Felt,
    /// Keys
    pub keys: Vec<Felt>,
    /// Data
    pub data: Vec<Felt>,
}

/// Fields shared by every receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonReceipt {
    /// Transaction hash
    pub transaction_hash: Felt,
    /// Fee charged; a felt on older nodes, `{amount, unit}` on newer ones
    #[serde(default)]
    pub actual_fee: Value,
    /// Legacy status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    /// Finality status on newer nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finality_status: Option<TransactionStatus>,
    /// `SUCCEEDED` or `REVERTED` on newer nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_status: Option<String>,
    /// Block hash, absent while pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Felt>,
    /// Block number, absent while pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Messages to L1
    #[serde(default)]
    pub messages_sent: Vec<MsgToL1>,
    /// Events
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Receipt of a deploy or deploy-account transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployReceipt {
    /// Common fields
    #[serde(flatten)]
    pub common: CommonReceipt,
    /// Address of the deployed contract
    pub contract_address: Felt,
}

/// Transaction receipt
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionReceipt {
    /// Invoke
    Invoke(CommonReceipt),
    /// Declare
    Declare(CommonReceipt),
    /// Deploy
    Deploy(DeployReceipt),
    /// Deploy account
    DeployAccount(DeployReceipt),
    /// L1 handler
    L1Handler(CommonReceipt),
}

impl TransactionReceipt {
    /// Kind of the receipted transaction
    pub fn tx_type(&self) -> TransactionType {
        match self {
            TransactionReceipt::Invoke(_) => TransactionType::Invoke,
            TransactionReceipt::Declare(_) => TransactionType::Declare,
            TransactionReceipt::Deploy(_) => TransactionType::Deploy,
            TransactionReceipt::DeployAccount(_) => TransactionType::DeployAccount,
            TransactionReceipt::L1Handler(_) => TransactionType::L1Handler,
        }
    }

    /// Common fields
    pub fn common(&self) -> &CommonReceipt {
        match self {
            TransactionReceipt::Invoke(r)
            | TransactionReceipt::Declare(r)
            | TransactionReceipt::L1Handler(r) => r,
            TransactionReceipt::Deploy(r) | TransactionReceipt::DeployAccount(r) => &r.common,
        }
    }

    /// Transaction hash
    pub fn transaction_hash(&self) -> Felt {
        self.common().transaction_hash
    }

    /// Finality status, falling back to the legacy field
    pub fn status(&self) -> Option<TransactionStatus> {
        let common = self.common();
        if common.execution_status.as_deref() == Some("REVERTED") {
            return Some(TransactionStatus::Reverted);
        }
        common.finality_status.or(common.status)
    }

    /// Whether waiting on this transaction can stop
    pub fn is_final(&self) -> bool {
        self.status().map(|s| s.is_final()).unwrap_or(false)
    }
}

impl<'de> Deserialize<'de> for TransactionReceipt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        // pending receipts from older nodes carry no type
        let tx_type = match object.get("type") {
            Some(value) => serde_json::from_value(value.clone()).map_err(de::Error::custom)?,
            None => TransactionType::Invoke,
        };

        match tx_type {
            TransactionType::Invoke => from_object(object).map(TransactionReceipt::Invoke),
            TransactionType::Declare => from_object(object).map(TransactionReceipt::Declare),
            TransactionType::Deploy => from_object(object).map(TransactionReceipt::Deploy),
            TransactionType::DeployAccount => {
                from_object(object).map(TransactionReceipt::DeployAccount)
            }
            TransactionType::L1Handler => from_object(object).map(TransactionReceipt::L1Handler),
        }
    }
}

impl Serialize for TransactionReceipt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            TransactionReceipt::Invoke(r)
            | TransactionReceipt::Declare(r)
            | TransactionReceipt::L1Handler(r) => serde_json::to_value(r),
            TransactionReceipt::Deploy(r) | TransactionReceipt::DeployAccount(r) => {
                serde_json::to_value(r)
            }
        }
        .map_err(S::Error::custom)?;

        let mut object = match body {
            Value::Object(object) => object,
            _ => return Err(S::Error::custom("receipt body is not an object")),
        };
        object.insert("type".into(), Value::String(self.tx_type().as_str().into()));
        object.serialize(serializer)
    }
}
