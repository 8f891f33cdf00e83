//! Transport layer for RPC communication

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::CODE_METHOD_NOT_FOUND;
use crate::SdkError;

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get JSON response
    ///
    /// Node errors come back as `SdkError::Rpc`; a `null` result is returned
    /// as `Value::Null`.
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError>;
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SdkError> {
    serde_json::from_value(value).map_err(|e| SdkError::Serialization(e.to_string()))
}

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Method name
    pub method: String,
    /// Positional parameters
    pub params: Vec<Value>,
}

/// Mock transport for testing
///
/// Clones share state, so a test can keep one handle while a `Provider`
/// owns another. Lookup order per method: queued responses, then errors,
/// then fixed responses, then defaults.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    queued: Arc<Mutex<HashMap<String, VecDeque<Value>>>>,
    errors: Arc<Mutex<HashMap<String, (i64, String)>>>,
    default_responses: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();

        // SN_GOERLI
        defaults.insert("starknet_chainId".to_string(), json!("0x534e5f474f45524c49"));
        defaults.insert("starknet_specVersion".to_string(), json!("0.3.0"));
        defaults.insert("starknet_blockNumber".to_string(), json!(256));
        defaults.insert(
            "starknet_blockHashAndNumber".to_string(),
            json!({ "block_hash": "0x1234", "block_number": 256 }),
        );
        defaults.insert("starknet_syncing".to_string(), json!(false));
        defaults.insert("starknet_getNonce".to_string(), json!("0x0"));
        defaults.insert("starknet_call".to_string(), json!(["0x0"]));
        defaults.insert(
            "starknet_estimateFee".to_string(),
            json!({ "gas_consumed": "0x1000", "gas_price": "0x10", "overall_fee": "0x10000" }),
        );
        defaults.insert(
            "starknet_addInvokeTransaction".to_string(),
            json!({ "transaction_hash": "0x5a2f0b3c9e1d4f6a7b8c9d0e1f2a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4" }),
        );

        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            queued: Arc::new(Mutex::new(HashMap::new())),
            errors: Arc::new(Mutex::new(HashMap::new())),
            default_responses: Arc::new(Mutex::new(defaults)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a fixed response for a specific method
    pub fn set_response(&self, method: &str, response: Value) {
        self.responses.lock().insert(method.to_string(), response);
    }

    /// Queue a one-shot response, consumed before any fixed response
    pub fn push_response(&self, method: &str, response: Value) {
        self.queued
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Make a method fail with a node error
    pub fn set_error(&self, method: &str, code: i64, message: &str) {
        self.errors
            .lock()
            .insert(method.to_string(), (code, message.to_string()));
    }

    /// Clear custom responses, queued responses and errors
    pub fn clear_responses(&self) {
        self.responses.lock().clear();
        self.queued.lock().clear();
        self.errors.lock().clear();
    }

    /// Every request seen so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Requests seen for one method
    pub fn requests_for(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Number of requests seen for one method
    pub fn call_count(&self, method: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.method == method).count()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        self.requests.lock().push(RecordedRequest {
            method: method.to_string(),
            params,
        });

        if let Some(response) = self
            .queued
            .lock()
            .get_mut(method)
            .and_then(|queue| queue.pop_front())
        {
            return Ok(response);
        }

        if let Some((code, message)) = self.errors.lock().get(method).cloned() {
            return Err(SdkError::Rpc { code, message });
        }

        if let Some(response) = self.responses.lock().get(method).cloned() {
            return Ok(response);
        }

        if let Some(response) = self.default_responses.lock().get(method).cloned() {
            return Ok(response);
        }

        Err(SdkError::Rpc {
            code: CODE_METHOD_NOT_FOUND,
            message: format!("Method not found: {}", method),
        })
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(SdkError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_default_responses() {
        let transport = MockTransport::new();

        let result = transport
            .request_json("starknet_chainId", vec![])
            .await
            .unwrap();
        assert_eq!(result, json!("0x534e5f474f45524c49"));

        let result = transport
            .request_json("starknet_syncing", vec![])
            .await
            .unwrap();
        assert_eq!(result, json!(false));
    }

    #[tokio::test]
    async fn test_mock_transport_custom_response() {
        let transport = MockTransport::new();
        transport.set_response("starknet_chainId", json!("0x534e5f4d41494e"));

        let result = transport
            .request_json("starknet_chainId", vec![])
            .await
            .unwrap();
        assert_eq!(result, json!("0x534e5f4d41494e"));
    }

    #[tokio::test]
    async fn test_mock_transport_queue_before_fixed() {
        let transport = MockTransport::new();
        transport.set_response("starknet_blockNumber", json!(10));
        transport.push_response("starknet_blockNumber", json!(1));

        let first = transport.request_json("starknet_blockNumber", vec![]).await.unwrap();
        let second = transport.request_json("starknet_blockNumber", vec![]).await.unwrap();
        assert_eq!(first, json!(1));
        assert_eq!(second, json!(10));
    }

    #[tokio::test]
    async fn test_mock_transport_error() {
        let transport = MockTransport::new();
        transport.set_error("starknet_getNonce", 20, "Contract not found");

        let result = transport.request_json("starknet_getNonce", vec![]).await;
        assert!(matches!(result, Err(SdkError::Rpc { code: 20, .. })));
    }

    #[tokio::test]
    async fn test_mock_transport_unknown_method() {
        let transport = MockTransport::new();
        let result = transport.request_json("unknown_method", vec![]).await;
        assert!(matches!(result, Err(SdkError::Rpc { code: -32601, .. })));
    }

    #[tokio::test]
    async fn test_mock_transport_records_requests() {
        let transport = MockTransport::new();
        let handle = transport.clone();
        transport
            .request_json("starknet_getNonce", vec![json!("latest"), json!("0x1")])
            .await
            .unwrap();

        assert_eq!(handle.call_count("starknet_getNonce"), 1);
        assert_eq!(handle.call_count("starknet_chainId"), 0);
        let recorded = handle.requests_for("starknet_getNonce");
        assert_eq!(recorded[0].params, vec![json!("latest"), json!("0x1")]);
    }
}
