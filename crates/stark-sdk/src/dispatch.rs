//! Typed RPC method dispatch

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::transport::{deserialize_response, Transport};
use crate::SdkError;

/// Call `method` with positional `params` and decode the result as `T`
///
/// A `null` result is `SdkError::NotFound`; node errors are mapped through
/// [`SdkError::from_rpc`].
pub async fn dispatch<T: DeserializeOwned>(
    transport: &dyn Transport,
    method: &str,
    params: Vec<Value>,
) -> Result<T, SdkError> {
    debug!(method, "rpc request");
    trace!(method, params = %serde_json::Value::Array(params.clone()), "rpc params");

    let value = transport
        .request_json(method, params)
        .await
        .map_err(|e| {
            debug!(method, error = %e, "rpc request failed");
            e.classify()
        })?;

    trace!(method, result = %value, "rpc result");
    if value.is_null() {
        return Err(SdkError::NotFound);
    }
    deserialize_response(value)
}
