//! Account plugin hook

use crate::types::FunctionCall;
use crate::SdkError;

/// Produces an extra call that is prepended to every batch an account sends
///
/// The returned call is part of the signed calldata, so it is applied
/// before hashing.
pub trait AccountPlugin: Send + Sync {
    /// Build the plugin call for a batch
    fn plugin_call(&self, calls: &[FunctionCall]) -> Result<FunctionCall, SdkError>;
}
