//! Account - signs and submits invoke transactions
//!
//! The pipeline for every submission is fixed: resolve nonce, resolve max
//! fee, prepend the plugin call, format calldata, hash, sign, send. Each
//! step runs once; nothing is retried.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stark_crypto::{compute_hash_on_elements, get_selector_from_name, Signature, SigningKey};
use stark_primitives::Felt;
use tracing::{debug, info};

use crate::calldata::{format_calldata, format_v0_calldata, to_hex_strings};
use crate::plugin::AccountPlugin;
use crate::provider::Provider;
use crate::types::{
    AddInvokeTransactionOutput, BlockId, ExecuteDetails, FeeEstimate, FunctionCall, InvokeRequest,
};
use crate::SdkError;

/// Prefix of the invoke transaction hash, as a short string
pub const TRANSACTION_PREFIX: &str = "invoke";

/// Account entry point that runs a multicall
pub const EXECUTE_ENTRYPOINT: &str = "__execute__";

/// View function of v0 accounts returning the nonce
pub const GET_NONCE_ENTRYPOINT: &str = "get_nonce";

/// Max fee signed into fee estimation requests when none is given
pub const DEFAULT_ESTIMATE_MAX_FEE: u64 = 0x2_0000_0000;

/// Factor applied to the estimated fee when `execute` picks the max fee
pub const MAX_FEE_MULTIPLIER: u64 = 2;

/// Account contract generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountVersion {
    /// Nonce inside the calldata, read through `get_nonce`
    #[default]
    V0,
    /// Nonce in the transaction, read through `starknet_getNonce`
    V1,
}

impl AccountVersion {
    /// Version field of the transaction
    pub fn as_felt(&self) -> Felt {
        match self {
            AccountVersion::V0 => Felt::ZERO,
            AccountVersion::V1 => Felt::ONE,
        }
    }
}

impl fmt::Display for AccountVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountVersion::V0 => write!(f, "v0"),
            AccountVersion::V1 => write!(f, "v1"),
        }
    }
}

impl FromStr for AccountVersion {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "0" | "v0" => Ok(AccountVersion::V0),
            "1" | "v1" => Ok(AccountVersion::V1),
            _ => Err(SdkError::UnsupportedAccountVersion(s.to_string())),
        }
    }
}

/// Starknet account
///
/// Owns its signing key; the provider is shared.
pub struct Account {
    provider: Arc<Provider>,
    address: Felt,
    signing_key: SigningKey,
    version: AccountVersion,
    plugin: Option<Box<dyn AccountPlugin>>,
}

impl Account {
    /// Create a v0 account without plugin
    pub fn new(provider: Arc<Provider>, address: Felt, signing_key: SigningKey) -> Self {
        Account {
            provider,
            address,
            signing_key,
            version: AccountVersion::V0,
            plugin: None,
        }
    }

    /// Start building an account with options
    pub fn builder(provider: Arc<Provider>, address: Felt, signing_key: SigningKey) -> AccountBuilder {
        AccountBuilder {
            provider,
            address,
            signing_key,
            version: AccountVersion::V0,
            plugins: Vec::new(),
        }
    }

    /// Account address
    pub fn address(&self) -> Felt {
        self.address
    }

    /// Account version
    pub fn version(&self) -> AccountVersion {
        self.version
    }

    /// Public key of the signing key
    pub fn public_key(&self) -> Felt {
        self.signing_key.public_key()
    }

    /// Shared provider
    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    /// Read-only call at the latest block
    pub async fn call(&self, call: &FunctionCall) -> Result<Vec<Felt>, SdkError> {
        self.provider.call(call, BlockId::LATEST).await
    }

    /// Sign a message hash
    pub fn sign(&self, hash: &Felt) -> Result<Signature, SdkError> {
        Ok(self.signing_key.sign(hash)?)
    }

    /// Current nonce of the account
    pub async fn nonce(&self) -> Result<Felt, SdkError> {
        match self.version {
            AccountVersion::V0 => {
                let call = FunctionCall::new(self.address, GET_NONCE_ENTRYPOINT, vec![]);
                let result = self.provider.call_raw(&call, BlockId::LATEST).await?;
                let first = result
                    .first()
                    .ok_or_else(|| SdkError::Nonce("nonce error".to_string()))?;
                first
                    .parse::<Felt>()
                    .map_err(|_| SdkError::Nonce("nonce error".to_string()))
            }
            AccountVersion::V1 => self.provider.get_nonce(BlockId::LATEST, self.address).await,
        }
    }

    /// Hash of an invoke carrying `calls` as given (no plugin call added)
    pub async fn transaction_hash(
        &self,
        calls: &[FunctionCall],
        nonce: Felt,
        max_fee: Felt,
    ) -> Result<Felt, SdkError> {
        let chain_id = self.provider.chain_id().await?;
        let prefix = Felt::from_short_string(TRANSACTION_PREFIX)?;

        let hash = match self.version {
            AccountVersion::V0 => {
                let calldata_hash = compute_hash_on_elements(&format_v0_calldata(nonce, calls)?);
                compute_hash_on_elements(&[
                    prefix,
                    self.version.as_felt(),
                    self.address,
                    get_selector_from_name(EXECUTE_ENTRYPOINT)?,
                    calldata_hash,
                    max_fee,
                    chain_id,
                ])
            }
            AccountVersion::V1 => {
                let calldata_hash = compute_hash_on_elements(&format_calldata(calls)?);
                compute_hash_on_elements(&[
                    prefix,
                    self.version.as_felt(),
                    self.address,
                    Felt::ZERO,
                    calldata_hash,
                    max_fee,
                    chain_id,
                    nonce,
                ])
            }
        };
        Ok(hash)
    }

    /// Estimate the fee of sending `calls`
    ///
    /// A missing nonce is queried once; a missing max fee defaults to
    /// [`DEFAULT_ESTIMATE_MAX_FEE`].
    pub async fn estimate_fee(
        &self,
        calls: &[FunctionCall],
        details: ExecuteDetails,
    ) -> Result<FeeEstimate, SdkError> {
        let nonce = match details.nonce {
            Some(nonce) => nonce,
            None => self.nonce().await?,
        };
        let calls = self.with_plugin_call(calls)?;
        self.estimate_prepared(&calls, nonce, details.max_fee).await
    }

    /// Sign and submit `calls`
    ///
    /// Only v0 accounts can execute. Without a max fee the fee is estimated
    /// once and multiplied by [`MAX_FEE_MULTIPLIER`].
    pub async fn execute(
        &self,
        calls: &[FunctionCall],
        details: ExecuteDetails,
    ) -> Result<AddInvokeTransactionOutput, SdkError> {
        if self.version != AccountVersion::V0 {
            return Err(SdkError::UnsupportedAccountVersion(
                "only invoke v0 is implemented".to_string(),
            ));
        }

        let nonce = match details.nonce {
            Some(nonce) => nonce,
            None => self.nonce().await?,
        };
        let calls = self.with_plugin_call(calls)?;
        let max_fee = match details.max_fee {
            Some(max_fee) => max_fee,
            None => {
                let estimate = self.estimate_prepared(&calls, nonce, None).await?;
                scale_fee(estimate.overall_fee, MAX_FEE_MULTIPLIER)?
            }
        };

        let request = self.signed_request(&calls, nonce, max_fee).await?;
        info!(
            account = %self.address,
            nonce = %nonce,
            max_fee = %max_fee,
            calls = calls.len(),
            "submitting invoke"
        );
        self.provider.add_invoke_transaction(&request).await
    }

    /// `calls` with the plugin call in front, if a plugin is set
    fn with_plugin_call(&self, calls: &[FunctionCall]) -> Result<Vec<FunctionCall>, SdkError> {
        let mut all = Vec::with_capacity(calls.len() + 1);
        if let Some(plugin) = &self.plugin {
            all.push(plugin.plugin_call(calls)?);
        }
        all.extend_from_slice(calls);
        Ok(all)
    }

    async fn estimate_prepared(
        &self,
        calls: &[FunctionCall],
        nonce: Felt,
        max_fee: Option<Felt>,
    ) -> Result<FeeEstimate, SdkError> {
        let max_fee = max_fee.unwrap_or_else(|| Felt::from(DEFAULT_ESTIMATE_MAX_FEE));
        let request = self.signed_request(calls, nonce, max_fee).await?;
        let estimate = self
            .provider
            .estimate_fee(&request, BlockId::LATEST)
            .await?;
        debug!(overall_fee = %estimate.overall_fee, "fee estimated");
        Ok(estimate)
    }

    async fn signed_request(
        &self,
        calls: &[FunctionCall],
        nonce: Felt,
        max_fee: Felt,
    ) -> Result<InvokeRequest, SdkError> {
        let hash = self.transaction_hash(calls, nonce, max_fee).await?;
        let signature = self.sign(&hash)?;
        debug!(tx_hash = %hash, "invoke signed");

        let (calldata, request_nonce) = match self.version {
            AccountVersion::V0 => (format_v0_calldata(nonce, calls)?, None),
            AccountVersion::V1 => (format_calldata(calls)?, Some(nonce)),
        };

        Ok(InvokeRequest {
            tx_type: "INVOKE".to_string(),
            contract_address: self.address,
            entry_point_selector: get_selector_from_name(EXECUTE_ENTRYPOINT)?,
            calldata: to_hex_strings(&calldata),
            signature: signature.to_hex_strings(),
            max_fee,
            version: self.version.as_felt(),
            nonce: request_nonce,
        })
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("version", &self.version)
            .field("public_key", &self.public_key())
            .field("plugin", &self.plugin.is_some())
            .finish()
    }
}

/// Builder for [`Account`]
pub struct AccountBuilder {
    provider: Arc<Provider>,
    address: Felt,
    signing_key: SigningKey,
    version: AccountVersion,
    plugins: Vec<Box<dyn AccountPlugin>>,
}

impl AccountBuilder {
    /// Set the account version
    pub fn version(mut self, version: AccountVersion) -> Self {
        self.version = version;
        self
    }

    /// Add a plugin
    pub fn plugin(mut self, plugin: impl AccountPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Build the account; at most one plugin is allowed
    pub fn build(mut self) -> Result<Account, SdkError> {
        if self.plugins.len() > 1 {
            return Err(SdkError::MultiplePlugins);
        }
        Ok(Account {
            provider: self.provider,
            address: self.address,
            signing_key: self.signing_key,
            version: self.version,
            plugin: self.plugins.pop(),
        })
    }
}

/// `fee * factor` without wrapping around the field modulus
fn scale_fee(fee: Felt, factor: u64) -> Result<Felt, SdkError> {
    let mut total = Felt::ZERO;
    for _ in 0..factor {
        let next = total + fee;
        // a wrapped sum lands below the running total
        if next < total {
            return Err(SdkError::InvalidResponse(format!(
                "overall fee {} overflows when multiplied by {}",
                fee, factor
            )));
        }
        total = next;
    }
    Ok(total)
}
