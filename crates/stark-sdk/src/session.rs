//! Session-key plugin
//!
//! A session authorizes a key to call a fixed set of `(contract, selector)`
//! policies until an expiry. The policies are committed as a Merkle root;
//! every outgoing batch carries a `use_plugin` call with one proof per call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stark_crypto::{get_selector_from_name, hash_elements, FixedSizeMerkleTree};
use stark_primitives::Felt;
use tracing::debug;

use crate::plugin::AccountPlugin;
use crate::types::FunctionCall;
use crate::SdkError;

/// Type hash of `Policy(contractAddress:felt,selector:selector)`
pub const POLICY_TYPE_HASH: &str =
    "0x2f0026e78543f036f33e26a8f5891b88c58dc1e20cbbfaf0bb53274da6fa568";

/// Entry point of the account that dispatches to a plugin
pub const USE_PLUGIN_ENTRYPOINT: &str = "use_plugin";

/// One allowed `(contract, function)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Allowed contract
    pub contract_address: Felt,
    /// Allowed function name
    pub selector: String,
}

/// Session authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session public key
    pub key: Felt,
    /// Expiry timestamp
    pub expires: u64,
    /// Allowed calls
    pub policies: Vec<Policy>,
}

fn policy_type_hash() -> Result<Felt, SdkError> {
    Ok(Felt::from_hex(POLICY_TYPE_HASH)?)
}

/// Merkle leaf of a `(contract, selector)` pair
pub fn policy_leaf(contract_address: Felt, selector: Felt) -> Result<Felt, SdkError> {
    Ok(hash_elements(&[policy_type_hash()?, contract_address, selector]))
}

/// Concatenate proofs that must all share one length
///
/// Returns the common length and the flattened proofs. An empty batch has
/// length 0.
pub fn flatten_proofs(proofs: &[Vec<Felt>]) -> Result<(usize, Vec<Felt>), SdkError> {
    let expected = proofs.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(expected * proofs.len());
    for proof in proofs {
        if proof.len() != expected {
            return Err(SdkError::ProofLengthMismatch {
                expected,
                got: proof.len(),
            });
        }
        flat.extend_from_slice(proof);
    }
    Ok((expected, flat))
}

/// Plugin that wraps batches into a `use_plugin` call
#[derive(Debug, Clone)]
pub struct SessionKeyPlugin {
    class_hash: Felt,
    account_address: Felt,
    session: Session,
    tree: FixedSizeMerkleTree,
    proofs: HashMap<Felt, Vec<Felt>>,
}

impl SessionKeyPlugin {
    /// Build the policy tree for `session`
    pub fn new(class_hash: Felt, account_address: Felt, session: Session) -> Result<Self, SdkError> {
        let leaves = session
            .policies
            .iter()
            .map(|policy| {
                let selector = get_selector_from_name(&policy.selector)?;
                policy_leaf(policy.contract_address, selector)
            })
            .collect::<Result<Vec<_>, SdkError>>()?;
        let tree = FixedSizeMerkleTree::new(leaves)?;
        debug!(root = %tree.root(), policies = session.policies.len(), "session policy tree built");

        Ok(SessionKeyPlugin {
            class_hash,
            account_address,
            session,
            tree,
            proofs: HashMap::new(),
        })
    }

    /// Use a known proof for a policy instead of computing it
    pub fn with_proof(mut self, contract_address: Felt, selector: Felt, proof: Vec<Felt>) -> Result<Self, SdkError> {
        let leaf = policy_leaf(contract_address, selector)?;
        self.proofs.insert(leaf, proof);
        Ok(self)
    }

    /// Root of the policy tree
    pub fn root(&self) -> Felt {
        self.tree.root()
    }

    /// Session this plugin was built from
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Proof authorizing `call`
    pub fn proof_for(&self, call: &FunctionCall) -> Result<Vec<Felt>, SdkError> {
        let leaf = policy_leaf(call.contract_address, call.selector()?)?;
        if let Some(proof) = self.proofs.get(&leaf) {
            return Ok(proof.clone());
        }
        Ok(self.tree.proof(&leaf)?)
    }
}

impl AccountPlugin for SessionKeyPlugin {
    fn plugin_call(&self, calls: &[FunctionCall]) -> Result<FunctionCall, SdkError> {
        let proofs = calls
            .iter()
            .map(|call| self.proof_for(call))
            .collect::<Result<Vec<_>, SdkError>>()?;
        let (proof_len, flat) = flatten_proofs(&proofs)?;

        let mut calldata = Vec::with_capacity(4 + flat.len());
        calldata.push(self.class_hash);
        calldata.push(Felt::from(self.session.expires));
        calldata.push(self.tree.root());
        calldata.push(Felt::from(proof_len));
        calldata.extend(flat);

        Ok(FunctionCall::new(
            self.account_address,
            USE_PLUGIN_ENTRYPOINT,
            calldata,
        ))
    }
}
