//! Query commands

use clap::Subcommand;
use stark_sdk::{Felt, FunctionCall};

use super::{parse_block, parse_felt, parse_felts, provider};
use crate::{config::Config, output::Output, CliError};

/// Query subcommands
#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Query chain ID
    ChainId,
    /// Query current block number
    BlockNumber,
    /// Query node sync status
    Syncing,
    /// Query the RPC spec version and compare it with the SDK's
    SpecVersion,
    /// Query the nonce of a contract
    Nonce {
        /// Contract address
        address: String,
        /// Block: "latest", "pending", hash or number
        #[arg(long, default_value = "latest")]
        block: String,
    },
    /// Query transaction by hash
    Tx {
        /// Transaction hash
        hash: String,
    },
    /// Query transaction receipt
    Receipt {
        /// Transaction hash
        hash: String,
    },
    /// Call a view function
    Call {
        /// Contract address
        #[arg(long)]
        contract: String,
        /// Entry point name
        #[arg(long)]
        function: String,
        /// Calldata felts (hex or decimal)
        calldata: Vec<String>,
        /// Block: "latest", "pending", hash or number
        #[arg(long, default_value = "latest")]
        block: String,
    },
}

impl QueryCommand {
    pub async fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        match self {
            QueryCommand::ChainId => query_chain_id(config, json).await,
            QueryCommand::BlockNumber => query_block_number(config, json).await,
            QueryCommand::Syncing => query_syncing(config, json).await,
            QueryCommand::SpecVersion => query_spec_version(config, json).await,
            QueryCommand::Nonce { address, block } => query_nonce(config, &address, &block, json).await,
            QueryCommand::Tx { hash } => query_tx(config, &hash, json).await,
            QueryCommand::Receipt { hash } => query_receipt(config, &hash, json).await,
            QueryCommand::Call {
                contract,
                function,
                calldata,
                block,
            } => query_call(config, &contract, &function, &calldata, &block, json).await,
        }
    }
}

async fn query_chain_id(config: &Config, json: bool) -> Result<(), CliError> {
    let chain_id = provider(config).chain_id().await?;
    let name = chain_id.to_short_string().unwrap_or_default();

    Output::new(json)
        .field_felt("chain_id", chain_id)
        .field("name", &name)
        .message(&format!("Chain ID: {} ({})", chain_id, name))
        .print();

    Ok(())
}

async fn query_block_number(config: &Config, json: bool) -> Result<(), CliError> {
    let number = provider(config).block_number().await?;

    Output::new(json)
        .field_u64("block_number", number)
        .message(&format!("Block number: {}", number))
        .print();

    Ok(())
}

async fn query_syncing(config: &Config, json: bool) -> Result<(), CliError> {
    let status = provider(config).syncing().await?;
    let syncing = status.is_syncing();

    Output::new(json)
        .field_value("syncing", serde_json::to_value(&status)?)
        .message(if syncing { "Node is syncing" } else { "Node is not syncing" })
        .print();

    Ok(())
}

async fn query_spec_version(config: &Config, json: bool) -> Result<(), CliError> {
    let provider = provider(config);
    let version = provider.spec_version().await?;
    let compatible =
        stark_sdk::version::check_version_compatibility(&version, stark_sdk::RPC_SPEC_VERSION).is_ok();

    Output::new(json)
        .field("provider", &version)
        .field("sdk", stark_sdk::RPC_SPEC_VERSION)
        .field_value("compatible", serde_json::Value::Bool(compatible))
        .message(&format!(
            "Provider spec {} / SDK spec {} ({})",
            version,
            stark_sdk::RPC_SPEC_VERSION,
            if compatible { "compatible" } else { "incompatible" }
        ))
        .print();

    Ok(())
}

async fn query_nonce(config: &Config, address: &str, block: &str, json: bool) -> Result<(), CliError> {
    let address = parse_felt(address)?;
    let block = parse_block(block)?;
    let nonce = provider(config).get_nonce(block, address).await?;

    Output::new(json)
        .field_felt("address", address)
        .field_felt("nonce", nonce)
        .message(&format!("Nonce of {}: {}", address, nonce))
        .print();

    Ok(())
}

async fn query_tx(config: &Config, hash: &str, json: bool) -> Result<(), CliError> {
    let hash = parse_felt(hash)?;
    let tx = provider(config).get_transaction_by_hash(hash).await?;
    let value = serde_json::to_value(&tx)?;

    Output::new(json)
        .field_value("transaction", value.clone())
        .message(&serde_json::to_string_pretty(&value)?)
        .print();

    Ok(())
}

async fn query_receipt(config: &Config, hash: &str, json: bool) -> Result<(), CliError> {
    let hash = parse_felt(hash)?;
    let receipt = provider(config).get_transaction_receipt(hash).await?;
    let status = receipt
        .status()
        .map(|s| format!("{:?}", s))
        .unwrap_or_else(|| "Unknown".to_string());

    Output::new(json)
        .field_felt("transaction_hash", hash)
        .field("status", &status)
        .field_value("receipt", serde_json::to_value(&receipt)?)
        .message(&format!("Receipt {}: {}", hash, status))
        .print();

    Ok(())
}

async fn query_call(
    config: &Config,
    contract: &str,
    function: &str,
    calldata: &[String],
    block: &str,
    json: bool,
) -> Result<(), CliError> {
    let call = FunctionCall::new(parse_felt(contract)?, function, parse_felts(calldata)?);
    let block = parse_block(block)?;
    let result = provider(config).call(&call, block).await?;
    let lines: Vec<String> = result.iter().map(Felt::to_hex).collect();

    Output::new(json)
        .field_felts("result", &result)
        .message(&lines.join("\n"))
        .print();

    Ok(())
}
