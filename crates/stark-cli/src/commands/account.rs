//! Account commands

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use stark_sdk::{
    Account, AccountVersion, ExecuteDetails, FunctionCall, Session, SessionKeyPlugin, SigningKey,
};
use tracing::info;

use super::{parse_felt, parse_felts, provider};
use crate::{config::Config, output::Output, CliError};

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Generate a new signing key
    New,
    /// Derive the public key of a private key
    PublicKey {
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Query the account nonce
    Nonce {
        #[command(flatten)]
        signer: SignerArgs,
    },
    /// Estimate the fee of an invoke
    EstimateFee {
        #[command(flatten)]
        signer: SignerArgs,
        #[command(flatten)]
        call: CallArgs,
        /// Nonce to use instead of querying it
        #[arg(long)]
        nonce: Option<String>,
    },
    /// Sign and submit an invoke
    Invoke {
        #[command(flatten)]
        signer: SignerArgs,
        #[command(flatten)]
        call: CallArgs,
        /// Nonce to use instead of querying it
        #[arg(long)]
        nonce: Option<String>,
        /// Max fee; estimated when omitted
        #[arg(long)]
        max_fee: Option<String>,
        /// Wait until the transaction is final
        #[arg(long)]
        wait: bool,
        /// Give up waiting after this many seconds
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
}

/// Private key input
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Private key (hex)
    #[arg(long, env = "STARK_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,
}

impl KeyArgs {
    fn signing_key(&self) -> Result<SigningKey, CliError> {
        SigningKey::from_hex(&self.private_key).map_err(|e| CliError::InvalidKey(e.to_string()))
    }
}

/// Account selection and signing
#[derive(Debug, Args)]
pub struct SignerArgs {
    #[command(flatten)]
    key: KeyArgs,
    /// Account address; defaults to the configured one
    #[arg(long)]
    address: Option<String>,
    /// Account contract version ("v0" or "v1"); defaults to the configured one
    #[arg(long)]
    account_version: Option<String>,
    /// Session JSON file to sign through the session-key plugin
    #[arg(long, requires = "session_class_hash")]
    session: Option<PathBuf>,
    /// Class hash of the session-key plugin
    #[arg(long)]
    session_class_hash: Option<String>,
}

impl SignerArgs {
    fn account(&self, config: &Config) -> Result<Account, CliError> {
        let address = self
            .address
            .as_deref()
            .or(config.account_address.as_deref())
            .ok_or_else(|| CliError::InvalidInput("no account address given or configured".to_string()))?;
        let address = parse_felt(address)?;
        let version = match &self.account_version {
            Some(v) => v.parse::<AccountVersion>()?,
            None => config.account_version,
        };

        let mut builder = Account::builder(provider(config), address, self.key.signing_key()?).version(version);
        if let (Some(path), Some(class_hash)) = (&self.session, &self.session_class_hash) {
            let session: Session = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            let plugin = SessionKeyPlugin::new(parse_felt(class_hash)?, address, session)?;
            info!(root = %plugin.root(), "using session-key plugin");
            builder = builder.plugin(plugin);
        }
        Ok(builder.build()?)
    }
}

/// A single contract call
#[derive(Debug, Args)]
pub struct CallArgs {
    /// Contract address
    #[arg(long)]
    contract: String,
    /// Entry point name
    #[arg(long)]
    function: String,
    /// Calldata felts (hex or decimal)
    calldata: Vec<String>,
}

impl CallArgs {
    fn to_call(&self) -> Result<FunctionCall, CliError> {
        Ok(FunctionCall::new(
            parse_felt(&self.contract)?,
            self.function.as_str(),
            parse_felts(&self.calldata)?,
        ))
    }
}

fn details(nonce: Option<&str>, max_fee: Option<&str>) -> Result<ExecuteDetails, CliError> {
    let mut details = ExecuteDetails::default();
    if let Some(nonce) = nonce {
        details = details.with_nonce(parse_felt(nonce)?);
    }
    if let Some(max_fee) = max_fee {
        details = details.with_max_fee(parse_felt(max_fee)?);
    }
    Ok(details)
}

impl AccountCommand {
    pub async fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        match self {
            AccountCommand::New => new_key(json),
            AccountCommand::PublicKey { key } => public_key(&key, json),
            AccountCommand::Nonce { signer } => nonce(config, &signer, json).await,
            AccountCommand::EstimateFee { signer, call, nonce } => {
                estimate_fee(config, &signer, &call, nonce.as_deref(), json).await
            }
            AccountCommand::Invoke {
                signer,
                call,
                nonce,
                max_fee,
                wait,
                timeout_secs,
            } => {
                let details = details(nonce.as_deref(), max_fee.as_deref())?;
                let timeout = wait.then(|| Duration::from_secs(timeout_secs));
                invoke(config, &signer, &call, details, timeout, json).await
            }
        }
    }
}

fn new_key(json: bool) -> Result<(), CliError> {
    let key = SigningKey::new_random();
    let private_key = key.secret_hex();
    let public_key = key.public_key();

    Output::new(json)
        .field("private_key", &private_key)
        .field_felt("public_key", public_key)
        .message(&format!("Private key: {}\nPublic key: {}", private_key, public_key))
        .print();

    if !json {
        println!("\nWARNING: Save your private key securely. It cannot be recovered!");
    }

    Ok(())
}

fn public_key(key: &KeyArgs, json: bool) -> Result<(), CliError> {
    let public_key = key.signing_key()?.public_key();

    Output::new(json)
        .field_felt("public_key", public_key)
        .message(&format!("Public key: {}", public_key))
        .print();

    Ok(())
}

async fn nonce(config: &Config, signer: &SignerArgs, json: bool) -> Result<(), CliError> {
    let account = signer.account(config)?;
    let nonce = account.nonce().await?;

    Output::new(json)
        .field_felt("address", account.address())
        .field("version", &account.version().to_string())
        .field_felt("nonce", nonce)
        .message(&format!("Nonce of {}: {}", account.address(), nonce))
        .print();

    Ok(())
}

async fn estimate_fee(
    config: &Config,
    signer: &SignerArgs,
    call: &CallArgs,
    nonce: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let account = signer.account(config)?;
    let estimate = account.estimate_fee(&[call.to_call()?], details(nonce, None)?).await?;

    Output::new(json)
        .field_felt("gas_consumed", estimate.gas_consumed)
        .field_felt("gas_price", estimate.gas_price)
        .field_felt("overall_fee", estimate.overall_fee)
        .message(&format!(
            "Gas consumed: {}\nGas price: {}\nOverall fee: {}",
            estimate.gas_consumed, estimate.gas_price, estimate.overall_fee
        ))
        .print();

    Ok(())
}

async fn invoke(
    config: &Config,
    signer: &SignerArgs,
    call: &CallArgs,
    details: ExecuteDetails,
    wait: Option<Duration>,
    json: bool,
) -> Result<(), CliError> {
    let account = signer.account(config)?;
    let call = call.to_call()?;
    let sent = account.execute(std::slice::from_ref(&call), details).await?;
    let tx_hash = sent.transaction_hash;

    let Some(timeout) = wait else {
        Output::new(json)
            .field_felt("transaction_hash", tx_hash)
            .field_felts("calldata", &call.calldata)
            .message(&format!("Transaction sent: {}", tx_hash))
            .print();
        return Ok(());
    };

    let receipt = tokio::time::timeout(
        timeout,
        account.provider().wait_for_transaction(tx_hash, Duration::from_secs(2)),
    )
    .await
    .map_err(|_| CliError::Timeout(format!("transaction {} not final after {:?}", tx_hash, timeout)))??;
    let status = receipt
        .status()
        .map(|s| format!("{:?}", s))
        .unwrap_or_else(|| "Unknown".to_string());

    Output::new(json)
        .field_felt("transaction_hash", tx_hash)
        .field("status", &status)
        .message(&format!("Transaction {}: {}", tx_hash, status))
        .print();

    Ok(())
}
