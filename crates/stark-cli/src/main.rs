//! # stark-cli
//!
//! Command-line interface for Starknet accounts and node queries.
//!
//! ## Usage
//!
//! ```bash
//! # Offline helpers
//! stark util selector transfer
//! stark util short-string SN_GOERLI
//!
//! # Keys and accounts
//! stark account new
//! stark account nonce --address 0x... --private-key 0x...
//! stark account invoke --contract 0x... --function transfer 0x... 10 0 --wait
//!
//! # Query commands
//! stark query chain-id
//! stark query receipt 0x...
//! stark query call --contract 0x... --function balanceOf 0x...
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Starknet CLI
#[derive(Parser, Debug)]
#[command(name = "stark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// RPC endpoint URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Keys, fees and invokes
    #[command(subcommand)]
    Account(commands::account::AccountCommand),
    /// Query node state
    #[command(subcommand)]
    Query(commands::query::QueryCommand),
    /// Offline encoding helpers
    #[command(subcommand)]
    Util(commands::util::UtilCommand),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set RPC URL
        #[arg(long)]
        set_rpc: Option<String>,
        /// Set default account address
        #[arg(long)]
        set_account: Option<String>,
        /// Set default account version ("v0" or "v1")
        #[arg(long)]
        set_account_version: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = Config::load();

    if let Some(rpc_url) = cli.rpc_url {
        config.rpc_url = rpc_url;
    }

    let result = match cli.command {
        Commands::Account(cmd) => cmd.execute(&config, cli.json).await,
        Commands::Query(cmd) => cmd.execute(&config, cli.json).await,
        Commands::Util(cmd) => cmd.execute(cli.json),
        Commands::Config {
            show,
            set_rpc,
            set_account,
            set_account_version,
        } => handle_config(&mut config, show, set_rpc, set_account, set_account_version, cli.json),
    };

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn handle_config(
    config: &mut Config,
    show: bool,
    set_rpc: Option<String>,
    set_account: Option<String>,
    set_account_version: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(rpc) = set_rpc {
        config.rpc_url = rpc;
        modified = true;
    }

    if let Some(address) = set_account {
        config.account_address = Some(commands::parse_felt(&address)?.to_hex());
        modified = true;
    }

    if let Some(version) = set_account_version {
        config.account_version = version.parse()?;
        modified = true;
    }

    if modified {
        config.save()?;
        Output::new(json)
            .field("status", "saved")
            .message("Configuration saved")
            .print();
    } else if show {
        let account = config.account_address.clone().unwrap_or_default();
        Output::new(json)
            .field("rpc_url", &config.rpc_url)
            .field("account_address", &account)
            .field("account_version", &config.account_version.to_string())
            .message(&format!(
                "RPC URL: {}\nAccount: {}\nAccount version: {}",
                config.rpc_url,
                if account.is_empty() { "(none)" } else { &account },
                config.account_version
            ))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-rpc/--set-account/--set-account-version to modify")
            .print();
    }

    Ok(())
}
