//! CLI subcommands

pub mod account;
pub mod query;
pub mod util;

use std::sync::Arc;

use stark_sdk::{BlockId, Felt, Provider};

use crate::{config::Config, CliError};

/// Parse a felt given as `0x` hex or decimal
pub(crate) fn parse_felt(value: &str) -> Result<Felt, CliError> {
    value
        .parse::<Felt>()
        .map_err(|e| CliError::InvalidFelt(format!("{value}: {e}")))
}

pub(crate) fn parse_felts(values: &[String]) -> Result<Vec<Felt>, CliError> {
    values.iter().map(|v| parse_felt(v)).collect()
}

pub(crate) fn parse_block(value: &str) -> Result<BlockId, CliError> {
    value
        .parse::<BlockId>()
        .map_err(|e| CliError::InvalidInput(e.to_string()))
}

pub(crate) fn provider(config: &Config) -> Arc<Provider> {
    Arc::new(Provider::connect(&config.rpc_url))
}
