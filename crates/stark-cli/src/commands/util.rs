//! Offline helpers

use clap::Subcommand;
use stark_crypto::{get_selector_from_name, starknet_keccak};
use stark_sdk::Felt;

use super::parse_felt;
use crate::{output::Output, CliError};

/// Utility subcommands
#[derive(Debug, Subcommand)]
pub enum UtilCommand {
    /// Compute the selector of an entry point name
    Selector {
        /// Entry point name
        name: String,
    },
    /// Starknet keccak of a UTF-8 string
    Keccak {
        /// Input text
        text: String,
    },
    /// Encode text (at most 31 ASCII chars) as a felt
    ShortString {
        /// Text to encode
        text: String,
    },
    /// Decode a felt into its short string
    DecodeShortString {
        /// Felt (hex or decimal)
        value: String,
    },
}

impl UtilCommand {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        match self {
            UtilCommand::Selector { name } => {
                let selector = get_selector_from_name(&name)
                    .map_err(|e| CliError::InvalidInput(e.to_string()))?;
                print_felt(json, "selector", &name, selector);
            }
            UtilCommand::Keccak { text } => {
                let hash = starknet_keccak(text.as_bytes());
                Output::new(json)
                    .field("input", &text)
                    .field_felt("keccak", hash)
                    .field("padded", &hash.to_fixed_hex())
                    .message(&format!("{}\n{}", hash, hash.to_fixed_hex()))
                    .print();
            }
            UtilCommand::ShortString { text } => {
                let felt = Felt::from_short_string(&text)
                    .map_err(|e| CliError::InvalidInput(e.to_string()))?;
                print_felt(json, "felt", &text, felt);
            }
            UtilCommand::DecodeShortString { value } => {
                let text = parse_felt(&value)?
                    .to_short_string()
                    .map_err(|e| CliError::InvalidInput(e.to_string()))?;
                Output::new(json)
                    .field("input", &value)
                    .field("text", &text)
                    .message(&text)
                    .print();
            }
        }
        Ok(())
    }
}

fn print_felt(json: bool, key: &str, input: &str, value: Felt) {
    Output::new(json)
        .field("input", input)
        .field_felt(key, value)
        .message(&value.to_hex())
        .print();
}
