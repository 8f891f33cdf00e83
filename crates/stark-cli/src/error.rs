//! CLI error types

use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid field element
    #[error("Invalid felt: {0}")]
    InvalidFelt(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SDK error
    #[error("SDK error: {0}")]
    Sdk(#[from] stark_sdk::SdkError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Waiting gave up
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}
