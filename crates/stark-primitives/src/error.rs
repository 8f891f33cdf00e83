//! Common error types for primitives

use thiserror::Error;
use crate::felt::FeltError;
use crate::short_string::ShortStringError;

/// Primitive operation error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Felt error
    #[error("felt error: {0}")]
    Felt(#[from] FeltError),

    /// Short string error
    #[error("short string error: {0}")]
    ShortString(#[from] ShortStringError),
}
