//! # Wire Errors

use mc_expr::EvalError;
use mc_grid::GridError;
use thiserror::Error;

/// Errors raised while decoding a client message.
///
/// Every variant is a protocol error: the request is rejected before any
/// device work starts.
#[derive(Debug, Error)]
pub enum WireError {
    /// Payload shorter than its header claims.
    #[error("Message truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Payload longer than its header claims.
    #[error("Message has trailing bytes: expected {expected} bytes, got {actual}")]
    TrailingBytes { expected: usize, actual: usize },

    /// Requested grid dimension above the accepted limit.
    #[error("Grid dimension {dimension} exceeds maximum {max}")]
    DimensionTooLarge { dimension: u32, max: u32 },

    /// Payload is not a whole number of fixed-size records.
    #[error("Payload of {length} bytes is not a multiple of {record}-byte records")]
    Misaligned { length: usize, record: usize },

    /// Grid construction failed.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Expression decoding failed.
    #[error("Expression error: {0}")]
    Eval(#[from] EvalError),

    /// JSON field request could not be parsed.
    #[error("Invalid field request: {0}")]
    Json(#[from] serde_json::Error),
}
