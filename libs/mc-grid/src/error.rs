//! # Grid Errors

use mc_expr::EvalError;
use thiserror::Error;

/// Errors that can occur while building or validating a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Sampling the scalar field failed.
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// Dimension above the accepted limit.
    #[error("Grid dimension {dimension} exceeds maximum {max}")]
    DimensionTooLarge { dimension: u32, max: u32 },

    /// Corner array length differs from `n³`.
    #[error("Grid of dimension {dimension} needs {expected} corners, got {actual}")]
    LengthMismatch {
        dimension: u32,
        expected: usize,
        actual: usize,
    },

    /// Spacing is zero, negative or not finite.
    #[error("Invalid grid spacing: {0}")]
    InvalidSpacing(f32),
}
