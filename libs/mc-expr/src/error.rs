//! # Expression Errors
//!
//! Error types for expression decoding and evaluation.

use thiserror::Error;

/// Errors that can occur while decoding or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Node kind, operator or function identifier outside the grammar.
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Left-hand side of `=` is not a variable reference.
    #[error("Assignment target must be a variable, got {0}")]
    InvalidAssignmentTarget(String),

    /// Tree node missing a required field or carrying the wrong arity.
    #[error("Malformed expression tree: {0}")]
    MalformedTree(String),

    /// Tree nested deeper than the configured limit.
    #[error("Expression nesting exceeds {max} levels")]
    TooDeep { max: usize },
}

impl EvalError {
    /// Creates an unsupported expression error.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedExpression(what.into())
    }

    /// Creates a malformed tree error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTree(message.into())
    }
}

// =============================================================================
// TESTS
// =============================================================================
