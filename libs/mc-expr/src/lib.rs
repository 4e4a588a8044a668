//! # Marching Cubes Expressions
//!
//! Scalar-field expressions for procedurally defined grids.
//!
//! ## Architecture
//!
//! ```text
//! CindyScript tree (JSON) → decode → Expression → evaluate(LocalEnv) → f32
//! ```
//!
//! The grammar is deliberately small: variables, numeric literals, the infix
//! operators `+ - * / ^ = ;` and the functions `sqrt`, `sin`, `cos`.
//!
//! ## Example
//!
//! ```rust
//! use mc_expr::{evaluate, Environment, Expression, InfixOp};
//!
//! // x ^ 2
//! let expr = Expression::infix(InfixOp::Pow, Expression::variable("x"), Expression::number(2.0));
//! let globals = Environment::new();
//! let mut local = globals.local_at([3.0, 0.0, 0.0]);
//! assert_eq!(evaluate(&expr, &mut local).unwrap(), 9.0);
//! ```

pub mod ast;
pub mod decode;
pub mod env;
pub mod error;
pub mod evaluator;

// Re-export public API
pub use ast::{Expression, Function, InfixOp};
pub use decode::{decode_expression, decode_function, UnsupportedPolicy};
pub use env::{Environment, LocalEnv};
pub use error::EvalError;
pub use evaluator::evaluate;
