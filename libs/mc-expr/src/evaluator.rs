//! # Expression Evaluation
//!
//! Evaluates an [`Expression`] against a [`LocalEnv`] in single precision.
//!
//! ## Semantics
//!
//! - Unknown variables read as `0.0`
//! - Both infix operands are evaluated, left first, with no short-circuit
//! - `^` is `powf` without domain checks; NaN propagates
//! - `=` writes into the local scope and yields the assigned value
//! - `;` yields its right operand
//!
//! ## Example
//!
//! ```rust
//! use mc_expr::{evaluate, Environment, Expression, InfixOp};
//!
//! // a = 5; a + 1
//! let expr = Expression::infix(
//!     InfixOp::Sequence,
//!     Expression::assign("a", Expression::number(5.0)),
//!     Expression::infix(InfixOp::Add, Expression::variable("a"), Expression::number(1.0)),
//! );
//! let globals = Environment::new();
//! assert_eq!(evaluate(&expr, &mut globals.local()).unwrap(), 6.0);
//! assert_eq!(globals.get("a"), None);
//! ```

use config::constants::STACKER_STACK_SIZE_BYTES;
use stacker::maybe_grow;

use crate::ast::{Expression, InfixOp};
use crate::env::LocalEnv;
use crate::error::EvalError;

/// Remaining stack below which evaluation moves to a fresh segment.
const RED_ZONE_BYTES: usize = STACKER_STACK_SIZE_BYTES / 128;

/// Evaluate an expression to a scalar.
///
/// ## Parameters
///
/// - `expr`: Expression to evaluate
/// - `env`: Private scope of this evaluation; `=` writes into it
///
/// ## Errors
///
/// `InvalidAssignmentTarget` when an `=` node built in code has a
/// non-variable left operand. Decoded trees are checked earlier.
pub fn evaluate<'a>(expr: &'a Expression, env: &mut LocalEnv<'a>) -> Result<f32, EvalError> {
    eval_node(expr, env)
}

fn eval_node<'a>(expr: &'a Expression, env: &mut LocalEnv<'a>) -> Result<f32, EvalError> {
    maybe_grow(RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || eval_step(expr, env))
}

fn eval_step<'a>(expr: &'a Expression, env: &mut LocalEnv<'a>) -> Result<f32, EvalError> {
    match expr {
        Expression::Void => Ok(0.0),
        Expression::Variable(name) => Ok(env.get(name).unwrap_or(0.0)),
        Expression::Number(value) => Ok(*value),
        Expression::Infix { op, left, right } => eval_infix(*op, left, right, env),
        Expression::Call { function, args } => {
            // Decoding guarantees arity; a hand-built empty call reads as 0.
            let argument = match args.first() {
                Some(arg) => eval_node(arg, env)?,
                None => 0.0,
            };
            Ok(function.apply(argument))
        }
    }
}

fn eval_infix<'a>(
    op: InfixOp,
    left: &'a Expression,
    right: &'a Expression,
    env: &mut LocalEnv<'a>,
) -> Result<f32, EvalError> {
    let lhs = eval_node(left, env)?;
    let rhs = eval_node(right, env)?;

    match op {
        InfixOp::Add => Ok(lhs + rhs),
        InfixOp::Sub => Ok(lhs - rhs),
        InfixOp::Mul => Ok(lhs * rhs),
        InfixOp::Div => Ok(lhs / rhs),
        InfixOp::Pow => Ok(lhs.powf(rhs)),
        InfixOp::Assign => match left {
            Expression::Variable(name) => {
                env.set(name, rhs);
                Ok(rhs)
            }
            other => Err(EvalError::InvalidAssignmentTarget(other.kind().to_string())),
        },
        InfixOp::Sequence => Ok(rhs),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Function;
    use crate::env::Environment;
    use approx::assert_relative_eq;

    fn num(value: f32) -> Expression {
        Expression::number(value)
    }

    fn var(name: &str) -> Expression {
        Expression::variable(name)
    }

    fn eval(expr: &Expression, globals: &Environment) -> f32 {
        evaluate(expr, &mut globals.local()).unwrap()
    }

    #[test]
    fn test_eval_void_is_zero() {
        assert_eq!(eval(&Expression::Void, &Environment::new()), 0.0);
    }

    #[test]
    fn test_eval_arithmetic() {
        let globals = Environment::new();
        // (2 + 3) * 4
        let expr = Expression::infix(
            InfixOp::Mul,
            Expression::infix(InfixOp::Add, num(2.0), num(3.0)),
            num(4.0),
        );
        assert_eq!(eval(&expr, &globals), 20.0);
        assert_eq!(eval(&Expression::infix(InfixOp::Sub, num(2.0), num(5.0)), &globals), -3.0);
        assert_eq!(eval(&Expression::infix(InfixOp::Div, num(1.0), num(4.0)), &globals), 0.25);
    }

    #[test]
    fn test_eval_division_by_zero_is_infinite() {
        let value = eval(&Expression::infix(InfixOp::Div, num(1.0), num(0.0)), &Environment::new());
        assert!(value.is_infinite());
    }

    #[test]
    fn test_eval_pow() {
        let globals: Environment = [("x", 3.0)].into_iter().collect();
        assert_eq!(eval(&Expression::infix(InfixOp::Pow, var("x"), num(2.0)), &globals), 9.0);
    }

    #[test]
    fn test_eval_pow_domain_error_is_nan() {
        let value = eval(&Expression::infix(InfixOp::Pow, num(-8.0), num(0.5)), &Environment::new());
        assert!(value.is_nan());
    }

    #[test]
    fn test_eval_unknown_variable_defaults_to_zero() {
        let expr = Expression::infix(InfixOp::Add, var("y"), num(3.0));
        assert_eq!(eval(&expr, &Environment::new()), 3.0);
    }

    #[test]
    fn test_eval_functions() {
        let globals = Environment::new();
        assert_eq!(eval(&Expression::call(Function::Sqrt, num(16.0)), &globals), 4.0);
        assert_eq!(eval(&Expression::call(Function::Cos, num(0.0)), &globals), 1.0);
        assert_relative_eq!(
            eval(&Expression::call(Function::Sin, num(std::f32::consts::FRAC_PI_2)), &globals),
            1.0
        );
    }

    #[test]
    fn test_eval_assignment_returns_value() {
        let globals = Environment::new();
        let expr = Expression::assign("a", num(7.0));
        let mut local = globals.local();
        assert_eq!(evaluate(&expr, &mut local).unwrap(), 7.0);
        assert_eq!(local.get("a"), Some(7.0));
        assert_eq!(globals.get("a"), None);
    }

    #[test]
    fn test_eval_sequence_evaluates_left_for_side_effects() {
        // x = 5; x + 1
        let expr = Expression::infix(
            InfixOp::Sequence,
            Expression::assign("x", num(5.0)),
            Expression::infix(InfixOp::Add, var("x"), num(1.0)),
        );
        assert_eq!(eval(&expr, &Environment::new()), 6.0);
    }

    #[test]
    fn test_eval_both_operands_always_evaluated() {
        // (a = 2) * 0 ; a
        let expr = Expression::infix(
            InfixOp::Sequence,
            Expression::infix(InfixOp::Mul, Expression::assign("a", num(2.0)), num(0.0)),
            var("a"),
        );
        assert_eq!(eval(&expr, &Environment::new()), 2.0);
    }

    #[test]
    fn test_eval_assignment_to_non_variable_is_rejected() {
        let expr = Expression::infix(InfixOp::Assign, num(1.0), num(2.0));
        let err = evaluate(&expr, &mut Environment::new().local()).unwrap_err();
        assert_eq!(err, EvalError::InvalidAssignmentTarget("number".to_string()));
    }
}
