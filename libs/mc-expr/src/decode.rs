//! # Tree Decoding
//!
//! Converts CindyScript parse trees, as sent by the client in JSON, into the
//! closed [`Expression`] type.
//!
//! ## Node Shapes
//!
//! ```text
//! {"ctype": "void"}
//! {"ctype": "variable", "name": "x"}
//! {"ctype": "number",   "value": {"real": 2.0, "imag": 0.0}}
//! {"ctype": "infix",    "oper": "+",      "args": [lhs, rhs]}
//! {"ctype": "function", "oper": "sqrt$1", "args": [arg]}
//! ```
//!
//! A function definition wraps its tree in a `body` key; see
//! [`decode_function`].

use config::constants::MAX_EXPRESSION_DEPTH;
use log::warn;
use serde_json::Value as Json;

use crate::ast::{Expression, Function, InfixOp};
use crate::error::EvalError;

/// What to do with node kinds, operators and functions outside the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Fail the decode with [`EvalError::UnsupportedExpression`].
    #[default]
    Reject,
    /// Read unsupported nodes as `0.0` and log a warning. Operands of an
    /// unknown infix operator are still evaluated, so assignments inside
    /// them take effect; any other unsupported subtree becomes `Void`.
    Lenient,
}

/// Decode one expression tree.
///
/// ## Errors
///
/// - `UnsupportedExpression` (under `Reject`)
/// - `InvalidAssignmentTarget` for `=` with a non-variable left operand,
///   under either policy
/// - `MalformedTree` for missing fields or wrong arity
/// - `TooDeep` past `MAX_EXPRESSION_DEPTH`
///
/// ## Example
///
/// ```rust
/// use mc_expr::{decode_expression, Expression, UnsupportedPolicy};
///
/// let tree = serde_json::json!({"ctype": "variable", "name": "r"});
/// let expr = decode_expression(&tree, UnsupportedPolicy::Reject).unwrap();
/// assert_eq!(expr, Expression::variable("r"));
/// ```
pub fn decode_expression(tree: &Json, policy: UnsupportedPolicy) -> Result<Expression, EvalError> {
    Decoder { policy }.node(tree, 1)
}

/// Decode a function definition, sampling its `body`.
///
/// A bare expression tree (no `body` key) is accepted as-is.
pub fn decode_function(function: &Json, policy: UnsupportedPolicy) -> Result<Expression, EvalError> {
    let body = function.get("body").unwrap_or(function);
    decode_expression(body, policy)
}

struct Decoder {
    policy: UnsupportedPolicy,
}

impl Decoder {
    fn node(&self, tree: &Json, depth: usize) -> Result<Expression, EvalError> {
        if depth > MAX_EXPRESSION_DEPTH {
            return Err(EvalError::TooDeep {
                max: MAX_EXPRESSION_DEPTH,
            });
        }

        match self.kind(tree, depth) {
            Err(EvalError::UnsupportedExpression(what))
                if self.policy == UnsupportedPolicy::Lenient =>
            {
                warn!("Unsupported expression ({what}); evaluating as 0");
                Ok(Expression::Void)
            }
            result => result,
        }
    }

    fn kind(&self, tree: &Json, depth: usize) -> Result<Expression, EvalError> {
        let ctype = str_field(tree, "ctype")?;
        match ctype {
            "void" => Ok(Expression::Void),
            "variable" => Ok(Expression::Variable(str_field(tree, "name")?.to_string())),
            "number" => {
                let real = tree
                    .get("value")
                    .and_then(|value| value.get("real"))
                    .and_then(Json::as_f64)
                    .ok_or_else(|| EvalError::malformed("number without value.real"))?;
                Ok(Expression::Number(real as f32))
            }
            "infix" => self.infix(tree, depth),
            "function" => self.call(tree, depth),
            other => Err(EvalError::unsupported(format!("node kind '{other}'"))),
        }
    }

    fn infix(&self, tree: &Json, depth: usize) -> Result<Expression, EvalError> {
        let symbol = str_field(tree, "oper")?;
        let op = InfixOp::from_symbol(symbol);
        if op.is_none() && self.policy == UnsupportedPolicy::Reject {
            return Err(EvalError::unsupported(format!("infix operator '{symbol}'")));
        }

        let args = args_field(tree)?;
        let [left, right] = args else {
            return Err(EvalError::malformed(format!(
                "infix '{symbol}' expects 2 operands, got {}",
                args.len()
            )));
        };

        let Some(op) = op else {
            // Operands still run for their side effects; the result is 0.
            warn!("Unsupported expression (infix operator '{symbol}'); evaluating as 0");
            let operands = Expression::infix(
                InfixOp::Sequence,
                self.node(left, depth + 1)?,
                self.node(right, depth + 1)?,
            );
            return Ok(Expression::infix(InfixOp::Sequence, operands, Expression::Void));
        };

        let left = self.node(left, depth + 1)?;
        if op == InfixOp::Assign && !matches!(left, Expression::Variable(_)) {
            return Err(EvalError::InvalidAssignmentTarget(left.kind().to_string()));
        }
        let right = self.node(right, depth + 1)?;
        Ok(Expression::infix(op, left, right))
    }

    fn call(&self, tree: &Json, depth: usize) -> Result<Expression, EvalError> {
        let identifier = str_field(tree, "oper")?;
        let function = Function::from_identifier(identifier)
            .ok_or_else(|| EvalError::unsupported(format!("function '{identifier}'")))?;

        let args = args_field(tree)?;
        if args.len() != function.arity() {
            return Err(EvalError::malformed(format!(
                "{identifier} expects {} operand(s), got {}",
                function.arity(),
                args.len()
            )));
        }

        let args = args
            .iter()
            .map(|arg| self.node(arg, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expression::Call { function, args })
    }
}

fn str_field<'t>(tree: &'t Json, key: &str) -> Result<&'t str, EvalError> {
    tree.get(key)
        .and_then(Json::as_str)
        .ok_or_else(|| EvalError::malformed(format!("missing string field '{key}'")))
}

fn args_field(tree: &Json) -> Result<&[Json], EvalError> {
    tree.get("args")
        .and_then(Json::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| EvalError::malformed("missing 'args' array"))
}

// =============================================================================
// TESTS
// =============================================================================
