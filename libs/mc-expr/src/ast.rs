//! # Expression Tree
//!
//! Closed expression type for scalar-field functions. Every node kind,
//! operator and function is an enum case, so evaluation is an exhaustive
//! match and anything outside the grammar is rejected while decoding.

use std::fmt;

// =============================================================================
// OPERATORS
// =============================================================================

/// Binary operators of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// `name = value`; writes into the evaluating environment.
    Assign,
    /// `a ; b`; evaluates `a` for side effects, yields `b`.
    Sequence,
}

impl InfixOp {
    /// Looks up an operator by its source symbol.
    ///
    /// ```rust
    /// use mc_expr::InfixOp;
    /// assert_eq!(InfixOp::from_symbol("^"), Some(InfixOp::Pow));
    /// assert_eq!(InfixOp::from_symbol("%"), None);
    /// ```
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            "^" => Some(Self::Pow),
            "=" => Some(Self::Assign),
            ";" => Some(Self::Sequence),
            _ => None,
        }
    }

    /// Source symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Assign => "=",
            Self::Sequence => ";",
        }
    }
}

// =============================================================================
// FUNCTIONS
// =============================================================================

/// Built-in functions. Identifiers carry their arity (`sqrt$1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
}

impl Function {
    /// Looks up a function by its arity-qualified identifier.
    ///
    /// ```rust
    /// use mc_expr::Function;
    /// assert_eq!(Function::from_identifier("sin$1"), Some(Function::Sin));
    /// assert_eq!(Function::from_identifier("sin$2"), None);
    /// ```
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "sqrt$1" => Some(Self::Sqrt),
            "sin$1" => Some(Self::Sin),
            "cos$1" => Some(Self::Cos),
            _ => None,
        }
    }

    /// Arity-qualified identifier of the function.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt$1",
            Self::Sin => "sin$1",
            Self::Cos => "cos$1",
        }
    }

    /// Number of operands the function takes.
    pub fn arity(self) -> usize {
        1
    }

    /// Applies the function in single precision.
    #[inline]
    pub fn apply(self, argument: f32) -> f32 {
        match self {
            Self::Sqrt => argument.sqrt(),
            Self::Sin => argument.sin(),
            Self::Cos => argument.cos(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
        }
    }
}

// =============================================================================
// EXPRESSION
// =============================================================================

/// A parsed scalar-field expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Empty expression; evaluates to `0.0`.
    Void,
    /// Variable reference; unknown names evaluate to `0.0`.
    Variable(String),
    /// Numeric literal (real component).
    Number(f32),
    /// Binary operation. Both operands are always evaluated, left first.
    Infix {
        op: InfixOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Built-in function call.
    Call {
        function: Function,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Creates a variable reference.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Creates a numeric literal.
    pub fn number(value: f32) -> Self {
        Self::Number(value)
    }

    /// Creates a binary operation.
    pub fn infix(op: InfixOp, left: Expression, right: Expression) -> Self {
        Self::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a single-operand function call.
    pub fn call(function: Function, argument: Expression) -> Self {
        Self::Call {
            function,
            args: vec![argument],
        }
    }

    /// Creates `name = value`.
    pub fn assign(name: impl Into<String>, value: Expression) -> Self {
        Self::infix(InfixOp::Assign, Self::variable(name), value)
    }

    /// Short label of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Variable(_) => "variable",
            Self::Number(_) => "number",
            Self::Infix { .. } => "infix",
            Self::Call { .. } => "function",
        }
    }

    /// Depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Void | Self::Variable(_) | Self::Number(_) => 1,
            Self::Infix { left, right, .. } => 1 + left.depth().max(right.depth()),
            Self::Call { args, .. } => 1 + args.iter().map(Self::depth).max().unwrap_or(0),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "()"),
            Self::Variable(name) => write!(f, "{name}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Infix { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            Self::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
