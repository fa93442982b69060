use std::fmt;

use crate::lexer::Token;

/// A parsed formula.
///
/// Children are boxed and exclusively owned; the tree has no sharing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Negation or a prefix function (`\sqrt`, `\sin`, ...).
    Unary { op: Token, inner: Box<Expression> },
    Binary {
        left: Box<Expression>,
        op: Token,
        right: Box<Expression>,
    },
    /// A `REAL` or `IMAGINARY` literal.
    Literal { value: Token },
    /// A free identifier or a reserved parameter.
    Variable { identifier: Token },
    /// Placeholder for a subterm that failed to parse.
    ParseError { message: String },
}

impl Expression {
    pub fn unary(op: Token, inner: Expression) -> Self {
        Expression::Unary {
            op,
            inner: Box::new(inner),
        }
    }

    pub fn binary(left: Expression, op: Token, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// True when no `ParseError` node occurs anywhere in the tree.
    pub fn is_valid(&self) -> bool {
        match self {
            Expression::Unary { inner, .. } => inner.is_valid(),
            Expression::Binary { left, right, .. } => left.is_valid() && right.is_valid(),
            Expression::Literal { .. } | Expression::Variable { .. } => true,
            Expression::ParseError { .. } => false,
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expression::Unary { inner, .. } => 1 + inner.node_count(),
            Expression::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
            _ => 1,
        }
    }
}

/// Debug form: `OP[child]`, `OP[left, right]`, tokens as `{KIND: value}`.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Unary { op, inner } => write!(f, "{}[{}]", op, inner),
            Expression::Binary { left, op, right } => write!(f, "{}[{}, {}]", op, left, right),
            Expression::Literal { value } => write!(f, "{}", value),
            Expression::Variable { identifier } => write!(f, "{}", identifier),
            Expression::ParseError { message } => write!(f, "ERROR[{}]", message),
        }
    }
}
