//! Expression AST nodes for CrossFile
//!
//! Expressions appear in array sizes, address directives, enum values and
//! assert blocks. They are either folded to constants by the resolver or
//! retained symbolically for the decoding engine.

use super::ops::{BinaryOp, UnaryOp};
use crate::ast::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use xfile_common::SourceSpan;

/// AST expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub node_id: NodeId,
    pub kind: ExprKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Numeric literal (decimal or hex)
    Num(i64),

    /// Inclusive numeric range `begin..end`
    Range { begin: i64, end: i64 },

    /// Reference to a prior field or constant; dotted chains are kept
    /// opaque for the consuming engine
    Id(String),

    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary prefix operation
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Parenthesized sub-expression, retained for lossless re-serialization
    Paren(Box<Expr>),

    /// Homogeneous array literal
    Array(ArrayLiteral),
}

/// A homogeneous array literal: all chars, all numbers, or all strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayLiteral {
    Chars(Vec<u8>),
    Nums(Vec<i64>),
    Strs(Vec<String>),
}

impl Expr {
    /// True when the expression is an identifier reference (single segment
    /// or dotted)
    pub fn is_id(&self) -> bool {
        matches!(self.kind, ExprKind::Id(_))
    }

    /// Structural check that an expression is boolean-shaped: its top node
    /// produces a boolean. Used to validate assert blocks.
    pub fn is_boolean(&self) -> bool {
        match &self.kind {
            ExprKind::Binary { op, .. } => op.produces_bool(),
            ExprKind::Unary { op, .. } => matches!(op, UnaryOp::LogicalNot),
            ExprKind::Paren(inner) => inner.is_boolean(),
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Num(n) => write!(f, "{}", n),
            ExprKind::Range { begin, end } => write!(f, "{}..{}", begin, end),
            ExprKind::Id(name) => write!(f, "{}", name),
            ExprKind::Binary { op, left, right } => write!(f, "{} {} {}", left, op, right),
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op, operand),
            ExprKind::Paren(inner) => write!(f, "({})", inner),
            ExprKind::Array(ArrayLiteral::Chars(chars)) => {
                write!(f, "[")?;
                for (i, c) in chars.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "'{}'", *c as char)?;
                }
                write!(f, "]")
            }
            ExprKind::Array(ArrayLiteral::Nums(nums)) => {
                write!(f, "[")?;
                for (i, n) in nums.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", n)?;
                }
                write!(f, "]")
            }
            ExprKind::Array(ArrayLiteral::Strs(strs)) => {
                write!(f, "[")?;
                for (i, s) in strs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "\"{}\"", s)?;
                }
                write!(f, "]")
            }
        }
    }
}
