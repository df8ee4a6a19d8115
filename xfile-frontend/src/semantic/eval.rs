//! Constant expression evaluation
//!
//! Folds expressions over literals to concrete values with two's-complement
//! wrapping semantics. An expression that references a field whose value is
//! only known at decode time stays `Dynamic` and is retained symbolically
//! in the IR. Evaluation order is left-to-right for determinism.

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::semantic::errors::SemanticError;
use std::collections::{HashMap, HashSet};

/// A folded constant value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Range(i64, i64),
}

/// Result of constant evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluated {
    Const(Value),
    /// Depends on decode-time field values; retained as a symbolic expression
    Dynamic,
}

/// Names and constants visible to an expression
pub struct Scope<'a> {
    /// Prior sibling fields; their values exist only at decode time
    pub fields: &'a HashSet<String>,
    /// Known compile-time constants
    pub consts: &'a HashMap<String, i64>,
}

impl<'a> Scope<'a> {
    pub fn new(fields: &'a HashSet<String>, consts: &'a HashMap<String, i64>) -> Self {
        Self { fields, consts }
    }
}

/// Attempt constant evaluation of `expr` against `scope`
pub fn evaluate(expr: &Expr, scope: &Scope) -> Result<Evaluated, SemanticError> {
    match &expr.kind {
        ExprKind::Num(n) => Ok(Evaluated::Const(Value::Int(*n))),

        ExprKind::Range { begin, end } => Ok(Evaluated::Const(Value::Range(*begin, *end))),

        ExprKind::Id(name) => {
            // Dotted references are opaque here; the consuming engine
            // resolves multi-segment access per-instance
            if name.contains('.') {
                return Ok(Evaluated::Dynamic);
            }
            if let Some(value) = scope.consts.get(name) {
                return Ok(Evaluated::Const(Value::Int(*value)));
            }
            if scope.fields.contains(name) {
                return Ok(Evaluated::Dynamic);
            }
            Err(SemanticError::UndefinedName {
                name: name.clone(),
                location: expr.span.start.clone(),
            })
        }

        ExprKind::Paren(inner) => evaluate(inner, scope),

        // Array literals are byte patterns compared against decoded data
        ExprKind::Array(_) => Ok(Evaluated::Dynamic),

        ExprKind::Unary { op, operand } => {
            let value = evaluate(operand, scope)?;
            match (op, value) {
                (_, Evaluated::Dynamic) => Ok(Evaluated::Dynamic),
                (UnaryOp::BitNot, Evaluated::Const(Value::Int(n))) => {
                    Ok(Evaluated::Const(Value::Int(!n)))
                }
                (UnaryOp::LogicalNot, Evaluated::Const(Value::Bool(b))) => {
                    Ok(Evaluated::Const(Value::Bool(!b)))
                }
                (UnaryOp::BitNot, Evaluated::Const(_)) => Err(SemanticError::TypeMismatch {
                    message: "operand of ~ must be numeric".to_string(),
                    location: expr.span.start.clone(),
                }),
                (UnaryOp::LogicalNot, Evaluated::Const(_)) => Err(SemanticError::TypeMismatch {
                    message: "operand of ! must be boolean".to_string(),
                    location: expr.span.start.clone(),
                }),
            }
        }

        ExprKind::Binary { op, left, right } => {
            let lhs = evaluate(left, scope)?;
            let rhs = evaluate(right, scope)?;

            // A statically-known zero divisor is an error even when the
            // dividend is dynamic
            if matches!(op, BinaryOp::Div | BinaryOp::Mod)
                && matches!(rhs, Evaluated::Const(Value::Int(0)))
            {
                return Err(SemanticError::DivideByZero {
                    location: expr.span.start.clone(),
                });
            }

            let (lhs, rhs) = match (lhs, rhs) {
                (Evaluated::Const(l), Evaluated::Const(r)) => (l, r),
                _ => return Ok(Evaluated::Dynamic),
            };

            if matches!(lhs, Value::Range(..)) || matches!(rhs, Value::Range(..)) {
                return Err(SemanticError::TypeMismatch {
                    message: format!("range cannot be an operand of {}", op),
                    location: expr.span.start.clone(),
                });
            }

            apply_binary(*op, lhs, rhs, expr)
        }
    }
}

fn apply_binary(op: BinaryOp, lhs: Value, rhs: Value, expr: &Expr) -> Result<Evaluated, SemanticError> {
    use BinaryOp::*;

    let result = match (op, lhs, rhs) {
        (Add, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
        (Sub, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_sub(b)),
        (Mul, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_mul(b)),
        (Div, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_div(b)),
        (Mod, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_rem(b)),

        (BitAnd, Value::Int(a), Value::Int(b)) => Value::Int(a & b),
        (BitOr, Value::Int(a), Value::Int(b)) => Value::Int(a | b),
        (BitXor, Value::Int(a), Value::Int(b)) => Value::Int(a ^ b),
        // Shift counts wrap at the 64-bit width
        (Shl, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_shl(b as u32 & 63)),
        (Shr, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_shr(b as u32 & 63)),

        (Equal, Value::Int(a), Value::Int(b)) => Value::Bool(a == b),
        (NotEqual, Value::Int(a), Value::Int(b)) => Value::Bool(a != b),
        (Less, Value::Int(a), Value::Int(b)) => Value::Bool(a < b),
        (LessEqual, Value::Int(a), Value::Int(b)) => Value::Bool(a <= b),
        (Greater, Value::Int(a), Value::Int(b)) => Value::Bool(a > b),
        (GreaterEqual, Value::Int(a), Value::Int(b)) => Value::Bool(a >= b),

        (LogicalAnd, Value::Bool(a), Value::Bool(b)) => Value::Bool(a && b),
        (LogicalOr, Value::Bool(a), Value::Bool(b)) => Value::Bool(a || b),

        _ => {
            let expected = if op.is_logical() { "boolean" } else { "numeric" };
            return Err(SemanticError::TypeMismatch {
                message: format!("operands of {} must be {}", op, expected),
                location: expr.span.start.clone(),
            });
        }
    };

    Ok(Evaluated::Const(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval_str(input: &str) -> Result<Evaluated, SemanticError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().unwrap();
        let mut parser = Parser::new(tokens);
        let expr = parser.parse_expression().unwrap();

        let mut fields = HashSet::new();
        fields.insert("num_tables".to_string());
        let consts = HashMap::new();
        evaluate(&expr, &Scope::new(&fields, &consts))
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(eval_str("2 + 3 * 4").unwrap(), Evaluated::Const(Value::Int(14)));
        assert_eq!(eval_str("(2 + 3) * 4").unwrap(), Evaluated::Const(Value::Int(20)));
        assert_eq!(eval_str("0xff & 0x0f").unwrap(), Evaluated::Const(Value::Int(0x0f)));
        assert_eq!(eval_str("1 << 4").unwrap(), Evaluated::Const(Value::Int(16)));
        assert_eq!(eval_str("7 % 4").unwrap(), Evaluated::Const(Value::Int(3)));
    }

    #[test]
    fn test_comparison_folding() {
        assert_eq!(eval_str("2 < 3").unwrap(), Evaluated::Const(Value::Bool(true)));
        assert_eq!(
            eval_str("2 == 3 || 1 <= 1").unwrap(),
            Evaluated::Const(Value::Bool(true))
        );
        assert_eq!(eval_str("!(2 < 3)").unwrap(), Evaluated::Const(Value::Bool(false)));
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(
            eval_str("0x7fffffffffffffff + 1").unwrap(),
            Evaluated::Const(Value::Int(i64::MIN))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(eval_str("1 / 0"), Err(SemanticError::DivideByZero { .. })));
        assert!(matches!(eval_str("1 % 0"), Err(SemanticError::DivideByZero { .. })));
        // Even with a dynamic dividend
        assert!(matches!(
            eval_str("num_tables / 0"),
            Err(SemanticError::DivideByZero { .. })
        ));
    }

    #[test]
    fn test_field_reference_is_dynamic() {
        assert_eq!(eval_str("num_tables * 16").unwrap(), Evaluated::Dynamic);
    }

    #[test]
    fn test_dotted_reference_is_dynamic() {
        assert_eq!(eval_str("head.num_glyphs + 1").unwrap(), Evaluated::Dynamic);
    }

    #[test]
    fn test_undefined_name() {
        assert!(matches!(
            eval_str("missing + 1"),
            Err(SemanticError::UndefinedName { .. })
        ));
    }

    #[test]
    fn test_range_operand_rejected() {
        assert!(matches!(
            eval_str("1..10 + 1"),
            Err(SemanticError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_bool_int_mixing_rejected() {
        assert!(matches!(
            eval_str("(1 < 2) + 1"),
            Err(SemanticError::TypeMismatch { .. })
        ));
        assert!(matches!(
            eval_str("1 && 2"),
            Err(SemanticError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_constant_reference() {
        let mut lexer = Lexer::new("block_size * 2");
        let tokens = lexer.tokenize().unwrap();
        let mut parser = Parser::new(tokens);
        let expr = parser.parse_expression().unwrap();

        let fields = HashSet::new();
        let mut consts = HashMap::new();
        consts.insert("block_size".to_string(), 512_i64);

        let result = evaluate(&expr, &Scope::new(&fields, &consts)).unwrap();
        assert_eq!(result, Evaluated::Const(Value::Int(1024)));
    }
}
