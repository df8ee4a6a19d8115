//! CrossFile Recursive Descent Parser
//!
//! Parses CrossFile tokens into an Abstract Syntax Tree (AST).
//! Declarations, types and the precedence-climbing expression grammar each
//! live in their own submodule.

pub mod declarations;
pub mod errors;
pub mod expressions;
pub mod types;

use crate::ast::*;
use crate::lexer::{Token, TokenType};
use std::collections::VecDeque;
use xfile_common::{CompilerError, SourceLocation, SourceSpan};

pub use errors::ParseError;

/// CrossFile parser
pub struct Parser {
    pub(crate) tokens: VecDeque<Token>,
    pub(crate) node_id_gen: NodeIdGenerator,
    eof_location: SourceLocation,
}

impl Parser {
    /// Create a new parser
    ///
    /// Doc comments stay in the stream; they are only legal at attachment
    /// points and the grammar consumes them there explicitly.
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof_location = tokens
            .last()
            .map(|t| t.span.end.clone())
            .unwrap_or_else(|| SourceLocation::new_simple(1, 1));

        Self {
            tokens: tokens.into(),
            node_id_gen: NodeIdGenerator::new(),
            eof_location,
        }
    }

    /// Peek at current token without consuming
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Get current token and advance
    pub(crate) fn advance(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Check if current token matches expected type
    pub(crate) fn check(&self, token_type: &TokenType) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.token_type) == std::mem::discriminant(token_type)
        } else {
            matches!(token_type, TokenType::EndOfFile)
        }
    }

    /// Check if current token is an identifier
    pub(crate) fn check_identifier(&self) -> bool {
        matches!(self.peek().map(|t| &t.token_type), Some(TokenType::Identifier(_)))
    }

    /// Consume token if it matches expected type
    pub(crate) fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect and consume a specific token type
    pub(crate) fn expect(&mut self, token_type: TokenType, context: &str) -> Result<Token, ParseError> {
        if let Some(token) = self.advance() {
            if std::mem::discriminant(&token.token_type) == std::mem::discriminant(&token_type) {
                Ok(token)
            } else {
                Err(ParseError::UnexpectedToken {
                    expected: format!("{} in {}", token_type, context),
                    found: token,
                })
            }
        } else {
            Err(ParseError::UnexpectedEndOfFile {
                expected: format!("{} in {}", token_type, context),
                location: self.eof_location.clone(),
            })
        }
    }

    /// Expect and consume an identifier, returning its text
    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<(String, SourceSpan), ParseError> {
        match self.advance() {
            Some(Token { token_type: TokenType::Identifier(name), span }) => Ok((name, span)),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: format!("identifier in {}", context),
                found: token,
            }),
            None => Err(ParseError::UnexpectedEndOfFile {
                expected: format!("identifier in {}", context),
                location: self.eof_location.clone(),
            }),
        }
    }

    /// Expect and consume a numeric literal
    pub(crate) fn expect_number(&mut self, context: &str) -> Result<(i64, SourceSpan), ParseError> {
        match self.advance() {
            Some(Token { token_type: TokenType::IntLiteral(value), span }) => Ok((value, span)),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: format!("number in {}", context),
                found: token,
            }),
            None => Err(ParseError::UnexpectedEndOfFile {
                expected: format!("number in {}", context),
                location: self.eof_location.clone(),
            }),
        }
    }

    /// Consume a doc comment if one is next
    pub(crate) fn take_doc_comment(&mut self) -> Option<String> {
        if let Some(Token { token_type: TokenType::DocComment(_), .. }) = self.peek() {
            match self.advance() {
                Some(Token { token_type: TokenType::DocComment(text), .. }) => Some(text),
                _ => None,
            }
        } else {
            None
        }
    }

    /// Get current location for error reporting
    pub(crate) fn current_location(&self) -> SourceLocation {
        if let Some(token) = self.peek() {
            token.span.start.clone()
        } else {
            self.eof_location.clone()
        }
    }

    /// Parse a complete source unit
    pub fn parse_source_unit(&mut self) -> Result<SourceUnit, CompilerError> {
        let start_location = self.current_location();
        let mut decls = Vec::new();

        while !self.check(&TokenType::EndOfFile) {
            decls.push(self.parse_declaration()?);
        }

        let end_location = self.current_location();

        Ok(SourceUnit {
            decls,
            span: SourceSpan::new(start_location, end_location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_expression_from_str(input: &str) -> Result<Expr, CompilerError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse_expression()
    }

    fn parse_unit_from_str(input: &str) -> Result<SourceUnit, CompilerError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse_source_unit()
    }

    #[test]
    fn test_parse_integer_literal() {
        let expr = parse_expression_from_str("42").unwrap();
        match expr.kind {
            ExprKind::Num(value) => assert_eq!(value, 42),
            _ => panic!("Expected numeric literal"),
        }
    }

    #[test]
    fn test_parse_identifier() {
        let expr = parse_expression_from_str("num_glyphs").unwrap();
        match expr.kind {
            ExprKind::Id(name) => assert_eq!(name, "num_glyphs"),
            _ => panic!("Expected identifier"),
        }
    }

    #[test]
    fn test_parse_binary_expression() {
        let expr = parse_expression_from_str("2 + 3").unwrap();
        match expr.kind {
            ExprKind::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::Add);
                match (&left.kind, &right.kind) {
                    (ExprKind::Num(2), ExprKind::Num(3)) => {}
                    _ => panic!("Expected 2 + 3"),
                }
            }
            _ => panic!("Expected binary expression"),
        }
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        let expr = parse_expression_from_str("a + b * c").unwrap();

        // Should parse as a + (b * c)
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Add, left, right } => {
                match (&left.kind, &right.kind) {
                    (ExprKind::Id(_), ExprKind::Binary { op: BinaryOp::Mul, .. }) => {}
                    _ => panic!("Expected a + (b * c) structure"),
                }
            }
            _ => panic!("Expected binary addition"),
        }
    }

    #[test]
    fn test_bitwise_same_level_left_assoc() {
        let expr = parse_expression_from_str("a & b | c").unwrap();

        // & and | share a precedence level, so left associativity gives (a & b) | c
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::BitOr, left, right } => {
                match (&left.kind, &right.kind) {
                    (ExprKind::Binary { op: BinaryOp::BitAnd, .. }, ExprKind::Id(_)) => {}
                    _ => panic!("Expected (a & b) | c structure"),
                }
            }
            _ => panic!("Expected binary or"),
        }
    }

    #[test]
    fn test_unary_binds_tightest() {
        let expr = parse_expression_from_str("!a && b").unwrap();

        // Should parse as (!a) && b
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::LogicalAnd, left, right } => {
                match (&left.kind, &right.kind) {
                    (ExprKind::Unary { op: UnaryOp::LogicalNot, .. }, ExprKind::Id(_)) => {}
                    _ => panic!("Expected (!a) && b structure"),
                }
            }
            _ => panic!("Expected logical and"),
        }
    }

    #[test]
    fn test_parse_range() {
        let expr = parse_expression_from_str("1..10").unwrap();
        match expr.kind {
            ExprKind::Range { begin, end } => {
                assert_eq!(begin, 1);
                assert_eq!(end, 10);
            }
            _ => panic!("Expected range"),
        }
    }

    #[test]
    fn test_parse_paren() {
        let expr = parse_expression_from_str("(a + b) * c").unwrap();
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Mul, left, .. } => {
                assert!(matches!(left.kind, ExprKind::Paren(_)));
            }
            _ => panic!("Expected multiplication"),
        }
    }

    #[test]
    fn test_parse_empty_unit() {
        let unit = parse_unit_from_str("").unwrap();
        assert!(unit.decls.is_empty());
    }

    #[test]
    fn test_parse_unit_declaration_order() {
        let unit = parse_unit_from_str(
            "enum A : Uint8 { X = 1 } struct B { Uint8 x } file C { Uint8 y }",
        )
        .unwrap();

        assert_eq!(unit.decls.len(), 3);
        assert_eq!(unit.decls[0].name(), "A");
        assert_eq!(unit.decls[1].name(), "B");
        assert_eq!(unit.decls[2].name(), "C");
    }

    #[test]
    fn test_doc_comment_without_declaration_is_error() {
        let result = parse_unit_from_str("/* floating */");
        assert!(result.is_err());
    }

    #[test]
    fn test_doc_comment_attaches_to_declaration() {
        let unit = parse_unit_from_str("/* the header */ struct Head { Uint8 x }").unwrap();
        assert_eq!(unit.decls[0].doc(), Some(" the header "));
    }
}
