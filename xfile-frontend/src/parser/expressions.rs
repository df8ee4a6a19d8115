//! Expression parsing for CrossFile
//!
//! Precedence climbing with the language's fixed ladder, loosest to
//! tightest: logical, comparison, additive, multiplicative, bitwise, unary
//! prefix. All binary levels are left-associative; parentheses reset
//! precedence. The ordering is part of the language and is preserved
//! exactly for compatibility with existing documents.

use crate::ast::*;
use crate::lexer::{Token, TokenType};
use crate::parser::errors::ParseError;
use crate::parser::Parser;
use xfile_common::{CompilerError, SourceSpan};

impl Parser {
    /// Parse expression (top level)
    pub fn parse_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_logical_expression()
    }

    /// Level 1: `||`, `&&`
    fn parse_logical_expression(&mut self) -> Result<Expr, CompilerError> {
        let mut left = self.parse_comparison_expression()?;

        while let Some(op) = self.parse_logical_operator() {
            let right = self.parse_comparison_expression()?;
            left = self.make_binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_logical_operator(&mut self) -> Option<BinaryOp> {
        match self.peek().map(|t| &t.token_type) {
            Some(TokenType::PipePipe) => { self.advance(); Some(BinaryOp::LogicalOr) }
            Some(TokenType::AmpersandAmpersand) => { self.advance(); Some(BinaryOp::LogicalAnd) }
            _ => None,
        }
    }

    /// Level 2: `==`, `!=`, `<`, `<=`, `>`, `>=`
    fn parse_comparison_expression(&mut self) -> Result<Expr, CompilerError> {
        let mut left = self.parse_additive_expression()?;

        while let Some(op) = self.parse_comparison_operator() {
            let right = self.parse_additive_expression()?;
            left = self.make_binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_comparison_operator(&mut self) -> Option<BinaryOp> {
        match self.peek().map(|t| &t.token_type) {
            Some(TokenType::EqualEqual) => { self.advance(); Some(BinaryOp::Equal) }
            Some(TokenType::BangEqual) => { self.advance(); Some(BinaryOp::NotEqual) }
            Some(TokenType::Less) => { self.advance(); Some(BinaryOp::Less) }
            Some(TokenType::LessEqual) => { self.advance(); Some(BinaryOp::LessEqual) }
            Some(TokenType::Greater) => { self.advance(); Some(BinaryOp::Greater) }
            Some(TokenType::GreaterEqual) => { self.advance(); Some(BinaryOp::GreaterEqual) }
            _ => None,
        }
    }

    /// Level 3: `+`, `-`
    fn parse_additive_expression(&mut self) -> Result<Expr, CompilerError> {
        let mut left = self.parse_multiplicative_expression()?;

        while let Some(op) = self.parse_additive_operator() {
            let right = self.parse_multiplicative_expression()?;
            left = self.make_binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive_operator(&mut self) -> Option<BinaryOp> {
        match self.peek().map(|t| &t.token_type) {
            Some(TokenType::Plus) => { self.advance(); Some(BinaryOp::Add) }
            Some(TokenType::Minus) => { self.advance(); Some(BinaryOp::Sub) }
            _ => None,
        }
    }

    /// Level 4: `*`, `/`, `%`
    fn parse_multiplicative_expression(&mut self) -> Result<Expr, CompilerError> {
        let mut left = self.parse_bitwise_expression()?;

        while let Some(op) = self.parse_multiplicative_operator() {
            let right = self.parse_bitwise_expression()?;
            left = self.make_binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative_operator(&mut self) -> Option<BinaryOp> {
        match self.peek().map(|t| &t.token_type) {
            Some(TokenType::Star) => { self.advance(); Some(BinaryOp::Mul) }
            Some(TokenType::Slash) => { self.advance(); Some(BinaryOp::Div) }
            Some(TokenType::Percent) => { self.advance(); Some(BinaryOp::Mod) }
            _ => None,
        }
    }

    /// Level 5: `&`, `|`, `^`, `<<`, `>>`, all on one shared level
    fn parse_bitwise_expression(&mut self) -> Result<Expr, CompilerError> {
        let mut left = self.parse_unary_expression()?;

        while let Some(op) = self.parse_bitwise_operator() {
            let right = self.parse_unary_expression()?;
            left = self.make_binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_bitwise_operator(&mut self) -> Option<BinaryOp> {
        match self.peek().map(|t| &t.token_type) {
            Some(TokenType::Ampersand) => { self.advance(); Some(BinaryOp::BitAnd) }
            Some(TokenType::Pipe) => { self.advance(); Some(BinaryOp::BitOr) }
            Some(TokenType::Caret) => { self.advance(); Some(BinaryOp::BitXor) }
            Some(TokenType::LeftShift) => { self.advance(); Some(BinaryOp::Shl) }
            Some(TokenType::RightShift) => { self.advance(); Some(BinaryOp::Shr) }
            _ => None,
        }
    }

    /// Level 6: unary `~` and `!`, right-associative prefix
    fn parse_unary_expression(&mut self) -> Result<Expr, CompilerError> {
        let op = match self.peek().map(|t| &t.token_type) {
            Some(TokenType::Tilde) => Some(UnaryOp::BitNot),
            Some(TokenType::Bang) => Some(UnaryOp::LogicalNot),
            _ => None,
        };

        if let Some(op) = op {
            let start = self.current_location();
            self.advance();
            let operand = self.parse_unary_expression()?;
            let span = SourceSpan::new(start, operand.span.end.clone());

            Ok(Expr {
                node_id: self.node_id_gen.next(),
                kind: ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            })
        } else {
            self.parse_primary_expression()
        }
    }

    /// Primary: number, range, identifier, parenthesized expression, or
    /// array literal
    fn parse_primary_expression(&mut self) -> Result<Expr, CompilerError> {
        let start_location = self.current_location();

        let kind = match self.advance() {
            Some(Token { token_type: TokenType::IntLiteral(value), .. }) => {
                if self.match_token(&TokenType::DotDot) {
                    let (end, _) = self.expect_number("range end")?;
                    ExprKind::Range { begin: value, end }
                } else {
                    ExprKind::Num(value)
                }
            }
            Some(Token { token_type: TokenType::Identifier(name), .. }) => ExprKind::Id(name),
            Some(Token { token_type: TokenType::LeftParen, .. }) => {
                let inner = self.parse_expression()?;
                self.expect(TokenType::RightParen, "parenthesized expression")?;
                ExprKind::Paren(Box::new(inner))
            }
            Some(Token { token_type: TokenType::LeftBracket, span }) => {
                ExprKind::Array(self.parse_array_literal(span)?)
            }
            Some(token) => {
                return Err(ParseError::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: token,
                }
                .into());
            }
            None => {
                return Err(ParseError::UnexpectedEndOfFile {
                    expected: "expression".to_string(),
                    location: start_location,
                }
                .into());
            }
        };

        let end_location = self.current_location();

        Ok(Expr {
            node_id: self.node_id_gen.next(),
            kind,
            span: SourceSpan::new(start_location, end_location),
        })
    }

    /// Parse the elements of `[ ... ]` after the opening bracket. Elements
    /// are whitespace-separated (commas tolerated) and must be homogeneous.
    fn parse_array_literal(&mut self, open_span: SourceSpan) -> Result<ArrayLiteral, CompilerError> {
        let mut literal: Option<ArrayLiteral> = None;

        loop {
            if self.check(&TokenType::RightBracket) {
                self.advance();
                break;
            }

            match self.advance() {
                Some(Token { token_type: TokenType::CharLiteral(c), span }) => {
                    match literal.get_or_insert_with(|| ArrayLiteral::Chars(Vec::new())) {
                        ArrayLiteral::Chars(chars) => chars.push(c),
                        _ => {
                            return Err(ParseError::MixedArrayLiteral { location: span.start }.into());
                        }
                    }
                }
                Some(Token { token_type: TokenType::IntLiteral(n), span }) => {
                    match literal.get_or_insert_with(|| ArrayLiteral::Nums(Vec::new())) {
                        ArrayLiteral::Nums(nums) => nums.push(n),
                        _ => {
                            return Err(ParseError::MixedArrayLiteral { location: span.start }.into());
                        }
                    }
                }
                Some(Token { token_type: TokenType::StrLiteral(s), span }) => {
                    match literal.get_or_insert_with(|| ArrayLiteral::Strs(Vec::new())) {
                        ArrayLiteral::Strs(strs) => strs.push(s),
                        _ => {
                            return Err(ParseError::MixedArrayLiteral { location: span.start }.into());
                        }
                    }
                }
                Some(Token { token_type: TokenType::Comma, .. }) => {}
                Some(token) => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "array literal element".to_string(),
                        found: token,
                    }
                    .into());
                }
                None => {
                    return Err(ParseError::UnexpectedEndOfFile {
                        expected: "] to close array literal".to_string(),
                        location: open_span.start,
                    }
                    .into());
                }
            }
        }

        // An empty literal defaults to numeric
        Ok(literal.unwrap_or(ArrayLiteral::Nums(Vec::new())))
    }

    fn make_binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = SourceSpan::new(left.span.start.clone(), right.span.end.clone());

        Expr {
            node_id: self.node_id_gen.next(),
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        }
    }
}
