//! Type parsing for CrossFile
//!
//! Basic types are keyword tokens, everything else is a custom reference.
//! Pointer suffixes wrap the base type left-to-right, so `Uint8**` becomes
//! `Pointer(Pointer(Basic(Uint8)))`.

use crate::ast::{BasicType, TypeExpr};
use crate::lexer::TokenType;
use crate::parser::errors::ParseError;
use crate::parser::Parser;
use xfile_common::CompilerError;

/// Map a basic-type keyword token to its type, if it is one
fn basic_type_of(token_type: &TokenType) -> Option<BasicType> {
    match token_type {
        TokenType::Bool => Some(BasicType::Bool),
        TokenType::Char => Some(BasicType::Char),
        TokenType::Uint8 => Some(BasicType::Uint8),
        TokenType::Uint16 => Some(BasicType::Uint16),
        TokenType::Uint32 => Some(BasicType::Uint32),
        TokenType::Uint64 => Some(BasicType::Uint64),
        TokenType::Int8 => Some(BasicType::Int8),
        TokenType::Int16 => Some(BasicType::Int16),
        TokenType::Int32 => Some(BasicType::Int32),
        TokenType::Int64 => Some(BasicType::Int64),
        TokenType::Size => Some(BasicType::Size),
        TokenType::CStr => Some(BasicType::CStr),
        _ => None,
    }
}

impl Parser {
    /// Check if the current token can start a type (and hence a member)
    pub(crate) fn is_type_start(&self) -> bool {
        match self.peek().map(|t| &t.token_type) {
            Some(token_type) => token_type.is_basic_type() || matches!(token_type, TokenType::Identifier(_)),
            None => false,
        }
    }

    /// Parse a type: basic keyword or custom reference, then pointer suffixes
    pub fn parse_type(&mut self) -> Result<TypeExpr, CompilerError> {
        let mut ty = self.parse_base_type()?;

        while self.match_token(&TokenType::Star) {
            ty = TypeExpr::Pointer(Box::new(ty));
        }

        Ok(ty)
    }

    fn parse_base_type(&mut self) -> Result<TypeExpr, CompilerError> {
        if let Some(basic) = self.peek().and_then(|t| basic_type_of(&t.token_type)) {
            self.advance();
            return Ok(TypeExpr::Basic(basic));
        }

        if self.check_identifier() {
            let (name, _) = self.expect_identifier("type")?;

            let typeargs = if self.check(&TokenType::Less) {
                self.parse_typeargs()?
            } else {
                Vec::new()
            };

            return Ok(TypeExpr::Custom { name, typeargs });
        }

        match self.advance() {
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: "type".to_string(),
                found: token,
            }
            .into()),
            None => Err(ParseError::UnexpectedEndOfFile {
                expected: "type".to_string(),
                location: self.current_location(),
            }
            .into()),
        }
    }

    /// Parse `<Arg, Arg, ...>` typedef instantiation arguments; each argument
    /// is a basic type keyword or a declared name
    fn parse_typeargs(&mut self) -> Result<Vec<TypeExpr>, CompilerError> {
        self.expect(TokenType::Less, "typedef arguments")?;

        let mut args = Vec::new();
        loop {
            args.push(self.parse_typearg()?);

            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.expect(TokenType::Greater, "typedef arguments")?;
        Ok(args)
    }

    /// A single typedef argument or typedef body field type: the grammar
    /// allows no nesting and no pointers here
    pub(crate) fn parse_typearg(&mut self) -> Result<TypeExpr, CompilerError> {
        if let Some(basic) = self.peek().and_then(|t| basic_type_of(&t.token_type)) {
            self.advance();
            return Ok(TypeExpr::Basic(basic));
        }

        let (name, _) = self.expect_identifier("type name")?;
        Ok(TypeExpr::named(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_type_from_str(input: &str) -> Result<TypeExpr, CompilerError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse_type()
    }

    #[test]
    fn test_parse_basic_types() {
        assert_eq!(parse_type_from_str("Uint8").unwrap(), TypeExpr::Basic(BasicType::Uint8));
        assert_eq!(parse_type_from_str("CStr").unwrap(), TypeExpr::Basic(BasicType::CStr));
        assert_eq!(parse_type_from_str("Size").unwrap(), TypeExpr::Basic(BasicType::Size));
    }

    #[test]
    fn test_parse_custom_type() {
        let ty = parse_type_from_str("TableRecord").unwrap();
        assert_eq!(ty, TypeExpr::named("TableRecord"));
    }

    #[test]
    fn test_parse_pointer_chain() {
        let ty = parse_type_from_str("Uint8**").unwrap();
        assert_eq!(
            ty,
            TypeExpr::Pointer(Box::new(TypeExpr::Pointer(Box::new(TypeExpr::Basic(
                BasicType::Uint8
            )))))
        );
    }

    #[test]
    fn test_pointer_round_trip() {
        for depth in 1..=4 {
            let source = format!("Uint8{}", "*".repeat(depth));
            let ty = parse_type_from_str(&source).unwrap();
            assert_eq!(ty.pointer_depth(), depth);
            assert_eq!(format!("{}", ty), source);
        }
    }

    #[test]
    fn test_parse_typedef_instantiation() {
        let ty = parse_type_from_str("Slice<Uint32, GlyphId>").unwrap();
        match ty {
            TypeExpr::Custom { name, typeargs } => {
                assert_eq!(name, "Slice");
                assert_eq!(typeargs.len(), 2);
                assert_eq!(typeargs[0], TypeExpr::Basic(BasicType::Uint32));
                assert_eq!(typeargs[1], TypeExpr::named("GlyphId"));
            }
            _ => panic!("Expected custom type"),
        }
    }

    #[test]
    fn test_pointer_to_instantiation() {
        let ty = parse_type_from_str("Slice<Uint8>*").unwrap();
        assert_eq!(ty.pointer_depth(), 1);
        assert_eq!(format!("{}", ty), "Slice<Uint8>*");
    }
}
