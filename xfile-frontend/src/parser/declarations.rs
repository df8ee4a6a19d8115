//! Declaration parsing for CrossFile
//!
//! Top level is a sequence of enum, struct, file and typedef declarations,
//! each optionally preceded by one doc comment. Assert and implicit blocks
//! sit inside the struct body, before the closing brace, assert first.

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::ParseError;
use crate::parser::Parser;
use xfile_common::{CompilerError, SourceSpan};

impl Parser {
    /// Parse one top-level declaration, with its optional doc comment
    pub fn parse_declaration(&mut self) -> Result<Declaration, CompilerError> {
        let doc_location = self.current_location();
        let doc = self.take_doc_comment();

        match self.peek().map(|t| &t.token_type) {
            Some(TokenType::Enum) => Ok(Declaration::Enum(self.parse_enum_decl(doc)?)),
            Some(TokenType::Struct) => Ok(Declaration::Struct(self.parse_struct_decl(doc)?)),
            Some(TokenType::File) => Ok(Declaration::File(self.parse_file_decl(doc)?)),
            Some(TokenType::Typedef) => Ok(Declaration::Typedef(self.parse_typedef_decl(doc)?)),
            _ if doc.is_some() => {
                Err(ParseError::DanglingDocComment { location: doc_location }.into())
            }
            _ => match self.advance() {
                Some(token) => Err(ParseError::UnexpectedToken {
                    expected: "declaration (enum, struct, file or typedef)".to_string(),
                    found: token,
                }
                .into()),
                None => Err(ParseError::UnexpectedEndOfFile {
                    expected: "declaration".to_string(),
                    location: self.current_location(),
                }
                .into()),
            },
        }
    }

    /// `enum Name : Type { A, B = 1 ... }`
    fn parse_enum_decl(&mut self, doc: Option<String>) -> Result<EnumDecl, CompilerError> {
        let start = self.current_location();
        self.expect(TokenType::Enum, "enum declaration")?;

        let (name, _) = self.expect_identifier("enum declaration")?;
        self.expect(TokenType::Colon, "enum declaration")?;
        let underlying = self.parse_type()?;

        self.expect(TokenType::LeftBrace, "enum body")?;

        let mut members = Vec::new();
        while self.check_identifier() {
            members.push(self.parse_enum_member()?);
        }

        self.expect(TokenType::RightBrace, "enum body")?;
        let end = self.current_location();

        Ok(EnumDecl {
            node_id: self.node_id_gen.next(),
            name,
            underlying,
            members,
            doc,
            span: SourceSpan::new(start, end),
        })
    }

    /// One enum member line: `A, B = 5 /* doc */`; every name aliases the
    /// same value
    fn parse_enum_member(&mut self) -> Result<EnumMember, CompilerError> {
        let start = self.current_location();

        let mut names = Vec::new();
        let (first, _) = self.expect_identifier("enum member")?;
        names.push(first);

        while self.match_token(&TokenType::Comma) {
            let (name, _) = self.expect_identifier("enum member")?;
            names.push(name);
        }

        self.expect(TokenType::Equal, "enum member")?;

        let (begin, _) = self.expect_number("enum member value")?;

        let value = if self.match_token(&TokenType::DotDot) {
            let (end, _) = self.expect_number("enum member range end")?;
            EnumValue::Range { begin, end }
        } else {
            EnumValue::Num(begin)
        };

        let doc = self.take_doc_comment();
        let end = self.current_location();

        Ok(EnumMember {
            names,
            value,
            doc,
            span: SourceSpan::new(start, end),
        })
    }

    /// `struct Name { members... #assert { ... } #implicit { ... } }`
    fn parse_struct_decl(&mut self, doc: Option<String>) -> Result<StructDecl, CompilerError> {
        let start = self.current_location();
        self.expect(TokenType::Struct, "struct declaration")?;

        let (name, _) = self.expect_identifier("struct declaration")?;
        self.expect(TokenType::LeftBrace, "struct body")?;

        let mut members = Vec::new();
        while self.is_type_start() {
            members.push(self.parse_struct_member()?);
        }

        let asserts = if self.check(&TokenType::HashAssert) {
            self.parse_assert_block()?
        } else {
            Vec::new()
        };

        let implicits = if self.check(&TokenType::HashImplicit) {
            self.parse_implicit_block()?
        } else {
            Vec::new()
        };

        self.expect(TokenType::RightBrace, "struct body")?;
        let end = self.current_location();

        Ok(StructDecl {
            node_id: self.node_id_gen.next(),
            name,
            members,
            asserts,
            implicits,
            doc,
            span: SourceSpan::new(start, end),
        })
    }

    /// `#assert { bool_expr... }`
    fn parse_assert_block(&mut self) -> Result<Vec<Expr>, CompilerError> {
        self.expect(TokenType::HashAssert, "assert block")?;
        self.expect(TokenType::LeftBrace, "assert block")?;

        let mut asserts = Vec::new();
        while !self.check(&TokenType::RightBrace) && !self.check(&TokenType::EndOfFile) {
            asserts.push(self.parse_expression()?);
        }

        self.expect(TokenType::RightBrace, "assert block")?;
        Ok(asserts)
    }

    /// `#implicit { members... }`
    fn parse_implicit_block(&mut self) -> Result<Vec<StructMember>, CompilerError> {
        self.expect(TokenType::HashImplicit, "implicit block")?;
        self.expect(TokenType::LeftBrace, "implicit block")?;

        let mut members = Vec::new();
        while self.is_type_start() {
            members.push(self.parse_struct_member()?);
        }

        self.expect(TokenType::RightBrace, "implicit block")?;
        Ok(members)
    }

    /// One member: `Type name [count]? (addr)? /* doc */?`
    pub(crate) fn parse_struct_member(&mut self) -> Result<StructMember, CompilerError> {
        let start = self.current_location();

        let type_expr = self.parse_type()?;
        let (name, _) = self.expect_identifier("struct member")?;

        let array_size = if self.match_token(&TokenType::LeftBracket) {
            let size = self.parse_expression()?;
            self.expect(TokenType::RightBracket, "array size")?;
            Some(size)
        } else {
            None
        };

        let addr = if self.check(&TokenType::LeftParen) {
            Some(self.parse_addr_directive()?)
        } else {
            None
        };

        let doc = self.take_doc_comment();
        let end = self.current_location();

        Ok(StructMember {
            type_expr,
            name,
            array_size,
            addr,
            doc,
            span: SourceSpan::new(start, end),
        })
    }

    /// `'(' '$'? ('+' | '-') expr ')'`, where `$` switches from
    /// scope-start-relative to cursor-relative addressing
    fn parse_addr_directive(&mut self) -> Result<AddrDirective, CompilerError> {
        let start = self.current_location();
        self.expect(TokenType::LeftParen, "address directive")?;

        let cursor_relative = self.match_token(&TokenType::Dollar);

        let direction = if self.match_token(&TokenType::Plus) {
            AddrDirection::Forward
        } else if self.match_token(&TokenType::Minus) {
            AddrDirection::Backward
        } else {
            return match self.advance() {
                Some(token) => Err(ParseError::UnexpectedToken {
                    expected: "+ or - in address directive".to_string(),
                    found: token,
                }
                .into()),
                None => Err(ParseError::UnexpectedEndOfFile {
                    expected: "+ or - in address directive".to_string(),
                    location: self.current_location(),
                }
                .into()),
            };
        };

        let offset = self.parse_expression()?;
        self.expect(TokenType::RightParen, "address directive")?;
        let end = self.current_location();

        Ok(AddrDirective {
            cursor_relative,
            direction,
            offset,
            span: SourceSpan::new(start, end),
        })
    }

    /// `file Name { members... }`
    fn parse_file_decl(&mut self, doc: Option<String>) -> Result<FileDecl, CompilerError> {
        let start = self.current_location();
        self.expect(TokenType::File, "file declaration")?;

        let (name, _) = self.expect_identifier("file declaration")?;
        self.expect(TokenType::LeftBrace, "file body")?;

        let mut members = Vec::new();
        while self.is_type_start() {
            members.push(self.parse_struct_member()?);
        }

        self.expect(TokenType::RightBrace, "file body")?;
        let end = self.current_location();

        Ok(FileDecl {
            node_id: self.node_id_gen.next(),
            name,
            members,
            doc,
            span: SourceSpan::new(start, end),
        })
    }

    /// `typedef Name<T, U> { field: T ... }`
    fn parse_typedef_decl(&mut self, doc: Option<String>) -> Result<TypedefDecl, CompilerError> {
        let start = self.current_location();
        self.expect(TokenType::Typedef, "typedef declaration")?;

        let (name, _) = self.expect_identifier("typedef declaration")?;

        // Parameter list is non-empty by grammar
        self.expect(TokenType::Less, "typedef parameters")?;
        let mut params = Vec::new();
        let (first, _) = self.expect_identifier("typedef parameter")?;
        params.push(first);
        while self.match_token(&TokenType::Comma) {
            let (param, _) = self.expect_identifier("typedef parameter")?;
            params.push(param);
        }
        self.expect(TokenType::Greater, "typedef parameters")?;

        self.expect(TokenType::LeftBrace, "typedef body")?;

        let mut fields = Vec::new();
        while self.check_identifier() {
            let field_start = self.current_location();
            let (field_name, _) = self.expect_identifier("typedef field")?;
            self.expect(TokenType::Colon, "typedef field")?;
            let type_expr = self.parse_typearg()?;
            let field_end = self.current_location();

            fields.push(TypedefField {
                name: field_name,
                type_expr,
                span: SourceSpan::new(field_start, field_end),
            });
        }

        self.expect(TokenType::RightBrace, "typedef body")?;
        let end = self.current_location();

        Ok(TypedefDecl {
            node_id: self.node_id_gen.next(),
            name,
            params,
            fields,
            doc,
            span: SourceSpan::new(start, end),
        })
    }
}
