//! CrossFile Frontend
//!
//! This crate provides the frontend for the CrossFile binary-format
//! description language:
//! - Lexer: tokenizes `.xfile` source text
//! - Parser: builds the AST from tokens
//! - AST: declaration and expression definitions
//! - Semantic resolver: name resolution, constant folding, layout
//! - IR: the resolved, queryable declaration table
//!
//! Lexing, parsing and resolution are strict pipeline stages over one
//! source unit. Units are independent, so callers may compile several in
//! parallel with one `Frontend` pipeline run per unit.

pub mod ast;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod semantic;

pub use ast::{
    AddrDirection, AddrDirective, ArrayLiteral, BasicType, BinaryOp, Declaration, EnumDecl,
    EnumMember, EnumValue, Expr, ExprKind, FileDecl, SourceUnit, StructDecl, StructMember,
    TypeExpr, TypedefDecl, TypedefField, UnaryOp,
};
pub use ir::{
    AddrVal, ArrayCount, IrAddr, IrDecl, IrEnum, IrFile, IrMember, IrStruct, IrTable, IrTypedef,
    ResolvedType, SizeVal,
};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{ParseError, Parser};
pub use semantic::{resolve, ResolvedUnit, Resolver, SemanticError};

use xfile_common::CompilerError;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Tokenize source text (for debugging and tooling)
    pub fn tokenize_source(source: &str) -> Result<Vec<Token>, CompilerError> {
        let mut lexer = Lexer::new(source);
        lexer.tokenize()
    }

    /// Parse source text into an AST
    pub fn parse_source(source: &str) -> Result<SourceUnit, CompilerError> {
        let tokens = Self::tokenize_source(source)?;

        let mut parser = Parser::new(tokens);
        let unit = parser.parse_source_unit()?;

        Ok(unit)
    }

    /// Parse and resolve source text into the IR table
    ///
    /// Lexical and syntax errors abort the unit. Semantic errors do not:
    /// they are collected in the returned [`ResolvedUnit`] alongside the IR
    /// for every declaration that resolved cleanly.
    pub fn resolve_source(source: &str) -> Result<ResolvedUnit, CompilerError> {
        let unit = Self::parse_source(source)?;
        Ok(semantic::resolve(&unit))
    }
}
