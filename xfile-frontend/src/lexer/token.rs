//! Token definitions for the CrossFile lexer
//!
//! This module defines token types and the Token struct.

use serde::{Deserialize, Serialize};
use std::fmt;
use xfile_common::{SourceLocation, SourceSpan};

/// CrossFile token types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    // Literals
    IntLiteral(i64),
    CharLiteral(u8),
    StrLiteral(String),

    // Identifiers (may be dot-chained: `head.magic`)
    Identifier(String),

    // Declaration keywords
    Enum,
    Struct,
    File,
    Typedef,

    // Basic type keywords
    Bool,
    Char,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Size,
    CStr,

    // Block markers
    HashAssert,   // #assert
    HashImplicit, // #implicit

    // Operators
    Plus,               // +
    Minus,              // -
    Star,               // * (multiply or pointer suffix, by context)
    Slash,              // /
    Percent,            // %
    Ampersand,          // &
    Pipe,               // |
    Caret,              // ^
    Tilde,              // ~
    Bang,               // !
    Equal,              // =
    Less,               // <
    Greater,            // >
    Dollar,             // $

    // Compound operators
    LeftShift,          // <<
    RightShift,         // >>
    LessEqual,          // <=
    GreaterEqual,       // >=
    EqualEqual,         // ==
    BangEqual,          // !=
    AmpersandAmpersand, // &&
    PipePipe,           // ||
    DotDot,             // ..

    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Colon,        // :

    // Documentation comment, only legal at attachment points
    DocComment(String),

    EndOfFile,
}

impl TokenType {
    /// True for the twelve built-in type keywords
    pub fn is_basic_type(&self) -> bool {
        matches!(
            self,
            TokenType::Bool
                | TokenType::Char
                | TokenType::Uint8
                | TokenType::Uint16
                | TokenType::Uint32
                | TokenType::Uint64
                | TokenType::Int8
                | TokenType::Int16
                | TokenType::Int32
                | TokenType::Int64
                | TokenType::Size
                | TokenType::CStr
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::IntLiteral(n) => write!(f, "{n}"),
            TokenType::CharLiteral(c) => write!(f, "'{}'", *c as char),
            TokenType::StrLiteral(s) => write!(f, "\"{s}\""),
            TokenType::Identifier(s) => write!(f, "{s}"),

            TokenType::Enum => write!(f, "enum"),
            TokenType::Struct => write!(f, "struct"),
            TokenType::File => write!(f, "file"),
            TokenType::Typedef => write!(f, "typedef"),

            TokenType::Bool => write!(f, "Bool"),
            TokenType::Char => write!(f, "Char"),
            TokenType::Uint8 => write!(f, "Uint8"),
            TokenType::Uint16 => write!(f, "Uint16"),
            TokenType::Uint32 => write!(f, "Uint32"),
            TokenType::Uint64 => write!(f, "Uint64"),
            TokenType::Int8 => write!(f, "Int8"),
            TokenType::Int16 => write!(f, "Int16"),
            TokenType::Int32 => write!(f, "Int32"),
            TokenType::Int64 => write!(f, "Int64"),
            TokenType::Size => write!(f, "Size"),
            TokenType::CStr => write!(f, "CStr"),

            TokenType::HashAssert => write!(f, "#assert"),
            TokenType::HashImplicit => write!(f, "#implicit"),

            TokenType::Plus => write!(f, "+"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Star => write!(f, "*"),
            TokenType::Slash => write!(f, "/"),
            TokenType::Percent => write!(f, "%"),
            TokenType::Ampersand => write!(f, "&"),
            TokenType::Pipe => write!(f, "|"),
            TokenType::Caret => write!(f, "^"),
            TokenType::Tilde => write!(f, "~"),
            TokenType::Bang => write!(f, "!"),
            TokenType::Equal => write!(f, "="),
            TokenType::Less => write!(f, "<"),
            TokenType::Greater => write!(f, ">"),
            TokenType::Dollar => write!(f, "$"),

            TokenType::LeftShift => write!(f, "<<"),
            TokenType::RightShift => write!(f, ">>"),
            TokenType::LessEqual => write!(f, "<="),
            TokenType::GreaterEqual => write!(f, ">="),
            TokenType::EqualEqual => write!(f, "=="),
            TokenType::BangEqual => write!(f, "!="),
            TokenType::AmpersandAmpersand => write!(f, "&&"),
            TokenType::PipePipe => write!(f, "||"),
            TokenType::DotDot => write!(f, ".."),

            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::LeftBracket => write!(f, "["),
            TokenType::RightBracket => write!(f, "]"),
            TokenType::Comma => write!(f, ","),
            TokenType::Colon => write!(f, ":"),

            TokenType::DocComment(s) => write!(f, "/*{s}*/"),
            TokenType::EndOfFile => write!(f, "EOF"),
        }
    }
}

/// A token with location information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, span: SourceSpan) -> Self {
        Self { token_type, span }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self {
            token_type: TokenType::EndOfFile,
            span: SourceSpan::new(location.clone(), location),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.token_type, self.span.start)
    }
}
