//! Parse error types for the CrossFile parser
//!
//! This module defines all error types that can occur during parsing.

use crate::lexer::Token;
use xfile_common::{CompilerError, SourceLocation};

/// Parse error types specific to the parser
#[derive(Debug, Clone)]
pub enum ParseError {
    UnexpectedToken {
        expected: String,
        found: Token,
    },
    UnexpectedEndOfFile {
        expected: String,
        location: SourceLocation,
    },
    DanglingDocComment {
        location: SourceLocation,
    },
    MixedArrayLiteral {
        location: SourceLocation,
    },
}

impl From<ParseError> for CompilerError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnexpectedToken { expected, found } => CompilerError::parse_error(
                format!("Expected {}, found {}", expected, found.token_type),
                found.span.start,
            ),
            ParseError::UnexpectedEndOfFile { expected, location } => CompilerError::parse_error(
                format!("Unexpected end of file, expected {}", expected),
                location,
            ),
            ParseError::DanglingDocComment { location } => CompilerError::parse_error(
                "Doc comment is not attached to a declaration".to_string(),
                location,
            ),
            ParseError::MixedArrayLiteral { location } => CompilerError::parse_error(
                "Array literal elements must all be chars, all numbers, or all strings"
                    .to_string(),
                location,
            ),
        }
    }
}
