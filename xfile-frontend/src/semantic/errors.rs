//! Semantic analysis error definitions
//!
//! This module defines all error types that can occur during resolution.
//! Semantic errors are recoverable per-declaration: the resolver collects
//! them and keeps resolving unaffected declarations.

use xfile_common::{CompilerError, SourceLocation};

/// Semantic analysis errors
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticError {
    DuplicateName {
        name: String,
        kind: &'static str,
        location: SourceLocation,
    },
    UndefinedType {
        name: String,
        location: SourceLocation,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        location: SourceLocation,
    },
    CyclicTypedef {
        name: String,
        location: SourceLocation,
    },
    DivideByZero {
        location: SourceLocation,
    },
    TypeMismatch {
        message: String,
        location: SourceLocation,
    },
    InvalidArraySize {
        count: i64,
        location: SourceLocation,
    },
    DuplicateEnumMember {
        name: String,
        location: SourceLocation,
    },
    InvalidRange {
        begin: i64,
        end: i64,
        location: SourceLocation,
    },
    UndefinedName {
        name: String,
        location: SourceLocation,
    },
    InvalidAddress {
        offset: i64,
        location: SourceLocation,
    },
    RecursiveStruct {
        name: String,
        location: SourceLocation,
    },
}

impl From<SemanticError> for CompilerError {
    fn from(err: SemanticError) -> Self {
        match err {
            SemanticError::DuplicateName { name, kind, location } => {
                CompilerError::semantic_error(format!("Duplicate {} name: {name}", kind), location)
            }
            SemanticError::UndefinedType { name, location } => {
                CompilerError::semantic_error(format!("Undefined type: {name}"), location)
            }
            SemanticError::ArityMismatch { name, expected, found, location } => {
                CompilerError::semantic_error(
                    format!("Type {name} expects {expected} type argument{}, found {found}",
                        if expected == 1 { "" } else { "s" }),
                    location,
                )
            }
            SemanticError::CyclicTypedef { name, location } => {
                CompilerError::semantic_error(format!("Cyclic typedef: {name}"), location)
            }
            SemanticError::DivideByZero { location } => {
                CompilerError::semantic_error("Division by zero".to_string(), location)
            }
            SemanticError::TypeMismatch { message, location } => {
                CompilerError::semantic_error(format!("Type mismatch: {message}"), location)
            }
            SemanticError::InvalidArraySize { count, location } => {
                CompilerError::semantic_error(format!("Invalid array size: {count}"), location)
            }
            SemanticError::DuplicateEnumMember { name, location } => {
                CompilerError::semantic_error(format!("Duplicate enum member: {name}"), location)
            }
            SemanticError::InvalidRange { begin, end, location } => {
                CompilerError::semantic_error(
                    format!("Invalid range: {begin}..{end} (begin must not exceed end)"),
                    location,
                )
            }
            SemanticError::UndefinedName { name, location } => {
                CompilerError::semantic_error(format!("Undefined name: {name}"), location)
            }
            SemanticError::InvalidAddress { offset, location } => {
                CompilerError::semantic_error(
                    format!("Address resolves to a negative offset: {offset}"),
                    location,
                )
            }
            SemanticError::RecursiveStruct { name, location } => {
                CompilerError::semantic_error(
                    format!("Struct {name} contains itself without a pointer"),
                    location,
                )
            }
        }
    }
}
