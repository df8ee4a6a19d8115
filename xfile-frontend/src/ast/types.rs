//! Type expressions as written in source
//!
//! A `TypeExpr` is the unresolved spelling of a type: a basic type keyword,
//! a reference to a declared name (optionally with typedef arguments), or a
//! pointer chain. Resolution to declarations happens in the semantic pass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The built-in basic types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasicType {
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
}

impl BasicType {
    /// On-the-wire size in bytes; `None` for types whose extent is only
    /// known at decode time (`CStr`).
    pub fn size_in_bytes(&self) -> Option<u64> {
        match self {
            BasicType::Bool | BasicType::Char | BasicType::Uint8 | BasicType::Int8 => Some(1),
            BasicType::Uint16 | BasicType::Int16 => Some(2),
            BasicType::Uint32 | BasicType::Int32 => Some(4),
            BasicType::Uint64 | BasicType::Int64 | BasicType::Size => Some(8),
            BasicType::CStr => None,
        }
    }

    /// True for types that can underlie an enum
    pub fn is_integer(&self) -> bool {
        !matches!(self, BasicType::Bool | BasicType::CStr)
    }

    /// True for the signed integer types
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            BasicType::Int8 | BasicType::Int16 | BasicType::Int32 | BasicType::Int64
        )
    }

    /// Source spelling of the type name
    pub fn name(&self) -> &'static str {
        match self {
            BasicType::Bool => "Bool",
            BasicType::Char => "Char",
            BasicType::Uint8 => "Uint8",
            BasicType::Uint16 => "Uint16",
            BasicType::Uint32 => "Uint32",
            BasicType::Uint64 => "Uint64",
            BasicType::Int8 => "Int8",
            BasicType::Int16 => "Int16",
            BasicType::Int32 => "Int32",
            BasicType::Int64 => "Int64",
            BasicType::Size => "Size",
            BasicType::CStr => "CStr",
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A type as written in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// One of the built-in basic types
    Basic(BasicType),

    /// Reference to a declared enum, struct or typedef; `typeargs` are
    /// present when instantiating a dependent typedef
    Custom {
        name: String,
        typeargs: Vec<TypeExpr>,
    },

    /// Pointer to another type; nesting is unbounded (`Uint8**`)
    Pointer(Box<TypeExpr>),
}

impl TypeExpr {
    /// Reference to a named type without typedef arguments
    pub fn named(name: &str) -> Self {
        TypeExpr::Custom {
            name: name.to_string(),
            typeargs: Vec::new(),
        }
    }

    /// Pointer nesting depth (0 for non-pointers)
    pub fn pointer_depth(&self) -> usize {
        match self {
            TypeExpr::Pointer(inner) => 1 + inner.pointer_depth(),
            _ => 0,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Basic(basic) => write!(f, "{}", basic),
            TypeExpr::Custom { name, typeargs } => {
                write!(f, "{}", name)?;
                if !typeargs.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in typeargs.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeExpr::Pointer(inner) => write!(f, "{}*", inner),
        }
    }
}
