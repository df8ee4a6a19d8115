//! Top-level declaration AST nodes for CrossFile
//!
//! A source unit is a sequence of enum, struct, file and typedef
//! declarations. Names must be unique across the whole unit; that is
//! enforced at resolution time, not here.

use super::expressions::Expr;
use super::types::TypeExpr;
use crate::ast::NodeId;
use serde::{Deserialize, Serialize};
use xfile_common::SourceSpan;

/// A parsed source unit: all declarations in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub decls: Vec<Declaration>,
    pub span: SourceSpan,
}

/// A top-level declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Enum(EnumDecl),
    Struct(StructDecl),
    File(FileDecl),
    Typedef(TypedefDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Enum(decl) => &decl.name,
            Declaration::Struct(decl) => &decl.name,
            Declaration::File(decl) => &decl.name,
            Declaration::Typedef(decl) => &decl.name,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Declaration::Enum(decl) => decl.doc.as_deref(),
            Declaration::Struct(decl) => decl.doc.as_deref(),
            Declaration::File(decl) => decl.doc.as_deref(),
            Declaration::Typedef(decl) => decl.doc.as_deref(),
        }
    }

    pub fn span(&self) -> &SourceSpan {
        match self {
            Declaration::Enum(decl) => &decl.span,
            Declaration::Struct(decl) => &decl.span,
            Declaration::File(decl) => &decl.span,
            Declaration::Typedef(decl) => &decl.span,
        }
    }

    /// Declaration kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Enum(_) => "enum",
            Declaration::Struct(_) => "struct",
            Declaration::File(_) => "file",
            Declaration::Typedef(_) => "typedef",
        }
    }
}

/// `enum Name : Type { A, B = 1 ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub node_id: NodeId,
    pub name: String,
    pub underlying: TypeExpr,
    pub members: Vec<EnumMember>,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

/// One member line; several names may alias the same value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub names: Vec<String>,
    pub value: EnumValue,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

/// An enum member value: a single number or an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumValue {
    Num(i64),
    Range { begin: i64, end: i64 },
}

/// `struct Name { members... #assert {...} #implicit {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub node_id: NodeId,
    pub name: String,
    pub members: Vec<StructMember>,
    pub asserts: Vec<Expr>,
    pub implicits: Vec<StructMember>,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

/// One field: `Type name [count]? (addr)? /* doc */?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructMember {
    pub type_expr: TypeExpr,
    pub name: String,
    pub array_size: Option<Expr>,
    pub addr: Option<AddrDirective>,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

/// Byte-address directive: `(+ 4)`, `($- 2)`, ...
///
/// `$` makes the offset relative to the running cursor instead of the
/// enclosing scope's start; the sign selects direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddrDirective {
    pub cursor_relative: bool,
    pub direction: AddrDirection,
    pub offset: Expr,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddrDirection {
    Forward,
    Backward,
}

/// `file Name { members... }`: a whole-file layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDecl {
    pub node_id: NodeId,
    pub name: String,
    pub members: Vec<StructMember>,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

/// `typedef Name<T, U> { field: T ... }`: a dependent type template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefDecl {
    pub node_id: NodeId,
    pub name: String,
    pub params: Vec<String>,
    pub fields: Vec<TypedefField>,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

/// One typedef body field; the type is a bound parameter or a literal
/// type name, restricted by the grammar to basic types and bare names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefField {
    pub name: String,
    pub type_expr: TypeExpr,
    pub span: SourceSpan,
}
