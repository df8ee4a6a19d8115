//! Resolved Intermediate Representation
//!
//! The IR is the frontend's final product: one entry per declared enum,
//! struct, file and typedef, with every type reference resolved, constant
//! expressions folded, and dynamic expressions retained symbolically.
//! It is immutable once assembled and queryable by name or in source order.

use crate::ast::{AddrDirection, BasicType, EnumValue, Expr, TypeExpr};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use xfile_common::SourceSpan;

/// A byte quantity: statically known, or determined only at decode time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeVal {
    Known(u64),
    Dynamic,
}

impl SizeVal {
    pub fn known(&self) -> Option<u64> {
        match self {
            SizeVal::Known(n) => Some(*n),
            SizeVal::Dynamic => None,
        }
    }
}

impl fmt::Display for SizeVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeVal::Known(n) => write!(f, "{}", n),
            SizeVal::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Array multiplicity of a member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArrayCount {
    /// Not an array
    Scalar,
    /// Folded to a concrete element count
    Fixed(u64),
    /// Count depends on decoded field values; the expression is evaluated
    /// per-instance by the decoding engine
    Dynamic(Expr),
}

/// A fully resolved type; custom references point into the IR table by name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResolvedType {
    Basic(BasicType),
    Pointer(Box<ResolvedType>),
    Enum { name: String },
    Struct { name: String },
    /// Dependent typedef instantiation
    Instance {
        typedef: String,
        args: Vec<ResolvedType>,
    },
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Basic(basic) => write!(f, "{}", basic),
            ResolvedType::Pointer(inner) => write!(f, "{}*", inner),
            ResolvedType::Enum { name } | ResolvedType::Struct { name } => write!(f, "{}", name),
            ResolvedType::Instance { typedef, args } => {
                write!(f, "{}<", typedef)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Resolved address directive magnitude
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AddrVal {
    Known(i64),
    Dynamic(Expr),
}

/// Resolved address directive: relativity flag, direction, magnitude
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrAddr {
    pub cursor_relative: bool,
    pub direction: AddrDirection,
    pub magnitude: AddrVal,
}

/// One resolved member of a struct or file layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrMember {
    pub name: String,
    pub ty: ResolvedType,
    pub count: ArrayCount,
    /// Byte offset from the enclosing scope's start
    pub offset: SizeVal,
    /// Total member size (element size times count)
    pub size: SizeVal,
    pub addr: Option<IrAddr>,
    /// True for members injected from the `#implicit` block
    pub implicit: bool,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrEnumMember {
    pub names: Vec<String>,
    pub value: EnumValue,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrEnum {
    pub name: String,
    pub underlying: BasicType,
    pub members: Vec<IrEnumMember>,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrStruct {
    pub name: String,
    pub members: Vec<IrMember>,
    /// Post-layout invariants, retained unevaluated for the decoding engine
    pub asserts: Vec<Expr>,
    pub size: SizeVal,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrFile {
    pub name: String,
    pub members: Vec<IrMember>,
    pub size: SizeVal,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrTypedefField {
    pub name: String,
    pub type_expr: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrTypedef {
    pub name: String,
    pub params: Vec<String>,
    pub fields: Vec<IrTypedefField>,
    pub doc: Option<String>,
    pub span: SourceSpan,
}

/// A resolved declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IrDecl {
    Enum(IrEnum),
    Struct(IrStruct),
    File(IrFile),
    Typedef(IrTypedef),
}

impl IrDecl {
    pub fn name(&self) -> &str {
        match self {
            IrDecl::Enum(decl) => &decl.name,
            IrDecl::Struct(decl) => &decl.name,
            IrDecl::File(decl) => &decl.name,
            IrDecl::Typedef(decl) => &decl.name,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            IrDecl::Enum(decl) => decl.doc.as_deref(),
            IrDecl::Struct(decl) => decl.doc.as_deref(),
            IrDecl::File(decl) => decl.doc.as_deref(),
            IrDecl::Typedef(decl) => decl.doc.as_deref(),
        }
    }
}

/// The resolved declaration table for one source unit
///
/// Declarations keep source order; lookup by name is O(1).
#[derive(Debug, Clone, Default, Serialize)]
pub struct IrTable {
    decls: Vec<IrDecl>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl IrTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolved declaration; the resolver guarantees name
    /// uniqueness before insertion
    pub fn insert(&mut self, decl: IrDecl) {
        self.index.insert(decl.name().to_string(), self.decls.len());
        self.decls.push(decl);
    }

    /// Look up a declaration by name
    pub fn get(&self, name: &str) -> Option<&IrDecl> {
        self.index.get(name).map(|&i| &self.decls[i])
    }

    /// Iterate declarations in source order
    pub fn iter(&self) -> impl Iterator<Item = &IrDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_type_display() {
        let ty = ResolvedType::Pointer(Box::new(ResolvedType::Pointer(Box::new(
            ResolvedType::Basic(BasicType::Uint8),
        ))));
        assert_eq!(format!("{}", ty), "Uint8**");

        let inst = ResolvedType::Instance {
            typedef: "Slice".to_string(),
            args: vec![ResolvedType::Basic(BasicType::Uint32)],
        };
        assert_eq!(format!("{}", inst), "Slice<Uint32>");
    }

    #[test]
    fn test_table_lookup() {
        let mut table = IrTable::new();
        table.insert(IrDecl::Enum(IrEnum {
            name: "Platform".to_string(),
            underlying: BasicType::Uint16,
            members: Vec::new(),
            doc: None,
            span: SourceSpan::dummy(),
        }));

        assert_eq!(table.len(), 1);
        assert!(table.get("Platform").is_some());
        assert!(table.get("Missing").is_none());
        assert_eq!(table.iter().count(), 1);
    }
}
