//! Semantic resolution for CrossFile
//!
//! Turns a parsed source unit into the resolved IR table: resolves every
//! type reference, folds constant expressions, computes layouts, and checks
//! structural invariants. Semantic errors are batch-collected per
//! declaration; declarations that resolve cleanly still appear in the IR
//! when others fail.

pub mod errors;
pub mod eval;
pub mod layout;
pub mod symbols;

use crate::ast::{BasicType, Declaration, EnumDecl, EnumValue, FileDecl, SourceUnit, StructDecl,
    TypeExpr, TypedefDecl};
use crate::ir::{IrDecl, IrEnum, IrEnumMember, IrFile, IrStruct, IrTable, IrTypedef,
    IrTypedefField};
use log::debug;
use std::collections::{HashMap, HashSet};
use xfile_common::{CompilerError, Diagnostic, ErrorReporter};

pub use errors::SemanticError;
pub use eval::{evaluate, Evaluated, Scope, Value};
use layout::LayoutInfo;
use symbols::SymbolTable;

/// The outcome of resolving one source unit: the IR for every declaration
/// that resolved, plus all collected errors and warnings
#[derive(Debug)]
pub struct ResolvedUnit {
    pub table: IrTable,
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<Diagnostic>,
}

impl ResolvedUnit {
    /// True when every declaration resolved without semantic errors
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Semantic resolver for one source unit
///
/// Owns the symbol table for the duration of one compilation; resolving
/// independent units in parallel needs no synchronization.
pub struct Resolver<'a> {
    unit: &'a SourceUnit,
    symbols: SymbolTable<'a>,
    /// Typedefs participating in a reference cycle
    cyclic: HashSet<String>,
    /// Memoized struct/file layouts; `None` marks a failed layout
    layouts: HashMap<String, Option<LayoutInfo>>,
    /// Stack of layouts currently being computed, for containment cycles
    sizing: Vec<String>,
    errors: Vec<CompilerError>,
    reporter: ErrorReporter,
}

/// Resolve a parsed source unit into its IR table
pub fn resolve(unit: &SourceUnit) -> ResolvedUnit {
    Resolver::new(unit).run()
}

impl<'a> Resolver<'a> {
    pub fn new(unit: &'a SourceUnit) -> Self {
        let (symbols, duplicate_errors) = SymbolTable::build(unit);
        let (cyclic, cycle_errors) = symbols.detect_typedef_cycles(unit);

        let mut errors: Vec<CompilerError> = Vec::new();
        errors.extend(duplicate_errors.into_iter().map(Into::into));
        errors.extend(cycle_errors.into_iter().map(Into::into));

        Self {
            unit,
            symbols,
            cyclic,
            layouts: HashMap::new(),
            sizing: Vec::new(),
            errors,
            reporter: ErrorReporter::new(),
        }
    }

    /// Resolve every declaration in source order
    pub fn run(mut self) -> ResolvedUnit {
        let mut table = IrTable::new();
        let unit = self.unit;

        for decl in &unit.decls {
            // Duplicate losers were reported when the table was built
            if !self.symbols.owns(decl) {
                continue;
            }

            debug!("resolving {} {}", decl.kind_name(), decl.name());

            let resolved = match decl {
                Declaration::Enum(e) => self.resolve_enum(e).map(IrDecl::Enum),
                Declaration::Struct(s) => self.resolve_struct(s).map(IrDecl::Struct),
                Declaration::File(f) => self.resolve_file(f).map(IrDecl::File),
                Declaration::Typedef(t) => self.resolve_typedef(t).map(IrDecl::Typedef),
            };

            if let Some(ir) = resolved {
                table.insert(ir);
            }
        }

        ResolvedUnit {
            table,
            errors: self.errors,
            warnings: self.reporter.into_diagnostics(),
        }
    }

    /// Record a batch of semantic errors
    pub(crate) fn record(&mut self, errs: Vec<SemanticError>) {
        self.errors.extend(errs.into_iter().map(Into::into));
    }

    fn resolve_enum(&mut self, decl: &EnumDecl) -> Option<IrEnum> {
        let mut errs: Vec<SemanticError> = Vec::new();

        let underlying = match &decl.underlying {
            TypeExpr::Basic(b) if b.is_integer() => Some(*b),
            other => {
                errs.push(SemanticError::TypeMismatch {
                    message: format!(
                        "enum underlying type must be a basic integer type, found {}",
                        other
                    ),
                    location: decl.span.start.clone(),
                });
                None
            }
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let mut members = Vec::new();

        for member in &decl.members {
            for name in &member.names {
                if !seen.insert(name) {
                    errs.push(SemanticError::DuplicateEnumMember {
                        name: name.clone(),
                        location: member.span.start.clone(),
                    });
                }
            }

            if let EnumValue::Range { begin, end } = member.value {
                if begin > end {
                    errs.push(SemanticError::InvalidRange {
                        begin,
                        end,
                        location: member.span.start.clone(),
                    });
                }
            }

            if let Some(b) = underlying {
                let values = match member.value {
                    EnumValue::Num(v) => [Some(v), None],
                    EnumValue::Range { begin, end } => [Some(begin), Some(end)],
                };
                for v in values.into_iter().flatten() {
                    if !value_fits(v, b) {
                        self.reporter.warning(
                            format!("enum value {} does not fit in {}", v, b),
                            member.span.clone(),
                        );
                    }
                }
            }

            members.push(IrEnumMember {
                names: member.names.clone(),
                value: member.value,
                doc: member.doc.clone(),
            });
        }

        match (errs.is_empty(), underlying) {
            (true, Some(underlying)) => Some(IrEnum {
                name: decl.name.clone(),
                underlying,
                members,
                doc: decl.doc.clone(),
                span: decl.span.clone(),
            }),
            _ => {
                self.record(errs);
                None
            }
        }
    }

    fn resolve_struct(&mut self, decl: &StructDecl) -> Option<IrStruct> {
        let info = self.layout_for(&decl.name)?;

        let mut errs: Vec<SemanticError> = Vec::new();
        let field_names: HashSet<String> =
            info.members.iter().map(|m| m.name.clone()).collect();
        let consts: HashMap<String, i64> = HashMap::new();
        let scope = Scope::new(&field_names, &consts);

        // Asserts are retained verbatim; evaluation here only validates the
        // names they reference and their boolean shape
        for assert in &decl.asserts {
            if !assert.is_boolean() {
                errs.push(SemanticError::TypeMismatch {
                    message: "assert must be a boolean expression".to_string(),
                    location: assert.span.start.clone(),
                });
                continue;
            }

            match evaluate(assert, &scope) {
                Ok(Evaluated::Const(Value::Bool(false))) => {
                    self.reporter
                        .warning("assert is always false".to_string(), assert.span.clone());
                }
                Ok(_) => {}
                Err(e) => errs.push(e),
            }
        }

        if !errs.is_empty() {
            self.record(errs);
            return None;
        }

        Some(IrStruct {
            name: decl.name.clone(),
            members: info.members,
            asserts: decl.asserts.clone(),
            size: info.size,
            doc: decl.doc.clone(),
            span: decl.span.clone(),
        })
    }

    fn resolve_file(&mut self, decl: &FileDecl) -> Option<IrFile> {
        let info = self.layout_for(&decl.name)?;

        Some(IrFile {
            name: decl.name.clone(),
            members: info.members,
            size: info.size,
            doc: decl.doc.clone(),
            span: decl.span.clone(),
        })
    }

    fn resolve_typedef(&mut self, decl: &TypedefDecl) -> Option<IrTypedef> {
        // Cycle members were reported up front
        if self.cyclic.contains(&decl.name) {
            return None;
        }

        let mut errs: Vec<SemanticError> = Vec::new();
        let mut used: HashSet<&str> = HashSet::new();
        let mut field_names: HashSet<&str> = HashSet::new();

        for field in &decl.fields {
            if !field_names.insert(&field.name) {
                errs.push(SemanticError::DuplicateName {
                    name: field.name.clone(),
                    kind: "typedef field",
                    location: field.span.start.clone(),
                });
            }

            match &field.type_expr {
                TypeExpr::Basic(_) => {}
                TypeExpr::Custom { name, .. } => {
                    if decl.params.iter().any(|p| p == name) {
                        used.insert(name.as_str());
                    } else {
                        match self.symbols.lookup(name) {
                            None => errs.push(SemanticError::UndefinedType {
                                name: name.clone(),
                                location: field.span.start.clone(),
                            }),
                            Some(Declaration::File(_)) => errs.push(SemanticError::TypeMismatch {
                                message: format!(
                                    "file layout {} cannot be used as a typedef field type",
                                    name
                                ),
                                location: field.span.start.clone(),
                            }),
                            Some(_) => {}
                        }
                    }
                }
                TypeExpr::Pointer(_) => errs.push(SemanticError::TypeMismatch {
                    message: "pointer types are not allowed in typedef bodies".to_string(),
                    location: field.span.start.clone(),
                }),
            }
        }

        for param in &decl.params {
            if !used.contains(param.as_str()) {
                self.reporter.warning(
                    format!("unused type parameter: {}", param),
                    decl.span.clone(),
                );
            }
        }

        if !errs.is_empty() {
            self.record(errs);
            return None;
        }

        Some(IrTypedef {
            name: decl.name.clone(),
            params: decl.params.clone(),
            fields: decl
                .fields
                .iter()
                .map(|f| IrTypedefField {
                    name: f.name.clone(),
                    type_expr: f.type_expr.clone(),
                })
                .collect(),
            doc: decl.doc.clone(),
            span: decl.span.clone(),
        })
    }
}

/// Whether an enum value is representable in the underlying type's width
fn value_fits(value: i64, ty: BasicType) -> bool {
    let bytes = match ty.size_in_bytes() {
        Some(b) => b,
        None => return true,
    };
    let bits = bytes * 8;

    if bits >= 64 {
        return true;
    }

    if ty.is_signed() {
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        value >= min && value <= max
    } else {
        value >= 0 && value < (1i64 << bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn resolve_str(input: &str) -> ResolvedUnit {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().unwrap();
        let mut parser = Parser::new(tokens);
        let unit = parser.parse_source_unit().unwrap();
        resolve(&unit)
    }

    #[test]
    fn test_value_fits() {
        assert!(value_fits(255, BasicType::Uint8));
        assert!(!value_fits(256, BasicType::Uint8));
        assert!(!value_fits(-1, BasicType::Uint8));
        assert!(value_fits(-128, BasicType::Int8));
        assert!(!value_fits(-129, BasicType::Int8));
        assert!(value_fits(i64::MAX, BasicType::Uint64));
        assert!(value_fits(i64::MIN, BasicType::Int64));
    }

    #[test]
    fn test_clean_unit() {
        let resolved = resolve_str("struct S { Uint8 a Uint16 b }");
        assert!(resolved.is_clean());
        assert_eq!(resolved.table.len(), 1);
    }

    #[test]
    fn test_duplicate_name_across_kinds() {
        let resolved = resolve_str("enum Tag : Uint8 { A = 1 } struct Tag { Uint8 x }");
        assert!(!resolved.is_clean());
        // The enum keeps its slot, the struct is excluded
        assert_eq!(resolved.table.len(), 1);
        assert!(matches!(resolved.table.get("Tag"), Some(IrDecl::Enum(_))));
    }

    #[test]
    fn test_unaffected_declarations_still_resolve() {
        let resolved = resolve_str("struct Bad { Missing x } struct Good { Uint8 a }");
        assert!(!resolved.is_clean());
        assert!(resolved.table.get("Bad").is_none());
        assert!(resolved.table.get("Good").is_some());
    }

    #[test]
    fn test_enum_width_warning() {
        let resolved = resolve_str("enum E : Uint8 { Big = 300 }");
        assert!(resolved.is_clean());
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_enum_non_integer_underlying() {
        let resolved = resolve_str("enum E : CStr { A = 1 }");
        assert!(!resolved.is_clean());
        assert!(resolved.table.is_empty());
    }

    #[test]
    fn test_unused_type_parameter_warning() {
        let resolved = resolve_str("typedef Pair<T, U> { first: T }");
        assert!(resolved.is_clean());
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].message.contains("U"));
    }

    #[test]
    fn test_constant_false_assert_warning() {
        let resolved = resolve_str("struct S { Uint8 a #assert { 1 == 2 } }");
        assert!(resolved.is_clean());
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_assert_must_be_boolean() {
        let resolved = resolve_str("struct S { Uint8 a #assert { a + 1 } }");
        assert!(!resolved.is_clean());
    }

    #[test]
    fn test_assert_unknown_name() {
        let resolved = resolve_str("struct S { Uint8 a #assert { missing == 1 } }");
        assert!(!resolved.is_clean());
    }
}
