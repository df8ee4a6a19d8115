//! Symbol table and typedef cycle detection
//!
//! Top-level declarations share one namespace regardless of kind. The table
//! keeps the first declaration of a name; later declarations are reported
//! as duplicates and excluded from resolution.

use crate::ast::{Declaration, SourceUnit, TypeExpr, TypedefDecl};
use crate::semantic::errors::SemanticError;
use std::collections::{HashMap, HashSet};

/// Name to declaration mapping for one source unit
pub struct SymbolTable<'a> {
    map: HashMap<&'a str, &'a Declaration>,
}

impl<'a> SymbolTable<'a> {
    /// Build the table, collecting a `DuplicateName` error for every
    /// declaration whose name is already taken
    pub fn build(unit: &'a SourceUnit) -> (Self, Vec<SemanticError>) {
        let mut map: HashMap<&'a str, &'a Declaration> = HashMap::new();
        let mut errors = Vec::new();

        for decl in &unit.decls {
            if map.contains_key(decl.name()) {
                errors.push(SemanticError::DuplicateName {
                    name: decl.name().to_string(),
                    kind: "declaration",
                    location: decl.span().start.clone(),
                });
            } else {
                map.insert(decl.name(), decl);
            }
        }

        (Self { map }, errors)
    }

    /// Look up a declaration by name
    pub fn lookup(&self, name: &str) -> Option<&'a Declaration> {
        self.map.get(name).copied()
    }

    /// Look up a typedef by name
    pub fn typedef(&self, name: &str) -> Option<&'a TypedefDecl> {
        match self.lookup(name) {
            Some(Declaration::Typedef(decl)) => Some(decl),
            _ => None,
        }
    }

    /// True when `decl` is the declaration the table maps its name to
    /// (false for duplicate losers)
    pub fn owns(&self, decl: &'a Declaration) -> bool {
        self.lookup(decl.name())
            .map(|owner| std::ptr::eq(owner, decl))
            .unwrap_or(false)
    }

    /// Detect typedefs that transitively refer back to themselves through
    /// their body fields. Returns the set of cyclic typedef names and one
    /// `CyclicTypedef` error per member of the set.
    pub fn detect_typedef_cycles(&self, unit: &'a SourceUnit) -> (HashSet<String>, Vec<SemanticError>) {
        let mut cyclic = HashSet::new();
        let mut errors = Vec::new();

        for decl in &unit.decls {
            let td = match decl {
                Declaration::Typedef(td) if self.owns(decl) => td,
                _ => continue,
            };

            let mut seen = HashSet::new();
            if self.reaches(td, &td.name, &mut seen) {
                cyclic.insert(td.name.clone());
                errors.push(SemanticError::CyclicTypedef {
                    name: td.name.clone(),
                    location: td.span.start.clone(),
                });
            }
        }

        (cyclic, errors)
    }

    /// Depth-first walk over typedef-to-typedef body references, looking
    /// for `target`. Bound type parameters shadow global names.
    fn reaches(&self, from: &TypedefDecl, target: &str, seen: &mut HashSet<String>) -> bool {
        for field in &from.fields {
            let name = match &field.type_expr {
                TypeExpr::Custom { name, .. } => name,
                _ => continue,
            };

            if from.params.iter().any(|p| p == name) {
                continue;
            }

            if let Some(next) = self.typedef(name) {
                if next.name == target {
                    return true;
                }
                if seen.insert(next.name.clone()) && self.reaches(next, target, seen) {
                    return true;
                }
            }
        }

        false
    }
}
