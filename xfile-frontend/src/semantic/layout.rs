//! Layout resolution for structs and files
//!
//! Walks members in declaration order, resolving each member's type, array
//! multiplicity and byte address. The running cursor yields append-at-cursor
//! offsets; explicit address directives reposition it. Implicit members are
//! appended after the declared ones. Offsets and sizes stay concrete as long
//! as every quantity folds; one dynamic member makes everything after it
//! dynamic unless an absolute address pins it down again.

use crate::ast::{AddrDirection, AddrDirective, Declaration, StructMember, TypeExpr, TypedefDecl};
use crate::ir::{AddrVal, ArrayCount, IrAddr, IrMember, ResolvedType, SizeVal};
use crate::semantic::errors::SemanticError;
use crate::semantic::eval::{evaluate, Evaluated, Scope, Value};
use crate::semantic::Resolver;
use log::debug;
use std::collections::{HashMap, HashSet};
use xfile_common::SourceSpan;

/// Pointers are stored as Size-width offsets
pub(crate) const POINTER_SIZE: u64 = 8;

/// Resolved member list and total size of one struct or file
#[derive(Debug, Clone)]
pub(crate) struct LayoutInfo {
    pub members: Vec<IrMember>,
    pub size: SizeVal,
}

impl<'a> Resolver<'a> {
    /// Memoized layout computation for a struct or file declaration.
    /// Returns `None` when the layout failed; its errors are recorded once.
    pub(crate) fn layout_for(&mut self, name: &str) -> Option<LayoutInfo> {
        if let Some(cached) = self.layouts.get(name) {
            return cached.clone();
        }

        let decl = self.symbols.lookup(name)?;
        let (declared, implicit) = match decl {
            Declaration::Struct(s) => (&s.members[..], &s.implicits[..]),
            Declaration::File(f) => (&f.members[..], &[][..]),
            _ => return None,
        };

        debug!("computing layout of {}", name);
        self.sizing.push(name.to_string());
        let result = self.compute_layout(declared, implicit);
        self.sizing.pop();

        let info = match result {
            Ok(info) => Some(info),
            Err(errs) => {
                self.record(errs);
                None
            }
        };
        self.layouts.insert(name.to_string(), info.clone());
        info
    }

    fn compute_layout(
        &mut self,
        declared: &[StructMember],
        implicit: &[StructMember],
    ) -> Result<LayoutInfo, Vec<SemanticError>> {
        let mut errors = Vec::new();
        let mut members: Vec<IrMember> = Vec::new();
        let mut in_scope: HashSet<String> = HashSet::new();
        let consts: HashMap<String, i64> = HashMap::new();

        let mut cursor = SizeVal::Known(0);
        let mut extent: u64 = 0;
        let mut all_known = true;

        let all = declared
            .iter()
            .map(|m| (m, false))
            .chain(implicit.iter().map(|m| (m, true)));

        for (member, is_implicit) in all {
            if in_scope.contains(&member.name) {
                errors.push(SemanticError::DuplicateName {
                    name: member.name.clone(),
                    kind: "member",
                    location: member.span.start.clone(),
                });
            }

            let (ty, elem_size) = match self.resolve_member_type(&member.type_expr, &member.span) {
                Ok(pair) => pair,
                Err(errs) => {
                    errors.extend(errs);
                    in_scope.insert(member.name.clone());
                    all_known = false;
                    continue;
                }
            };

            let scope = Scope::new(&in_scope, &consts);

            let count = match &member.array_size {
                None => ArrayCount::Scalar,
                Some(expr) => match evaluate(expr, &scope) {
                    Ok(Evaluated::Const(Value::Int(n))) if n < 0 => {
                        errors.push(SemanticError::InvalidArraySize {
                            count: n,
                            location: expr.span.start.clone(),
                        });
                        ArrayCount::Dynamic(expr.clone())
                    }
                    Ok(Evaluated::Const(Value::Int(n))) => ArrayCount::Fixed(n as u64),
                    Ok(Evaluated::Const(_)) => {
                        errors.push(SemanticError::TypeMismatch {
                            message: "array size must be a single numeric value".to_string(),
                            location: expr.span.start.clone(),
                        });
                        ArrayCount::Dynamic(expr.clone())
                    }
                    Ok(Evaluated::Dynamic) => ArrayCount::Dynamic(expr.clone()),
                    Err(e) => {
                        errors.push(e);
                        ArrayCount::Dynamic(expr.clone())
                    }
                },
            };

            let size = match (elem_size, &count) {
                (SizeVal::Known(es), ArrayCount::Scalar) => SizeVal::Known(es),
                (SizeVal::Known(es), ArrayCount::Fixed(n)) => match es.checked_mul(*n) {
                    Some(total) => SizeVal::Known(total),
                    None => {
                        errors.push(SemanticError::InvalidArraySize {
                            count: *n as i64,
                            location: member.span.start.clone(),
                        });
                        SizeVal::Dynamic
                    }
                },
                _ => SizeVal::Dynamic,
            };

            let (offset, addr) = match &member.addr {
                None => (cursor, None),
                Some(directive) => {
                    let (offset, magnitude) = resolve_addr(directive, cursor, &scope, &mut errors);
                    (
                        offset,
                        Some(IrAddr {
                            cursor_relative: directive.cursor_relative,
                            direction: directive.direction,
                            magnitude,
                        }),
                    )
                }
            };

            cursor = match (offset, size) {
                (SizeVal::Known(o), SizeVal::Known(s)) => SizeVal::Known(o.saturating_add(s)),
                _ => SizeVal::Dynamic,
            };

            match (offset, size) {
                (SizeVal::Known(o), SizeVal::Known(s)) => extent = extent.max(o.saturating_add(s)),
                _ => all_known = false,
            }

            in_scope.insert(member.name.clone());
            members.push(IrMember {
                name: member.name.clone(),
                ty,
                count,
                offset,
                size,
                addr,
                implicit: is_implicit,
                doc: member.doc.clone(),
                span: member.span.clone(),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let size = if all_known {
            SizeVal::Known(extent)
        } else {
            SizeVal::Dynamic
        };

        Ok(LayoutInfo { members, size })
    }

    /// Resolve a member type to its IR form and byte size
    pub(crate) fn resolve_member_type(
        &mut self,
        type_expr: &TypeExpr,
        span: &SourceSpan,
    ) -> Result<(ResolvedType, SizeVal), Vec<SemanticError>> {
        match type_expr {
            TypeExpr::Basic(basic) => Ok((
                ResolvedType::Basic(*basic),
                basic.size_in_bytes().map_or(SizeVal::Dynamic, SizeVal::Known),
            )),

            TypeExpr::Pointer(inner) => {
                // Only the pointee's name is checked; a pointer breaks
                // recursive containment, so no size is computed for it
                let inner_ty = self.resolve_pointee(inner, span)?;
                Ok((
                    ResolvedType::Pointer(Box::new(inner_ty)),
                    SizeVal::Known(POINTER_SIZE),
                ))
            }

            TypeExpr::Custom { name, typeargs } => {
                let decl = match self.symbols.lookup(name) {
                    Some(decl) => decl,
                    None => {
                        return Err(vec![SemanticError::UndefinedType {
                            name: name.clone(),
                            location: span.start.clone(),
                        }]);
                    }
                };

                match decl {
                    Declaration::Enum(e) => {
                        self.check_arity(name, 0, typeargs.len(), span)?;
                        let size = match &e.underlying {
                            TypeExpr::Basic(b) => {
                                b.size_in_bytes().map_or(SizeVal::Dynamic, SizeVal::Known)
                            }
                            _ => SizeVal::Dynamic,
                        };
                        Ok((ResolvedType::Enum { name: name.clone() }, size))
                    }

                    Declaration::Struct(_) => {
                        self.check_arity(name, 0, typeargs.len(), span)?;
                        if self.sizing.iter().any(|n| n == name) {
                            return Err(vec![SemanticError::RecursiveStruct {
                                name: name.clone(),
                                location: span.start.clone(),
                            }]);
                        }
                        let size = self
                            .layout_for(name)
                            .map_or(SizeVal::Dynamic, |info| info.size);
                        Ok((ResolvedType::Struct { name: name.clone() }, size))
                    }

                    Declaration::File(_) => Err(vec![SemanticError::TypeMismatch {
                        message: format!("file layout {} cannot be used as a member type", name),
                        location: span.start.clone(),
                    }]),

                    Declaration::Typedef(td) => {
                        if self.cyclic.contains(name) {
                            return Err(vec![SemanticError::CyclicTypedef {
                                name: name.clone(),
                                location: span.start.clone(),
                            }]);
                        }
                        self.check_arity(name, td.params.len(), typeargs.len(), span)?;

                        let mut errs = Vec::new();
                        let mut args = Vec::new();
                        for arg in typeargs {
                            match self.resolve_member_type(arg, span) {
                                Ok(pair) => args.push(pair),
                                Err(e) => errs.extend(e),
                            }
                        }
                        if !errs.is_empty() {
                            return Err(errs);
                        }

                        let size = self.instance_size(td, &args, span)?;
                        let resolved_args = args.into_iter().map(|(ty, _)| ty).collect();
                        Ok((
                            ResolvedType::Instance {
                                typedef: name.clone(),
                                args: resolved_args,
                            },
                            size,
                        ))
                    }
                }
            }
        }
    }

    /// Resolve a pointee type: names are checked, sizes are not computed
    fn resolve_pointee(
        &mut self,
        type_expr: &TypeExpr,
        span: &SourceSpan,
    ) -> Result<ResolvedType, Vec<SemanticError>> {
        match type_expr {
            TypeExpr::Basic(basic) => Ok(ResolvedType::Basic(*basic)),

            TypeExpr::Pointer(inner) => Ok(ResolvedType::Pointer(Box::new(
                self.resolve_pointee(inner, span)?,
            ))),

            TypeExpr::Custom { name, typeargs } => {
                let decl = match self.symbols.lookup(name) {
                    Some(decl) => decl,
                    None => {
                        return Err(vec![SemanticError::UndefinedType {
                            name: name.clone(),
                            location: span.start.clone(),
                        }]);
                    }
                };

                match decl {
                    Declaration::Enum(_) => {
                        self.check_arity(name, 0, typeargs.len(), span)?;
                        Ok(ResolvedType::Enum { name: name.clone() })
                    }
                    Declaration::Struct(_) => {
                        self.check_arity(name, 0, typeargs.len(), span)?;
                        Ok(ResolvedType::Struct { name: name.clone() })
                    }
                    Declaration::File(_) => Err(vec![SemanticError::TypeMismatch {
                        message: format!("file layout {} cannot be used as a member type", name),
                        location: span.start.clone(),
                    }]),
                    Declaration::Typedef(td) => {
                        if self.cyclic.contains(name) {
                            return Err(vec![SemanticError::CyclicTypedef {
                                name: name.clone(),
                                location: span.start.clone(),
                            }]);
                        }
                        self.check_arity(name, td.params.len(), typeargs.len(), span)?;

                        let mut args = Vec::new();
                        for arg in typeargs {
                            args.push(self.resolve_pointee(arg, span)?);
                        }
                        Ok(ResolvedType::Instance {
                            typedef: name.clone(),
                            args,
                        })
                    }
                }
            }
        }
    }

    fn check_arity(
        &self,
        name: &str,
        expected: usize,
        found: usize,
        span: &SourceSpan,
    ) -> Result<(), Vec<SemanticError>> {
        if expected == found {
            Ok(())
        } else {
            Err(vec![SemanticError::ArityMismatch {
                name: name.to_string(),
                expected,
                found,
                location: span.start.clone(),
            }])
        }
    }

    /// Byte size of a typedef instantiation: the sum of its field sizes
    /// with parameters bound to the supplied arguments. A body field naming
    /// another typedef passes the current arguments through positionally.
    fn instance_size(
        &mut self,
        td: &TypedefDecl,
        args: &[(ResolvedType, SizeVal)],
        span: &SourceSpan,
    ) -> Result<SizeVal, Vec<SemanticError>> {
        let mut total: u64 = 0;
        let mut dynamic = false;

        for field in &td.fields {
            let field_size = match &field.type_expr {
                TypeExpr::Basic(b) => b.size_in_bytes().map_or(SizeVal::Dynamic, SizeVal::Known),

                TypeExpr::Pointer(_) => SizeVal::Known(POINTER_SIZE),

                TypeExpr::Custom { name, .. } => {
                    if let Some(i) = td.params.iter().position(|p| p == name) {
                        args.get(i).map_or(SizeVal::Dynamic, |(_, size)| *size)
                    } else {
                        match self.symbols.lookup(name) {
                            // Missing names are reported when the typedef
                            // declaration itself resolves
                            None => SizeVal::Dynamic,
                            Some(Declaration::Enum(e)) => match &e.underlying {
                                TypeExpr::Basic(b) => {
                                    b.size_in_bytes().map_or(SizeVal::Dynamic, SizeVal::Known)
                                }
                                _ => SizeVal::Dynamic,
                            },
                            Some(Declaration::Struct(_)) => {
                                if self.sizing.iter().any(|n| n == name) {
                                    return Err(vec![SemanticError::RecursiveStruct {
                                        name: name.clone(),
                                        location: span.start.clone(),
                                    }]);
                                }
                                self.layout_for(name).map_or(SizeVal::Dynamic, |info| info.size)
                            }
                            Some(Declaration::File(_)) => SizeVal::Dynamic,
                            Some(Declaration::Typedef(inner)) => {
                                if self.cyclic.contains(name) {
                                    SizeVal::Dynamic
                                } else if inner.params.len() == td.params.len() {
                                    self.instance_size(inner, args, span)?
                                } else {
                                    return Err(vec![SemanticError::ArityMismatch {
                                        name: name.clone(),
                                        expected: inner.params.len(),
                                        found: td.params.len(),
                                        location: span.start.clone(),
                                    }]);
                                }
                            }
                        }
                    }
                }
            };

            match field_size {
                SizeVal::Known(s) => total = total.saturating_add(s),
                SizeVal::Dynamic => dynamic = true,
            }
        }

        Ok(if dynamic {
            SizeVal::Dynamic
        } else {
            SizeVal::Known(total)
        })
    }
}

/// Resolve an address directive against the running cursor
fn resolve_addr(
    directive: &AddrDirective,
    cursor: SizeVal,
    scope: &Scope,
    errors: &mut Vec<SemanticError>,
) -> (SizeVal, AddrVal) {
    match evaluate(&directive.offset, scope) {
        Ok(Evaluated::Const(Value::Int(magnitude))) => {
            let signed = match directive.direction {
                AddrDirection::Forward => magnitude as i128,
                AddrDirection::Backward => -(magnitude as i128),
            };

            let target = if directive.cursor_relative {
                match cursor {
                    SizeVal::Known(c) => Some(c as i128 + signed),
                    SizeVal::Dynamic => None,
                }
            } else {
                Some(signed)
            };

            let offset = match target {
                Some(t) if t < 0 => {
                    errors.push(SemanticError::InvalidAddress {
                        offset: t as i64,
                        location: directive.span.start.clone(),
                    });
                    SizeVal::Dynamic
                }
                Some(t) => SizeVal::Known(t as u64),
                None => SizeVal::Dynamic,
            };

            (offset, AddrVal::Known(magnitude))
        }
        Ok(Evaluated::Const(_)) => {
            errors.push(SemanticError::TypeMismatch {
                message: "address offset must be numeric".to_string(),
                location: directive.span.start.clone(),
            });
            (SizeVal::Dynamic, AddrVal::Dynamic(directive.offset.clone()))
        }
        Ok(Evaluated::Dynamic) => (SizeVal::Dynamic, AddrVal::Dynamic(directive.offset.clone())),
        Err(e) => {
            errors.push(e);
            (SizeVal::Dynamic, AddrVal::Dynamic(directive.offset.clone()))
        }
    }
}
