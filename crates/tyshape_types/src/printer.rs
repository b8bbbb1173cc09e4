//! Type-to-string rendering for diagnostics.

use crate::table::TypeTable;
use crate::ty::{ObjectShape, Signature, TypeKind};
use tyshape_core::TypeId;

/// Default nesting bound past which rendering elides with `...`.
pub const DEFAULT_MAX_DEPTH: u32 = 20;

/// Renders types in TypeScript surface syntax.
///
/// Alias references print their name, so recursive shapes always render
/// finitely; the depth bound only guards very deep anonymous nesting.
pub struct TypePrinter<'a> {
    table: &'a TypeTable,
    max_depth: u32,
}

impl<'a> TypePrinter<'a> {
    pub fn new(table: &'a TypeTable) -> Self {
        Self {
            table,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(table: &'a TypeTable, max_depth: u32) -> Self {
        Self { table, max_depth }
    }

    pub fn print(&self, id: TypeId) -> String {
        self.print_inner(id, 0)
    }

    /// Render one signature in arrow form, as overload listings show it.
    pub fn signature(&self, signature: &Signature) -> String {
        self.print_signature(signature, " => ", 0)
    }

    fn print_inner(&self, id: TypeId, depth: u32) -> String {
        if depth > self.max_depth {
            return "...".to_string();
        }
        match self.table.kind(id) {
            TypeKind::Primitive(kind) => kind.name().to_string(),
            TypeKind::Literal(value) => value.to_string(),
            TypeKind::AliasRef(name) => name.clone(),
            TypeKind::Array(element) => {
                let inner = self.print_inner(*element, depth + 1);
                if self.needs_parens_as_element(*element) {
                    format!("({})[]", inner)
                } else {
                    format!("{}[]", inner)
                }
            }
            TypeKind::Tuple(elements) => {
                format!("[{}]", self.join(elements, ", ", depth))
            }
            TypeKind::Union(members) => self.join(members, " | ", depth),
            TypeKind::Intersection(members) => members
                .iter()
                .map(|&m| {
                    let s = self.print_inner(m, depth + 1);
                    if matches!(self.table.kind(m), TypeKind::Union(_)) {
                        format!("({})", s)
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TypeKind::Object(shape) => self.print_object(shape, depth),
            TypeKind::Function(signatures) => {
                if signatures.len() == 1 {
                    self.print_signature(&signatures[0], " => ", depth)
                } else {
                    let sigs = signatures
                        .iter()
                        .map(|s| self.print_signature(s, ": ", depth))
                        .collect::<Vec<_>>()
                        .join("; ");
                    format!("{{ {}; }}", sigs)
                }
            }
            TypeKind::Constructor(signature) => {
                format!("new {}", self.print_signature(signature, " => ", depth))
            }
        }
    }

    fn join(&self, ids: &[TypeId], sep: &str, depth: u32) -> String {
        ids.iter()
            .map(|&t| self.print_inner(t, depth + 1))
            .collect::<Vec<_>>()
            .join(sep)
    }

    fn needs_parens_as_element(&self, id: TypeId) -> bool {
        matches!(
            self.table.kind(id),
            TypeKind::Union(_) | TypeKind::Intersection(_) | TypeKind::Function(_) | TypeKind::Constructor(_)
        )
    }

    fn print_object(&self, shape: &ObjectShape, depth: u32) -> String {
        if shape.is_empty() {
            return "{}".to_string();
        }
        let mut members: Vec<String> = shape
            .properties
            .iter()
            .map(|p| {
                let q = if p.optional { "?" } else { "" };
                format!("{}{}: {}", p.name, q, self.print_inner(p.ty, depth + 1))
            })
            .collect();
        if let Some(index) = shape.index {
            members.push(format!(
                "[key: {}]: {}",
                index.key,
                self.print_inner(index.value, depth + 1)
            ));
        }
        format!("{{ {}; }}", members.join("; "))
    }

    fn print_signature(&self, signature: &Signature, arrow: &str, depth: u32) -> String {
        let mut params = Vec::with_capacity(signature.params.len() + 1);
        if let Some(this_type) = signature.this_type {
            params.push(format!("this: {}", self.print_inner(this_type, depth + 1)));
        }
        for p in &signature.params {
            let dots = if p.rest { "..." } else { "" };
            let q = if p.optional { "?" } else { "" };
            params.push(format!(
                "{}{}{}: {}",
                dots,
                p.name,
                q,
                self.print_inner(p.ty, depth + 1)
            ));
        }
        format!(
            "({}){}{}",
            params.join(", "),
            arrow,
            self.print_inner(signature.return_type, depth + 1)
        )
    }
}
