//! The type arena.

use crate::error::DefinitionError;
use crate::flags::TypeFlags;
use crate::ty::{LiteralValue, Number, ObjectShape, PrimitiveKind, Signature, Type, TypeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tyshape_core::TypeId;

/// Stores every type of one checking pass and hands out `TypeId`s.
///
/// Adding a shape that already exists returns the existing id, so id
/// equality implies structural equality for every kind except `AliasRef`,
/// which is only equal by name. Union and intersection members are a set:
/// reordering them yields the same id.
#[derive(Debug)]
pub struct TypeTable {
    types: Vec<Type>,
    interned: FxHashMap<TypeKind, TypeId>,
    // Well-known types
    pub any_type: TypeId,
    pub string_type: TypeId,
    pub number_type: TypeId,
    pub boolean_type: TypeId,
    pub void_type: TypeId,
    pub undefined_type: TypeId,
    pub null_type: TypeId,
    pub never_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::with_capacity(256),
            interned: FxHashMap::default(),
            any_type: TypeId::INVALID,
            string_type: TypeId::INVALID,
            number_type: TypeId::INVALID,
            boolean_type: TypeId::INVALID,
            void_type: TypeId::INVALID,
            undefined_type: TypeId::INVALID,
            null_type: TypeId::INVALID,
            never_type: TypeId::INVALID,
            true_type: TypeId::INVALID,
            false_type: TypeId::INVALID,
        };
        table.any_type = table.primitive(PrimitiveKind::Any);
        table.string_type = table.primitive(PrimitiveKind::String);
        table.number_type = table.primitive(PrimitiveKind::Number);
        table.boolean_type = table.primitive(PrimitiveKind::Boolean);
        table.void_type = table.primitive(PrimitiveKind::Void);
        table.undefined_type = table.primitive(PrimitiveKind::Undefined);
        table.null_type = table.primitive(PrimitiveKind::Null);
        table.never_type = table.primitive(PrimitiveKind::Never);
        table.true_type = table.literal(LiteralValue::Boolean(true));
        table.false_type = table.literal(LiteralValue::Boolean(false));
        table
    }

    fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type {
            id,
            flags: kind.flags(),
            kind: kind.clone(),
        });
        self.interned.insert(kind, id);
        id
    }

    /// Intern a union or intersection under its sorted member list. The
    /// stored node keeps the order of its first construction for printing.
    fn intern_members(&mut self, members: Vec<TypeId>, make: fn(Vec<TypeId>) -> TypeKind) -> TypeId {
        let mut sorted = members.clone();
        sorted.sort_unstable();
        let key = make(sorted);
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        let id = self.intern(make(members));
        self.interned.insert(key, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()].kind
    }

    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.types[id.index()].flags
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    pub fn primitive(&mut self, kind: PrimitiveKind) -> TypeId {
        self.intern(TypeKind::Primitive(kind))
    }

    pub fn literal(&mut self, value: LiteralValue) -> TypeId {
        self.intern(TypeKind::Literal(value))
    }

    pub fn string_literal(&mut self, value: &str) -> TypeId {
        self.literal(LiteralValue::String(value.to_string()))
    }

    pub fn number_literal(&mut self, value: f64) -> TypeId {
        self.literal(LiteralValue::Number(Number(value)))
    }

    pub fn boolean_literal(&mut self, value: bool) -> TypeId {
        if value {
            self.true_type
        } else {
            self.false_type
        }
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.intern(TypeKind::Array(element))
    }

    pub fn tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.intern(TypeKind::Tuple(elements))
    }

    pub fn alias_ref(&mut self, name: &str) -> TypeId {
        self.intern(TypeKind::AliasRef(name.to_string()))
    }

    /// Build a union. Nested unions are flattened, duplicates and `never`
    /// members dropped, and a single remaining member is returned as is.
    /// `any` absorbs the whole union; an empty union is `never`.
    pub fn union(&mut self, members: Vec<TypeId>) -> TypeId {
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match self.kind(member) {
                TypeKind::Union(inner) => flat.extend(inner.iter().copied()),
                _ => flat.push(member),
            }
        }
        if flat.contains(&self.any_type) {
            return self.any_type;
        }
        let never = self.never_type;
        let mut seen = FxHashSet::default();
        let unique: Vec<TypeId> = flat
            .into_iter()
            .filter(|&t| t != never && seen.insert(t))
            .collect();
        match unique.len() {
            0 => self.never_type,
            1 => unique[0],
            _ => self.intern_members(unique, TypeKind::Union),
        }
    }

    /// Build an intersection. Nested intersections are flattened and
    /// duplicates dropped; `never` absorbs, `any` absorbs everything else.
    pub fn intersection(&mut self, members: Vec<TypeId>) -> TypeId {
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match self.kind(member) {
                TypeKind::Intersection(inner) => flat.extend(inner.iter().copied()),
                _ => flat.push(member),
            }
        }
        if flat.contains(&self.never_type) {
            return self.never_type;
        }
        if flat.contains(&self.any_type) {
            return self.any_type;
        }
        let mut seen = FxHashSet::default();
        let unique: Vec<TypeId> = flat.into_iter().filter(|&t| seen.insert(t)).collect();
        match unique.len() {
            0 => self.any_type,
            1 => unique[0],
            _ => self.intern_members(unique, TypeKind::Intersection),
        }
    }

    /// Build an object shape. Property names must be unique.
    ///
    /// Index-signature consistency needs the assignability relation, which
    /// may have to resolve aliases first; see
    /// `ObjectShape::validate_index_signature`.
    pub fn object(&mut self, shape: ObjectShape) -> Result<TypeId, DefinitionError> {
        let mut names = FxHashSet::default();
        for property in &shape.properties {
            if !names.insert(property.name.as_str()) {
                return Err(DefinitionError::DuplicateProperty {
                    name: property.name.clone(),
                });
            }
        }
        Ok(self.intern(TypeKind::Object(shape)))
    }

    pub fn function(&mut self, signatures: Vec<Signature>) -> Result<TypeId, DefinitionError> {
        if signatures.is_empty() {
            return Err(DefinitionError::NoCallSignatures);
        }
        Ok(self.intern(TypeKind::Function(signatures)))
    }

    pub fn constructor(&mut self, signature: Signature) -> TypeId {
        self.intern(TypeKind::Constructor(signature))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Widen literal types to their base primitive, member-wise for unions.
    pub fn widen(&mut self, id: TypeId) -> TypeId {
        match self.kind(id) {
            TypeKind::Literal(value) => {
                let base = value.base();
                self.primitive(base)
            }
            TypeKind::Union(members) => {
                let members = members.clone();
                let widened = members.into_iter().map(|m| self.widen(m)).collect();
                self.union(widened)
            }
            _ => id,
        }
    }

    pub fn is_never(&self, id: TypeId) -> bool {
        id == self.never_type
    }

    pub fn is_any(&self, id: TypeId) -> bool {
        id == self.any_type
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}
