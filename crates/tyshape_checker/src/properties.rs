//! Property lookup through unions, intersections and aliases.

use crate::checker::Checker;
use tyshape_core::TypeId;
use tyshape_types::{IndexKeyKind, IndexSignature, PrimitiveKind, Property, TypeFlags, TypeKind};

/// A property as seen on some type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyInfo {
    pub ty: TypeId,
    pub optional: bool,
}

impl Checker {
    /// Look up `name` on `ty`.
    ///
    /// A union has only the properties every member has, typed as the union
    /// of the member types. An intersection has every property of every
    /// member. Arrays and tuples have `length` and their numeric positions;
    /// `any` has every property.
    pub fn get_property_of_type(&mut self, ty: TypeId, name: &str) -> Option<PropertyInfo> {
        self.property_of_type_inner(ty, name, 0)
    }

    fn property_of_type_inner(&mut self, ty: TypeId, name: &str, depth: u32) -> Option<PropertyInfo> {
        if depth > self.options.max_relation_depth() {
            return None;
        }
        let ty = self.resolve_alias(ty);
        match self.type_table.kind(ty).clone() {
            TypeKind::Primitive(PrimitiveKind::Any) => Some(PropertyInfo {
                ty,
                optional: false,
            }),
            TypeKind::Object(shape) => {
                if let Some(property) = shape.property(name) {
                    return Some(PropertyInfo {
                        ty: property.ty,
                        optional: property.optional,
                    });
                }
                shape
                    .index
                    .filter(|index| index.key.constrains(name))
                    .map(|index| PropertyInfo {
                        ty: index.value,
                        optional: false,
                    })
            }
            TypeKind::Array(element) => {
                if name == "length" {
                    Some(self.required(self.type_table.number_type))
                } else if IndexKeyKind::Number.constrains(name) {
                    Some(self.required(element))
                } else {
                    None
                }
            }
            TypeKind::Tuple(elements) => {
                if name == "length" {
                    return Some(self.required(self.type_table.number_type));
                }
                let position = name.parse::<usize>().ok()?;
                elements.get(position).map(|&element| self.required(element))
            }
            TypeKind::Union(members) => {
                let mut types = Vec::with_capacity(members.len());
                let mut optional = false;
                for member in members {
                    let info = self.property_of_type_inner(member, name, depth + 1)?;
                    types.push(info.ty);
                    optional |= info.optional;
                }
                Some(PropertyInfo {
                    ty: self.type_table.union(types),
                    optional,
                })
            }
            TypeKind::Intersection(members) => {
                let mut found: Option<PropertyInfo> = None;
                for member in members {
                    let Some(info) = self.property_of_type_inner(member, name, depth + 1) else {
                        continue;
                    };
                    found = Some(match found {
                        None => info,
                        Some(previous) => PropertyInfo {
                            ty: self.intersect_property_types(previous.ty, info.ty),
                            optional: previous.optional && info.optional,
                        },
                    });
                }
                found
            }
            _ => None,
        }
    }

    fn required(&self, ty: TypeId) -> PropertyInfo {
        PropertyInfo { ty, optional: false }
    }

    /// Type of a property declared by several intersection members. When
    /// one type is a subtype of the other the narrower one wins; object
    /// types combine into an intersection; anything else is `never`.
    pub(crate) fn intersect_property_types(&mut self, a: TypeId, b: TypeId) -> TypeId {
        if a == b {
            return a;
        }
        if self.is_assignable(a, b) {
            return a;
        }
        if self.is_assignable(b, a) {
            return b;
        }
        let a_resolved = self.resolve_alias(a);
        let b_resolved = self.resolve_alias(b);
        let object_like = TypeFlags::OBJECT_LIKE | TypeFlags::INTERSECTION;
        if self.type_table.flags(a_resolved).intersects(object_like)
            && self.type_table.flags(b_resolved).intersects(object_like)
        {
            self.type_table.intersection(vec![a, b])
        } else {
            self.type_table.never_type
        }
    }

    /// The declared properties of `ty`, merged across intersection members,
    /// in first-seen order. Index signatures are not expanded.
    pub(crate) fn properties_of_type(&mut self, ty: TypeId) -> Vec<Property> {
        let ty = self.resolve_alias(ty);
        match self.type_table.kind(ty).clone() {
            TypeKind::Object(shape) => shape.properties,
            TypeKind::Array(_) | TypeKind::Tuple(_) => vec![Property {
                name: "length".to_string(),
                ty: self.type_table.number_type,
                optional: false,
            }],
            TypeKind::Intersection(members) => {
                let mut merged: Vec<Property> = Vec::new();
                for member in members {
                    for property in self.properties_of_type(member) {
                        match merged.iter().position(|p| p.name == property.name) {
                            Some(i) => {
                                let previous = merged[i].ty;
                                merged[i].ty = self.intersect_property_types(previous, property.ty);
                                merged[i].optional &= property.optional;
                            }
                            None => merged.push(property),
                        }
                    }
                }
                merged
            }
            _ => Vec::new(),
        }
    }

    /// The index signature `ty` exposes, if any. Arrays and tuples expose a
    /// numeric one over their elements.
    pub(crate) fn index_of_type(&mut self, ty: TypeId) -> Option<IndexSignature> {
        let ty = self.resolve_alias(ty);
        match self.type_table.kind(ty).clone() {
            TypeKind::Object(shape) => shape.index,
            TypeKind::Array(element) => Some(IndexSignature {
                key: IndexKeyKind::Number,
                value: element,
            }),
            TypeKind::Tuple(elements) => Some(IndexSignature {
                key: IndexKeyKind::Number,
                value: self.type_table.union(elements),
            }),
            TypeKind::Intersection(members) => {
                let mut found: Option<IndexSignature> = None;
                for member in members {
                    let Some(index) = self.index_of_type(member) else {
                        continue;
                    };
                    found = Some(match found {
                        None => index,
                        Some(previous) => IndexSignature {
                            key: if previous.key == IndexKeyKind::String || index.key == IndexKeyKind::String {
                                IndexKeyKind::String
                            } else {
                                IndexKeyKind::Number
                            },
                            value: self.intersect_property_types(previous.value, index.value),
                        },
                    });
                }
                found
            }
            _ => None,
        }
    }
}
