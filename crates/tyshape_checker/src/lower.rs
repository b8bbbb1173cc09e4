//! Lowering of type nodes into the arena.

use crate::checker::{BaseConflict, Checker};
use tyshape_ast::node::*;
use tyshape_core::{TextSpan, TypeId};
use tyshape_diagnostics::messages;
use tyshape_types::{
    IndexKeyKind, IndexSignature, ObjectShape, Parameter, PrimitiveKind, Property, Signature, TypeKind,
};

/// Whether name references are resolved while lowering.
///
/// Union, intersection, array and tuple members of an alias body are
/// resolved immediately so that a name defined through them reports its
/// cycle. Property and signature positions only name the declaration and
/// are resolved when a relation first looks through them, which is what
/// lets `type List = { next: List | undefined }` stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LowerMode {
    Eager,
    Deferred,
}

impl Checker {
    pub(crate) fn lower_type(&mut self, node: &TypeNode, mode: LowerMode) -> TypeId {
        match &node.kind {
            TypeNodeKind::Keyword(keyword) => self.keyword_type(*keyword),
            TypeNodeKind::Literal(literal) => self.literal_type(literal),
            TypeNodeKind::Reference(name) => self.lower_reference(name, mode),
            TypeNodeKind::Array(element) => {
                let element = self.lower_type(element, mode);
                self.type_table.array(element)
            }
            TypeNodeKind::Tuple(elements) => {
                let elements = elements.iter().map(|e| self.lower_type(e, mode)).collect();
                self.type_table.tuple(elements)
            }
            TypeNodeKind::Union(members) => {
                let members = members.iter().map(|m| self.lower_type(m, mode)).collect();
                self.type_table.union(members)
            }
            TypeNodeKind::Intersection(members) => {
                let members = members.iter().map(|m| self.lower_type(m, mode)).collect();
                self.type_table.intersection(members)
            }
            TypeNodeKind::Object(object) => self.lower_object(object, Vec::new(), None, node.data.span),
            TypeNodeKind::Function(signature) => {
                let signature = self.lower_signature(signature);
                self.function_type(vec![signature], node.data.span)
            }
            TypeNodeKind::Constructor(signature) => {
                let signature = self.lower_signature(signature);
                self.type_table.constructor(signature)
            }
        }
    }

    fn keyword_type(&mut self, keyword: KeywordType) -> TypeId {
        let kind = match keyword {
            KeywordType::String => PrimitiveKind::String,
            KeywordType::Number => PrimitiveKind::Number,
            KeywordType::Boolean => PrimitiveKind::Boolean,
            KeywordType::Undefined => PrimitiveKind::Undefined,
            KeywordType::Null => PrimitiveKind::Null,
            KeywordType::Any => PrimitiveKind::Any,
            KeywordType::Never => PrimitiveKind::Never,
            KeywordType::Void => PrimitiveKind::Void,
        };
        self.type_table.primitive(kind)
    }

    pub(crate) fn literal_type(&mut self, literal: &Literal) -> TypeId {
        match literal {
            Literal::String(value) => self.type_table.string_literal(value),
            Literal::Number(value) => self.type_table.number_literal(*value),
            Literal::Boolean(value) => self.type_table.boolean_literal(*value),
        }
    }

    /// A reference lowers to an alias cell named after the declaration, so
    /// messages print the name. Unknown names report and become `any`.
    fn lower_reference(&mut self, name: &Identifier, mode: LowerMode) -> TypeId {
        if !self.env.is_defined(&name.text) {
            self.error(name.data.span, &messages::CANNOT_FIND_NAME_0, &[&name.text]);
            return self.type_table.any_type;
        }
        if mode == LowerMode::Eager {
            self.resolve_name(&name.text);
        }
        self.type_table.alias_ref(&name.text)
    }

    /// Lower an object body on top of `inherited` properties. Own members
    /// replace inherited ones of the same name; repeated own members are
    /// reported and the first one kept.
    fn lower_object(
        &mut self,
        object: &ObjectTypeNode,
        inherited: Vec<Property>,
        inherited_index: Option<IndexSignature>,
        span: TextSpan,
    ) -> TypeId {
        let mut shape = ObjectShape {
            properties: inherited,
            index: inherited_index,
        };
        let own_start = shape.properties.len();
        for member in &object.members {
            let ty = self.lower_type(&member.type_node, LowerMode::Deferred);
            let property = Property {
                name: member.name.text.clone(),
                ty,
                optional: member.optional,
            };
            let existing = shape.properties.iter().position(|p| p.name == property.name);
            match existing {
                Some(i) if i >= own_start => {
                    self.error(
                        member.name.data.span,
                        &messages::DUPLICATE_IDENTIFIER_0,
                        &[&member.name.text],
                    );
                }
                Some(i) => shape.properties[i] = property,
                None => shape.properties.push(property),
            }
        }
        if let Some(index) = &object.index {
            let value = self.lower_type(&index.type_node, LowerMode::Deferred);
            let key = match index.key {
                IndexKey::String => IndexKeyKind::String,
                IndexKey::Number => IndexKeyKind::Number,
            };
            shape.index = Some(IndexSignature { key, value });
        }
        let has_index = shape.index.is_some();
        match self.type_table.object(shape) {
            Ok(id) => {
                if has_index {
                    self.defer_index_check(id, span);
                }
                id
            }
            Err(err) => {
                self.report_definition_error(err, span);
                self.type_table.never_type
            }
        }
    }

    /// An interface is its own members over the merged members of its
    /// bases. Bases are resolved eagerly, so `interface A extends A` is a
    /// cycle. Merging is purely structural: base property types are only
    /// compared once every name is resolved.
    pub(crate) fn lower_interface(&mut self, decl: &InterfaceDeclaration) -> TypeId {
        let mut inherited: Vec<(Property, TypeId)> = Vec::new();
        let mut inherited_index = None;
        for base in &decl.extends {
            if !self.env.is_defined(&base.text) {
                self.error(base.data.span, &messages::CANNOT_FIND_NAME_0, &[&base.text]);
                continue;
            }
            let owner = self.type_table.alias_ref(&base.text);
            let resolved = self.resolve_alias(owner);
            if self.type_table.is_never(resolved) {
                continue;
            }
            let mut shape = ObjectShape::default();
            if !self.collect_base_members(resolved, &mut shape) {
                self.error(base.data.span, &messages::AN_INTERFACE_CAN_ONLY_EXTEND_AN_OBJECT_TYPE, &[]);
                continue;
            }
            for property in shape.properties {
                match inherited.iter_mut().find(|(p, _)| p.name == property.name) {
                    Some((existing, existing_owner)) => {
                        if existing.ty != property.ty {
                            self.defer_base_conflict(BaseConflict {
                                interface: decl.name.text.clone(),
                                span: decl.name.data.span,
                                property: property.name.clone(),
                                first: (*existing_owner, existing.ty),
                                second: (owner, property.ty),
                            });
                            existing.ty = self.type_table.intersection(vec![existing.ty, property.ty]);
                        }
                        existing.optional &= property.optional;
                    }
                    None => inherited.push((property, owner)),
                }
            }
            if inherited_index.is_none() {
                inherited_index = shape.index;
            }
        }
        let inherited = inherited.into_iter().map(|(property, _)| property).collect();
        self.lower_object(&decl.body, inherited, inherited_index, decl.name.data.span)
    }

    /// Lower a signature. Every position inside is deferred.
    pub(crate) fn lower_signature(&mut self, node: &SignatureNode) -> Signature {
        let this_type = node
            .this_type
            .as_ref()
            .map(|t| self.lower_type(t, LowerMode::Deferred));
        let params = node
            .parameters
            .iter()
            .map(|p| Parameter {
                name: p.name.text.clone(),
                ty: self.lower_type(&p.type_node, LowerMode::Deferred),
                optional: p.optional,
                rest: p.rest,
            })
            .collect();
        let return_type = self.lower_type(&node.return_type, LowerMode::Deferred);
        Signature {
            this_type,
            params,
            return_type,
        }
    }

    /// Collect the members an interface base contributes. Intersection
    /// members are walked recursively and same-named properties meet in an
    /// intersection. Returns `false` for anything that is not object-like.
    fn collect_base_members(&mut self, ty: TypeId, shape: &mut ObjectShape) -> bool {
        match self.type_table.kind(ty).clone() {
            TypeKind::Object(object) => {
                for property in object.properties {
                    match shape.properties.iter_mut().find(|p| p.name == property.name) {
                        Some(existing) => {
                            existing.ty = self.type_table.intersection(vec![existing.ty, property.ty]);
                            existing.optional &= property.optional;
                        }
                        None => shape.properties.push(property),
                    }
                }
                if shape.index.is_none() {
                    shape.index = object.index;
                }
                true
            }
            TypeKind::Intersection(members) => {
                for member in members {
                    let member = self.resolve_alias(member);
                    if self.type_table.is_never(member) {
                        continue;
                    }
                    if !self.collect_base_members(member, shape) {
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }
}
