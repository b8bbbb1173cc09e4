//! The assignability relation.
//!
//! `is_assignable` answers the question; `explain_assignability` rebuilds
//! the first failing path for diagnostics. Both look through alias cells
//! before applying any rule.

use crate::checker::Checker;
use rustc_hash::FxHashSet;
use tracing::trace;
use tyshape_core::{TextSpan, TypeId};
use tyshape_diagnostics::{messages, Diagnostic, DiagnosticKind};
use tyshape_options::ParameterVariance;
use tyshape_types::{IndexKeyKind, ObjectShape, PrimitiveKind, Signature, TypeFlags, TypeKind};

/// The first failing step of an assignability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub source: TypeId,
    pub target: TypeId,
    /// Property names from the outer pair down to the failing one.
    pub path: Vec<String>,
    pub reason: MismatchReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    NotAssignable {
        source: TypeId,
        target: TypeId,
    },
    MissingProperty {
        name: String,
        source: TypeId,
        target: TypeId,
    },
    /// The source declares the property optional, the target requires it.
    OptionalProperty {
        name: String,
        source: TypeId,
        target: TypeId,
    },
    IndexSignature {
        name: String,
        property_type: TypeId,
        key: IndexKeyKind,
        value: TypeId,
    },
    TupleLength {
        source_len: usize,
        target_len: usize,
    },
}

impl MismatchReason {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            MismatchReason::NotAssignable { .. } | MismatchReason::TupleLength { .. } => {
                DiagnosticKind::TypeMismatch
            }
            MismatchReason::MissingProperty { .. } | MismatchReason::OptionalProperty { .. } => {
                DiagnosticKind::MissingRequiredProperty
            }
            MismatchReason::IndexSignature { .. } => DiagnosticKind::IndexSignatureViolation,
        }
    }
}

impl Mismatch {
    fn new(source: TypeId, target: TypeId, reason: MismatchReason) -> Self {
        Self {
            source,
            target,
            path: Vec::new(),
            reason,
        }
    }

    fn plain(source: TypeId, target: TypeId) -> Self {
        Self::new(source, target, MismatchReason::NotAssignable { source, target })
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.reason.kind()
    }
}

/// Why an object-target comparison failed.
enum ObjectFailure {
    NotObject,
    Missing { name: String },
    Optional { name: String },
    Property { name: String, source: TypeId, target: TypeId },
    Index { name: String, property_type: TypeId, key: IndexKeyKind, value: TypeId },
}

/// Why a tuple-target comparison failed.
enum TupleFailure {
    Length { source_len: usize, target_len: usize },
    Element { position: usize, source: TypeId, target: TypeId },
}

impl Checker {
    // ========================================================================
    // Relation
    // ========================================================================

    /// Whether a value of type `source` may be used where `target` is
    /// expected.
    ///
    /// Memoized on the ordered pair. A pair being decided is cached as
    /// assignable, so a recursive shape that reaches the same pair again
    /// terminates by assumption; if the pair then fails, every `true`
    /// recorded since it started is withdrawn.
    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        if let Some(&result) = self.relation_cache.get(&(source, target)) {
            return result;
        }
        if self.relation_depth >= self.options.max_relation_depth() {
            trace!(?source, ?target, depth = self.relation_depth, "relation depth limit reached");
            return false;
        }

        let log_start = self.relation_log.len();
        self.relation_cache.insert((source, target), true);
        self.relation_depth += 1;
        let result = self.structured_relation(source, target);
        self.relation_depth -= 1;

        if result {
            self.relation_log.push((source, target));
        } else {
            for pair in self.relation_log.drain(log_start..) {
                self.relation_cache.remove(&pair);
            }
            self.relation_cache.insert((source, target), false);
        }
        if self.relation_depth == 0 {
            self.relation_log.clear();
        }
        trace!(?source, ?target, result, "relation");
        result
    }

    fn structured_relation(&mut self, source: TypeId, target: TypeId) -> bool {
        let source = self.resolve_alias(source);
        let target = self.resolve_alias(target);
        if source == target {
            return true;
        }

        let source_flags = self.type_table.flags(source);
        let target_flags = self.type_table.flags(target);
        if target_flags.contains(TypeFlags::ANY)
            || source_flags.contains(TypeFlags::ANY)
            || source_flags.contains(TypeFlags::NEVER)
        {
            return true;
        }
        if target_flags.contains(TypeFlags::NEVER) {
            return false;
        }

        // Clone the shapes to release the table borrow before recursing.
        let source_kind = self.type_table.kind(source).clone();
        let target_kind = self.type_table.kind(target).clone();

        if let TypeKind::Union(members) = &source_kind {
            return members.iter().all(|&m| self.is_assignable(m, target));
        }
        if let TypeKind::Intersection(members) = &target_kind {
            return members.iter().all(|&m| self.is_assignable(source, m));
        }
        if let TypeKind::Union(members) = &target_kind {
            if source == self.type_table.boolean_type
                && members.contains(&self.type_table.true_type)
                && members.contains(&self.type_table.false_type)
            {
                return true;
            }
            return members.iter().any(|&m| self.is_assignable(source, m));
        }
        if let TypeKind::Intersection(members) = &source_kind {
            if members.iter().any(|&m| self.is_assignable(m, target)) {
                return true;
            }
            return match &target_kind {
                TypeKind::Object(shape) => self.compare_objects(source, shape).is_ok(),
                _ => false,
            };
        }

        match (&source_kind, &target_kind) {
            (_, TypeKind::Primitive(PrimitiveKind::Void)) => source_flags.contains(TypeFlags::UNDEFINED),
            (TypeKind::Literal(value), TypeKind::Primitive(kind)) => value.base() == *kind,
            (TypeKind::Tuple(_), TypeKind::Tuple(_)) => self.compare_tuples(source, target).is_ok(),
            (TypeKind::Tuple(elements), TypeKind::Array(element)) => {
                elements.iter().all(|&e| self.is_assignable(e, *element))
            }
            (TypeKind::Array(s), TypeKind::Array(t)) => self.is_assignable(*s, *t),
            (_, TypeKind::Object(shape)) => self.compare_objects(source, shape).is_ok(),
            (TypeKind::Function(sources), TypeKind::Function(targets)) => targets
                .iter()
                .all(|t| sources.iter().any(|s| self.signature_related(s, t))),
            (TypeKind::Constructor(s), TypeKind::Constructor(t)) => self.signature_related(s, t),
            _ => false,
        }
    }

    fn compare_tuples(&mut self, source: TypeId, target: TypeId) -> Result<(), TupleFailure> {
        let (TypeKind::Tuple(sources), TypeKind::Tuple(targets)) =
            (self.type_table.kind(source).clone(), self.type_table.kind(target).clone())
        else {
            return Ok(());
        };
        if sources.len() != targets.len() {
            return Err(TupleFailure::Length {
                source_len: sources.len(),
                target_len: targets.len(),
            });
        }
        for (position, (&s, &t)) in sources.iter().zip(&targets).enumerate() {
            if !self.is_assignable(s, t) {
                return Err(TupleFailure::Element {
                    position,
                    source: s,
                    target: t,
                });
            }
        }
        Ok(())
    }

    /// Structural comparison against an object target. `{}` accepts every
    /// non-nullish source; other targets need an object-like source.
    fn compare_objects(&mut self, source: TypeId, target: &ObjectShape) -> Result<(), ObjectFailure> {
        let source_flags = self.type_table.flags(source);
        if target.is_empty() {
            return if source_flags.intersects(TypeFlags::NULLISH) {
                Err(ObjectFailure::NotObject)
            } else {
                Ok(())
            };
        }
        if !source_flags.intersects(TypeFlags::OBJECT_LIKE | TypeFlags::INTERSECTION) {
            return Err(ObjectFailure::NotObject);
        }

        let source_properties = self.properties_of_type(source);
        for wanted in &target.properties {
            let Some(found) = source_properties.iter().find(|p| p.name == wanted.name) else {
                if wanted.optional {
                    continue;
                }
                return Err(ObjectFailure::Missing {
                    name: wanted.name.clone(),
                });
            };
            if found.optional && !wanted.optional {
                return Err(ObjectFailure::Optional {
                    name: wanted.name.clone(),
                });
            }
            let wanted_ty = if wanted.optional {
                let undefined = self.type_table.undefined_type;
                self.type_table.union(vec![wanted.ty, undefined])
            } else {
                wanted.ty
            };
            if !self.is_assignable(found.ty, wanted_ty) {
                return Err(ObjectFailure::Property {
                    name: wanted.name.clone(),
                    source: found.ty,
                    target: wanted_ty,
                });
            }
        }

        if let Some(index) = target.index {
            for property in &source_properties {
                if index.key.constrains(&property.name) && !self.is_assignable(property.ty, index.value) {
                    return Err(ObjectFailure::Index {
                        name: property.name.clone(),
                        property_type: property.ty,
                        key: index.key,
                        value: index.value,
                    });
                }
            }
            if let Some(source_index) = self.index_of_type(source) {
                if !self.is_assignable(source_index.value, index.value) {
                    return Err(ObjectFailure::Property {
                        name: format!("[key: {}]", source_index.key),
                        source: source_index.value,
                        target: index.value,
                    });
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Signatures
    // ========================================================================

    /// Whether a function with signature `source` may stand in for one with
    /// signature `target`.
    pub(crate) fn signature_related(&mut self, source: &Signature, target: &Signature) -> bool {
        if let (Some(source_this), Some(target_this)) = (source.this_type, target.this_type) {
            if !self.is_assignable(target_this, source_this) {
                return false;
            }
        }

        let variance = self.options.parameter_variance();
        let count = source.params.len().max(target.params.len());
        for position in 0..count {
            let source_param = self.parameter_type_at(source, position);
            let target_param = self.parameter_type_at(target, position);
            match (source_param, target_param) {
                (Some(s), Some(t)) => {
                    let related = match variance {
                        ParameterVariance::Contravariant => self.is_assignable(t, s),
                        ParameterVariance::Bivariant => {
                            self.is_assignable(t, s) || self.is_assignable(s, t)
                        }
                    };
                    if !related {
                        return false;
                    }
                }
                // Callers under the target never supply this argument.
                (Some(_), None) => {
                    let required = source
                        .positional_params()
                        .get(position)
                        .is_some_and(|p| !p.optional);
                    if required {
                        return false;
                    }
                }
                (None, _) => {}
            }
        }

        if target.return_type == self.type_table.void_type {
            return true;
        }
        self.is_assignable(source.return_type, target.return_type)
    }

    /// Whether an overload may be declared over `implementation`. Parameter
    /// and return types only need to be related in one direction, and the
    /// implementation must not require more arguments than the overload
    /// passes.
    pub(crate) fn is_implementation_compatible(
        &mut self,
        implementation: &Signature,
        overload: &Signature,
    ) -> bool {
        if overload.rest_param().is_none() && implementation.min_arity() > overload.params.len() {
            return false;
        }
        for position in 0..overload.params.len() {
            let Some(overload_param) = self.parameter_type_at(overload, position) else {
                continue;
            };
            let Some(implementation_param) = self.parameter_type_at(implementation, position) else {
                return false;
            };
            if !self.is_assignable(overload_param, implementation_param)
                && !self.is_assignable(implementation_param, overload_param)
            {
                return false;
            }
        }
        let void = self.type_table.void_type;
        implementation.return_type == void
            || overload.return_type == void
            || self.is_assignable(implementation.return_type, overload.return_type)
            || self.is_assignable(overload.return_type, implementation.return_type)
    }

    /// Type a caller supplies at `position`: the positional parameter, or
    /// the rest parameter's element type past the positional ones.
    pub(crate) fn parameter_type_at(&mut self, signature: &Signature, position: usize) -> Option<TypeId> {
        let positional = signature.positional_params();
        if let Some(param) = positional.get(position) {
            return Some(param.ty);
        }
        let rest = signature.rest_param()?;
        Some(self.element_type(rest.ty))
    }

    /// Element type of an array-like rest parameter type.
    pub(crate) fn element_type(&mut self, ty: TypeId) -> TypeId {
        let resolved = self.resolve_alias(ty);
        match self.type_table.kind(resolved).clone() {
            TypeKind::Array(element) => element,
            TypeKind::Tuple(elements) => self.type_table.union(elements),
            _ => resolved,
        }
    }

    // ========================================================================
    // Explanation
    // ========================================================================

    /// The first failing step of `source` to `target`, or `None` when the
    /// types are assignable.
    pub fn explain_assignability(&mut self, source: TypeId, target: TypeId) -> Option<Mismatch> {
        if self.is_assignable(source, target) {
            return None;
        }
        let mut visited = FxHashSet::default();
        Some(self.explain(source, target, &mut visited))
    }

    fn explain(
        &mut self,
        source: TypeId,
        target: TypeId,
        visited: &mut FxHashSet<(TypeId, TypeId)>,
    ) -> Mismatch {
        let plain = Mismatch::plain(source, target);
        if visited.len() as u32 >= self.options.max_relation_depth() || !visited.insert((source, target)) {
            return plain;
        }
        let resolved_source = self.resolve_alias(source);
        let resolved_target = self.resolve_alias(target);

        let source_kind = self.type_table.kind(resolved_source).clone();
        if let TypeKind::Union(members) = &source_kind {
            for &member in members {
                if !self.is_assignable(member, target) {
                    let inner = self.explain(member, target, visited);
                    return Mismatch {
                        source,
                        target,
                        path: inner.path,
                        reason: inner.reason,
                    };
                }
            }
            return plain;
        }

        let target_kind = self.type_table.kind(resolved_target).clone();
        if let TypeKind::Intersection(members) = &target_kind {
            for &member in members {
                if !self.is_assignable(source, member) {
                    let inner = self.explain(source, member, visited);
                    return Mismatch {
                        source,
                        target,
                        path: inner.path,
                        reason: inner.reason,
                    };
                }
            }
            return plain;
        }

        match target_kind {
            TypeKind::Object(shape) => match self.compare_objects(resolved_source, &shape) {
                Ok(()) | Err(ObjectFailure::NotObject) => plain,
                Err(ObjectFailure::Missing { name }) => Mismatch::new(
                    source,
                    target,
                    MismatchReason::MissingProperty { name, source, target },
                ),
                Err(ObjectFailure::Optional { name }) => Mismatch::new(
                    source,
                    target,
                    MismatchReason::OptionalProperty { name, source, target },
                ),
                Err(ObjectFailure::Index {
                    name,
                    property_type,
                    key,
                    value,
                }) => Mismatch::new(
                    source,
                    target,
                    MismatchReason::IndexSignature {
                        name,
                        property_type,
                        key,
                        value,
                    },
                ),
                Err(ObjectFailure::Property {
                    name,
                    source: property_source,
                    target: property_target,
                }) => {
                    let inner = self.explain(property_source, property_target, visited);
                    let mut path = vec![name];
                    path.extend(inner.path);
                    Mismatch {
                        source,
                        target,
                        path,
                        reason: inner.reason,
                    }
                }
            },
            TypeKind::Tuple(_) => match self.compare_tuples(resolved_source, resolved_target) {
                Err(TupleFailure::Length {
                    source_len,
                    target_len,
                }) => Mismatch::new(
                    source,
                    target,
                    MismatchReason::TupleLength {
                        source_len,
                        target_len,
                    },
                ),
                Err(TupleFailure::Element {
                    position,
                    source: element_source,
                    target: element_target,
                }) => {
                    let inner = self.explain(element_source, element_target, visited);
                    let mut path = vec![position.to_string()];
                    path.extend(inner.path);
                    Mismatch {
                        source,
                        target,
                        path,
                        reason: inner.reason,
                    }
                }
                Ok(()) => plain,
            },
            _ => plain,
        }
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Check `source` against `target` and report the first failing path
    /// at `span`.
    pub(crate) fn check_type_assignable(&mut self, source: TypeId, target: TypeId, span: TextSpan) -> bool {
        let Some(mismatch) = self.explain_assignability(source, target) else {
            return true;
        };
        let diagnostic = self.mismatch_diagnostic(&mismatch, Some(span));
        self.report(diagnostic);
        false
    }

    /// Render a mismatch. A missing property on the outer pair is reported
    /// directly; anything else is a not-assignable error elaborated with
    /// the property chain and the innermost failure, and takes its kind
    /// from that failure.
    pub fn mismatch_diagnostic(&self, mismatch: &Mismatch, span: Option<TextSpan>) -> Diagnostic {
        let mut detail = self.reason_diagnostic(&mismatch.reason);
        if mismatch.path.is_empty() && matches!(mismatch.reason, MismatchReason::MissingProperty { .. }) {
            detail.span = span;
            return detail.with_types(Some(mismatch.target), Some(mismatch.source));
        }

        let source_text = self.type_to_string(mismatch.source);
        let target_text = self.type_to_string(mismatch.target);
        let mut diagnostic = Diagnostic::new(
            &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
            &[&source_text, &target_text],
        )
        .with_types(Some(mismatch.target), Some(mismatch.source));
        diagnostic.span = span;
        diagnostic.kind = mismatch.kind();

        for name in &mismatch.path {
            diagnostic = diagnostic.with_related(Diagnostic::new(
                &messages::TYPES_OF_PROPERTY_0_ARE_INCOMPATIBLE,
                &[name],
            ));
        }
        let restates_outer = mismatch.reason
            == MismatchReason::NotAssignable {
                source: mismatch.source,
                target: mismatch.target,
            };
        if !restates_outer {
            diagnostic = diagnostic.with_related(detail);
        }
        diagnostic
    }

    fn reason_diagnostic(&self, reason: &MismatchReason) -> Diagnostic {
        match reason {
            MismatchReason::NotAssignable { source, target } => Diagnostic::new(
                &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
                &[&self.type_to_string(*source), &self.type_to_string(*target)],
            ),
            MismatchReason::MissingProperty { name, source, target } => Diagnostic::new(
                &messages::PROPERTY_0_IS_MISSING_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2,
                &[name, &self.type_to_string(*source), &self.type_to_string(*target)],
            ),
            MismatchReason::OptionalProperty { name, source, target } => Diagnostic::new(
                &messages::PROPERTY_0_IS_OPTIONAL_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2,
                &[name, &self.type_to_string(*source), &self.type_to_string(*target)],
            ),
            MismatchReason::IndexSignature {
                name,
                property_type,
                key,
                value,
            } => Diagnostic::new(
                &messages::PROPERTY_0_OF_TYPE_1_IS_NOT_ASSIGNABLE_TO_2_INDEX_TYPE_3,
                &[
                    name,
                    &self.type_to_string(*property_type),
                    &key.to_string(),
                    &self.type_to_string(*value),
                ],
            ),
            MismatchReason::TupleLength {
                source_len,
                target_len,
            } => Diagnostic::new(
                &messages::SOURCE_HAS_0_ELEMENTS_BUT_TARGET_REQUIRES_1,
                &[&source_len.to_string(), &target_len.to_string()],
            ),
        }
    }
}
