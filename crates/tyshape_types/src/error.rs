use crate::ty::IndexKeyKind;
use thiserror::Error;
use tyshape_core::TypeId;

/// A shape that violates a construction invariant.
///
/// These are definition errors: the declaration itself is ill-formed,
/// independent of any value checked against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("duplicate property `{name}` in object shape")]
    DuplicateProperty { name: String },

    #[error("a function type needs at least one call signature")]
    NoCallSignatures,

    #[error("property `{property}` is not assignable to the {key} index signature")]
    IndexSignatureViolation {
        property: String,
        property_type: TypeId,
        key: IndexKeyKind,
        value_type: TypeId,
    },
}
