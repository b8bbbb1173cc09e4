//! tyshape_types: The type representation.
//!
//! Types are stored in a `TypeTable` (type arena) and referenced by `TypeId`.
//! Nodes are immutable once added and are hash-consed, so two structurally
//! identical shapes share one id. Self-reference goes through `AliasRef`
//! cells that name a declaration instead of pointing at it, which keeps the
//! arena free of ownership cycles.

mod error;
mod flags;
mod printer;
mod table;
mod ty;

pub use error::DefinitionError;
pub use flags::TypeFlags;
pub use printer::TypePrinter;
pub use table::TypeTable;
pub use ty::{
    IndexKeyKind, IndexSignature, LiteralValue, Number, ObjectShape, Parameter, PrimitiveKind,
    Property, Signature, Type, TypeKind,
};
