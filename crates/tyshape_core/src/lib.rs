//! tyshape_core: Core handles shared by every stage of the checker.
//!
//! Provides the arena handles for types and tree nodes and the text spans
//! that diagnostics use as their location reference.

pub mod ids;
pub mod text;

pub use ids::{NodeId, TypeId};
pub use text::{TextPos, TextSpan};
