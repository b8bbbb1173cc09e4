//! tyshape_ast: The declaration/expression tree consumed by the checker.
//!
//! The tree is produced by a front end outside this workspace and is assumed
//! to be syntactically well-formed. Every type-bearing position holds either
//! an inline shape or a name reference. `AstBuilder` constructs trees with
//! fresh node ids and synthetic spans for hosts without a parser.

pub mod builder;
pub mod node;

pub use builder::AstBuilder;
pub use node::*;
