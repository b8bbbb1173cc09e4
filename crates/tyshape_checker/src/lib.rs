//! tyshape_checker: The structural type-checking core.
//!
//! Resolves declared names through a cycle-safe environment, decides
//! structural assignability, picks overloads by first match, and checks
//! receiver (`this`) requirements at call sites. Every failure becomes a
//! diagnostic and a recovery type; nothing aborts the pass.

mod checker;
mod env;
mod lower;
mod overload;
mod properties;
mod receiver;
mod relation;

pub use checker::{check_program, CheckResult, Checker};
pub use env::{AlreadyDefined, DeclarationKind, Environment, Producer, ResolutionState};
pub use overload::{ArgumentMismatch, CallResolution, Rejection};
pub use properties::PropertyInfo;
pub use receiver::{Receiver, ThisContextError};
pub use relation::{Mismatch, MismatchReason};
