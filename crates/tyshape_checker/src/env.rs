//! The symbol environment for type names.
//!
//! Each declared alias or interface owns a cell that moves through three
//! states: unresolved (holding the producer that lowers its definition),
//! resolving, and resolved. Reaching a cell that is still resolving means
//! the definition depends on itself; the driver reports it and fills the
//! cell with `never` so that dependents can finish.

use crate::checker::Checker;
use indexmap::IndexMap;
use tyshape_core::{TextSpan, TypeId};

/// Computes the type of a declared name on first access.
pub type Producer = Box<dyn FnOnce(&mut Checker) -> TypeId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    TypeAlias,
    Interface,
}

/// Observable resolution state of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved(TypeId),
}

enum CellState {
    Unresolved(Producer),
    Resolving,
    Resolved(TypeId),
}

struct NameCell {
    kind: DeclarationKind,
    /// Span of the declaring name, used to anchor cycle diagnostics.
    span: TextSpan,
    state: CellState,
}

/// Result of starting a resolution.
pub(crate) enum Lookup {
    Resolved(TypeId),
    Produce(Producer),
    Cycle {
        kind: DeclarationKind,
        span: TextSpan,
    },
    Unknown,
}

/// Returned by `define` when the name already has a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyDefined {
    pub previous: TextSpan,
}

/// Declared type names of one checking pass, in declaration order.
#[derive(Default)]
pub struct Environment {
    cells: IndexMap<String, NameCell>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` without evaluating its type.
    pub fn define(
        &mut self,
        name: &str,
        kind: DeclarationKind,
        span: TextSpan,
        producer: Producer,
    ) -> Result<(), AlreadyDefined> {
        if let Some(existing) = self.cells.get(name) {
            return Err(AlreadyDefined {
                previous: existing.span,
            });
        }
        self.cells.insert(
            name.to_string(),
            NameCell {
                kind,
                span,
                state: CellState::Unresolved(producer),
            },
        );
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    pub fn state(&self, name: &str) -> Option<ResolutionState> {
        self.cells.get(name).map(|cell| match cell.state {
            CellState::Unresolved(_) => ResolutionState::Unresolved,
            CellState::Resolving => ResolutionState::Resolving,
            CellState::Resolved(id) => ResolutionState::Resolved(id),
        })
    }

    /// Declared names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.cells.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Start resolving `name`. An unresolved cell hands out its producer
    /// and becomes resolving.
    pub(crate) fn begin(&mut self, name: &str) -> Lookup {
        let Some(cell) = self.cells.get_mut(name) else {
            return Lookup::Unknown;
        };
        match std::mem::replace(&mut cell.state, CellState::Resolving) {
            CellState::Unresolved(producer) => Lookup::Produce(producer),
            CellState::Resolving => Lookup::Cycle {
                kind: cell.kind,
                span: cell.span,
            },
            CellState::Resolved(id) => {
                cell.state = CellState::Resolved(id);
                Lookup::Resolved(id)
            }
        }
    }

    /// Complete a resolution started by `begin`. A cell that was already
    /// filled during production (the cycle recovery value) keeps that value.
    pub(crate) fn finish(&mut self, name: &str, ty: TypeId) -> TypeId {
        let Some(cell) = self.cells.get_mut(name) else {
            return ty;
        };
        match cell.state {
            CellState::Resolved(existing) => existing,
            _ => {
                cell.state = CellState::Resolved(ty);
                ty
            }
        }
    }

    /// Fill a cell caught in a cycle with the recovery type.
    pub(crate) fn fill(&mut self, name: &str, ty: TypeId) {
        if let Some(cell) = self.cells.get_mut(name) {
            cell.state = CellState::Resolved(ty);
        }
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.cells.keys().collect::<Vec<_>>())
            .finish()
    }
}
