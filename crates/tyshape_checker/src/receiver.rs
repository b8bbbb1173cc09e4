//! The `this` context of an invocation.
//!
//! Whether a call binds a receiver is a property of the call site, so it is
//! checked here against the chosen signature instead of being folded into
//! the function relation.

use crate::checker::Checker;
use tyshape_core::{TextSpan, TypeId};
use tyshape_diagnostics::{messages, Diagnostic};
use tyshape_types::{Signature, TypeKind};

/// The receiver an invocation supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// The function value is invoked bare, e.g. after being passed around.
    Unbound,
    /// An explicit or member-access receiver of this type.
    Bound(TypeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisContextError {
    /// The signature declares a receiver but the call binds none.
    Unbound { expected: TypeId },
    NotAssignable { receiver: TypeId, expected: TypeId },
}

impl ThisContextError {
    pub fn expected(&self) -> TypeId {
        match *self {
            ThisContextError::Unbound { expected } | ThisContextError::NotAssignable { expected, .. } => {
                expected
            }
        }
    }
}

impl Checker {
    /// Check `receiver` against the receiver `signature` declares. A
    /// signature without one accepts every invocation.
    pub fn check_invocation(
        &mut self,
        signature: &Signature,
        receiver: Receiver,
    ) -> Result<(), ThisContextError> {
        let Some(expected) = signature.this_type else {
            return Ok(());
        };
        match receiver {
            Receiver::Unbound => Err(ThisContextError::Unbound { expected }),
            Receiver::Bound(actual) if self.is_assignable(actual, expected) => Ok(()),
            Receiver::Bound(actual) => Err(ThisContextError::NotAssignable {
                receiver: actual,
                expected,
            }),
        }
    }

    /// Check an invocation of a function-typed value. Any one of its
    /// signatures accepting the receiver is enough; otherwise the first
    /// signature's failure is returned. Values that are not functions have
    /// no receiver requirement.
    pub fn check_function_invocation(
        &mut self,
        function: TypeId,
        receiver: Receiver,
    ) -> Result<(), ThisContextError> {
        let function = self.resolve_alias(function);
        let TypeKind::Function(signatures) = self.type_table.kind(function).clone() else {
            return Ok(());
        };
        let mut first_error = None;
        for signature in &signatures {
            match self.check_invocation(signature, receiver) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub(crate) fn report_this_context(&mut self, err: ThisContextError, span: TextSpan) {
        let (receiver_text, actual) = match err {
            ThisContextError::Unbound { .. } => ("void".to_string(), None),
            ThisContextError::NotAssignable { receiver, .. } => (self.type_to_string(receiver), Some(receiver)),
        };
        let expected_text = self.type_to_string(err.expected());
        self.report(
            Diagnostic::at(
                span,
                &messages::THE_THIS_CONTEXT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_METHOD_S_THIS_OF_TYPE_1,
                &[&receiver_text, &expected_text],
            )
            .with_types(Some(err.expected()), actual),
        );
    }
}
