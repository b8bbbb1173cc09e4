//! Overload resolution and call checking.

use crate::checker::Checker;
use crate::receiver::Receiver;
use tracing::{debug, trace};
use tyshape_ast::node::{CallExpression, Expression, ExpressionKind, NewExpression};
use tyshape_core::{TextSpan, TypeId};
use tyshape_diagnostics::{messages, Diagnostic};
use tyshape_types::{Signature, TypeKind};

/// Outcome of resolving a call against an ordered signature list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResolution {
    /// Index of the first signature that accepts the arguments.
    Matched(usize),
    /// Every signature rejected the call; one entry per signature, in order.
    NoMatch(Vec<Rejection>),
}

impl CallResolution {
    pub fn matched(&self) -> Option<usize> {
        match self {
            CallResolution::Matched(index) => Some(*index),
            CallResolution::NoMatch(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub index: usize,
    pub mismatch: ArgumentMismatch,
}

/// The first reason a signature did not accept a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentMismatch {
    Arity {
        expected_min: usize,
        /// `None` when a rest parameter takes any number of arguments.
        expected_max: Option<usize>,
        actual: usize,
    },
    Argument {
        index: usize,
        argument: TypeId,
        parameter: TypeId,
    },
}

impl Checker {
    /// Pick the first signature, in declaration order, whose parameters
    /// accept `arguments`.
    ///
    /// Arguments past the positional parameters are collected into one
    /// array that must be assignable to the rest parameter.
    pub fn resolve_call(&mut self, signatures: &[Signature], arguments: &[TypeId]) -> CallResolution {
        let mut rejections = Vec::with_capacity(signatures.len());
        for (index, signature) in signatures.iter().enumerate() {
            match self.match_signature(signature, arguments) {
                Ok(()) => {
                    trace!(index, "overload matched");
                    return CallResolution::Matched(index);
                }
                Err(mismatch) => rejections.push(Rejection { index, mismatch }),
            }
        }
        debug!(signatures = signatures.len(), "no overload matched");
        CallResolution::NoMatch(rejections)
    }

    fn match_signature(&mut self, signature: &Signature, arguments: &[TypeId]) -> Result<(), ArgumentMismatch> {
        if !signature.accepts_arity(arguments.len()) {
            return Err(ArgumentMismatch::Arity {
                expected_min: signature.min_arity(),
                expected_max: signature.max_arity(),
                actual: arguments.len(),
            });
        }
        let positional = signature.positional_params();
        for (index, (param, &argument)) in positional.iter().zip(arguments).enumerate() {
            let parameter = if param.optional {
                let undefined = self.type_table.undefined_type;
                self.type_table.union(vec![param.ty, undefined])
            } else {
                param.ty
            };
            if !self.is_assignable(argument, parameter) {
                return Err(ArgumentMismatch::Argument {
                    index,
                    argument,
                    parameter,
                });
            }
        }
        if let Some(rest) = signature.rest_param() {
            if arguments.len() > positional.len() {
                let trailing = arguments[positional.len()..].to_vec();
                let element = self.type_table.union(trailing);
                let collected = self.type_table.array(element);
                if !self.is_assignable(collected, rest.ty) {
                    return Err(ArgumentMismatch::Argument {
                        index: positional.len(),
                        argument: collected,
                        parameter: rest.ty,
                    });
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Call sites
    // ========================================================================

    /// A method call binds the accessed object as its receiver; an explicit
    /// receiver wins; a bare call binds nothing.
    pub(crate) fn check_call_expression(&mut self, call: &CallExpression, span: TextSpan) -> TypeId {
        let callee_type = self.check_expression(&call.callee);
        let receiver = match (&call.receiver, &call.callee.kind) {
            (Some(explicit), _) => Receiver::Bound(self.check_expression(explicit)),
            (None, ExpressionKind::PropertyAccess(access)) => {
                let object = self.expression_type(access.object.data.id);
                Receiver::Bound(object.unwrap_or(self.type_table.any_type))
            }
            (None, _) => Receiver::Unbound,
        };
        let arguments = self.check_arguments(&call.arguments);

        let callee = self.resolve_alias(callee_type);
        if self.type_table.is_any(callee) || self.type_table.is_never(callee) {
            return callee;
        }
        let TypeKind::Function(signatures) = self.type_table.kind(callee).clone() else {
            let callee_text = self.type_to_string(callee_type);
            self.report(
                Diagnostic::at(call.callee.data.span, &messages::THIS_EXPRESSION_IS_NOT_CALLABLE, &[&callee_text])
                    .with_types(None, Some(callee_type)),
            );
            return self.type_table.never_type;
        };

        match self.resolve_call(&signatures, &arguments) {
            CallResolution::Matched(index) => {
                let signature = &signatures[index];
                match self.check_invocation(signature, receiver) {
                    Ok(()) => signature.return_type,
                    Err(err) => {
                        self.report_this_context(err, span);
                        self.type_table.never_type
                    }
                }
            }
            CallResolution::NoMatch(rejections) => {
                self.report_no_matching_overload(&signatures, &rejections, span);
                self.type_table.never_type
            }
        }
    }

    pub(crate) fn check_new_expression(&mut self, new: &NewExpression, span: TextSpan) -> TypeId {
        let callee_type = self.check_expression(&new.callee);
        let arguments = self.check_arguments(&new.arguments);

        let callee = self.resolve_alias(callee_type);
        if self.type_table.is_any(callee) || self.type_table.is_never(callee) {
            return callee;
        }
        let TypeKind::Constructor(signature) = self.type_table.kind(callee).clone() else {
            let callee_text = self.type_to_string(callee_type);
            self.report(
                Diagnostic::at(new.callee.data.span, &messages::THIS_EXPRESSION_IS_NOT_CONSTRUCTABLE, &[&callee_text])
                    .with_types(None, Some(callee_type)),
            );
            return self.type_table.never_type;
        };

        let signatures = [signature];
        match self.resolve_call(&signatures, &arguments) {
            CallResolution::Matched(_) => signatures[0].return_type,
            CallResolution::NoMatch(rejections) => {
                self.report_no_matching_overload(&signatures, &rejections, span);
                self.type_table.never_type
            }
        }
    }

    /// Arguments keep their literal types so literal-typed parameters can
    /// select an overload.
    fn check_arguments(&mut self, arguments: &[Expression]) -> Vec<TypeId> {
        arguments.iter().map(|arg| self.check_expression(arg)).collect()
    }

    /// One signature reports its mismatch directly. Several report a single
    /// error listing each rejected overload with its first failure.
    fn report_no_matching_overload(&mut self, signatures: &[Signature], rejections: &[Rejection], span: TextSpan) {
        if let [rejection] = rejections {
            if signatures.len() == 1 {
                let mut diagnostic = self.argument_mismatch_diagnostic(&rejection.mismatch);
                diagnostic.span = Some(span);
                self.report(diagnostic);
                return;
            }
        }
        let mut diagnostic = Diagnostic::at(span, &messages::NO_OVERLOAD_MATCHES_THIS_CALL, &[]);
        let total = signatures.len().to_string();
        for rejection in rejections {
            let ordinal = (rejection.index + 1).to_string();
            let signature_text = self.signature_to_string(&signatures[rejection.index]);
            let detail = self.argument_mismatch_diagnostic(&rejection.mismatch);
            diagnostic = diagnostic.with_related(
                Diagnostic::new(
                    &messages::OVERLOAD_0_OF_1_2_GAVE_THE_FOLLOWING_ERROR,
                    &[&ordinal, &total, &signature_text],
                )
                .with_related(detail),
            );
        }
        self.report(diagnostic);
    }

    fn argument_mismatch_diagnostic(&self, mismatch: &ArgumentMismatch) -> Diagnostic {
        match *mismatch {
            ArgumentMismatch::Arity {
                expected_min,
                expected_max,
                actual,
            } => {
                let expected = match expected_max {
                    Some(max) if max == expected_min => max.to_string(),
                    Some(max) => format!("{}-{}", expected_min, max),
                    None => format!("at least {}", expected_min),
                };
                Diagnostic::new(&messages::EXPECTED_0_ARGUMENTS_BUT_GOT_1, &[&expected, &actual.to_string()])
            }
            ArgumentMismatch::Argument {
                argument, parameter, ..
            } => {
                let argument_text = self.type_to_string(argument);
                let parameter_text = self.type_to_string(parameter);
                Diagnostic::new(
                    &messages::ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1,
                    &[&argument_text, &parameter_text],
                )
                .with_types(Some(parameter), Some(argument))
            }
        }
    }
}
