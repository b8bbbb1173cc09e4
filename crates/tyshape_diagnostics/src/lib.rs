//! tyshape_diagnostics: Diagnostic records and message templates.
//!
//! Every checking failure is reported as data. A `Diagnostic` is a realized
//! `DiagnosticMessage` template with its location, the types involved, and
//! any elaboration chain, accumulated in a `DiagnosticCollection` that the
//! pass hands back to its caller.

use std::fmt;
use tyshape_core::{TextSpan, TypeId};

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// The failure taxonomy of a checking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    /// A name that no declaration defines.
    UnresolvedReference,
    /// An alias or base list that reaches itself while it is being resolved.
    CircularAlias,
    /// An assignability failure.
    TypeMismatch,
    /// A required target property absent from the source.
    MissingRequiredProperty,
    /// A property whose type does not satisfy an index signature.
    IndexSignatureViolation,
    /// No call signature accepts the argument list.
    NoMatchingOverload,
    /// The bound receiver does not satisfy a declared `this` type.
    ThisContextUnsatisfied,
    /// A name or property defined twice in the same scope.
    DuplicateDeclaration,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::UnresolvedReference => "UnresolvedReference",
            DiagnosticKind::CircularAlias => "CircularAlias",
            DiagnosticKind::TypeMismatch => "TypeMismatch",
            DiagnosticKind::MissingRequiredProperty => "MissingRequiredProperty",
            DiagnosticKind::IndexSignatureViolation => "IndexSignatureViolation",
            DiagnosticKind::NoMatchingOverload => "NoMatchingOverload",
            DiagnosticKind::ThisContextUnsatisfied => "ThisContextUnsatisfied",
            DiagnosticKind::DuplicateDeclaration => "DuplicateDeclaration",
        };
        f.write_str(name)
    }
}

/// A diagnostic message template with a code, category, and kind.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub kind: DiagnosticKind,
    /// The template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: u32,
    pub category: DiagnosticCategory,
    /// Location of the node the failure was recovered at, if known.
    pub span: Option<TextSpan>,
    /// The type the context required.
    pub expected: Option<TypeId>,
    /// The type that was supplied.
    pub actual: Option<TypeId>,
    pub message_text: String,
    /// Elaborations: the failing property chain, rejected overloads, etc.
    pub related_information: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create a diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            kind: message.kind,
            code: message.code,
            category: message.category,
            span: None,
            expected: None,
            actual: None,
            message_text: format_message(message.message, args),
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic anchored at a span.
    pub fn at(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        let mut diagnostic = Self::new(message, args);
        diagnostic.span = Some(span);
        diagnostic
    }

    pub fn with_types(mut self, expected: Option<TypeId>, actual: Option<TypeId>) -> Self {
        self.expected = expected;
        self.actual = actual;
        self
    }

    pub fn with_related(mut self, related: Diagnostic) -> Self {
        self.related_information.push(related);
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = self.span {
            write!(f, "{}: ", span.start)?;
        }
        write!(f, "{} TS{}: {}", self.category, self.code, self.message_text)?;
        for related in &self.related_information {
            write!(f, "\n  {}", related.to_string().replace('\n', "\n  "))?;
        }
        Ok(())
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
///
/// The template is scanned once, so argument text is never substituted
/// into. Placeholders without a matching argument are kept as written.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let argument = after.find('}').and_then(|close| {
            let index = after[..close].parse::<usize>().ok()?;
            args.get(index).map(|arg| (*arg, close))
        });
        match argument {
            Some((arg, close)) => {
                result.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Diagnostics accumulated during one checking pass, in report order.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Number of diagnostics of the given kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.diagnostics.iter().map(|d| d.kind).collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Stable sort by position; diagnostics without a span keep their
    /// relative order at the front.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by_key(|d| d.span.map(|s| (s.start, s.length)));
    }

    /// Render every diagnostic, one per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        out
    }
}

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $category:ident, $kind:ident, $msg:expr) => {
            DiagnosticMessage {
                code: $code,
                category: DiagnosticCategory::$category,
                kind: DiagnosticKind::$kind,
                message: $msg,
            }
        };
    }

    // Names and declarations
    pub const DUPLICATE_IDENTIFIER_0: DiagnosticMessage = diag!(2300, Error, DuplicateDeclaration, "Duplicate identifier '{0}'.");
    pub const CANNOT_FIND_NAME_0: DiagnosticMessage = diag!(2304, Error, UnresolvedReference, "Cannot find name '{0}'.");
    pub const TYPE_0_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE: DiagnosticMessage = diag!(2310, Error, CircularAlias, "Type '{0}' recursively references itself as a base type.");
    pub const AN_INTERFACE_CAN_ONLY_EXTEND_AN_OBJECT_TYPE: DiagnosticMessage = diag!(2312, Error, TypeMismatch, "An interface can only extend an object type or intersection of object types with statically known members.");
    pub const INTERFACE_0_CANNOT_SIMULTANEOUSLY_EXTEND_TYPES_1_AND_2: DiagnosticMessage = diag!(2320, Error, TypeMismatch, "Interface '{0}' cannot simultaneously extend types '{1}' and '{2}'.");
    pub const NAMED_PROPERTY_0_OF_TYPES_1_AND_2_ARE_NOT_IDENTICAL: DiagnosticMessage = diag!(2319, Message, TypeMismatch, "Named property '{0}' of types '{1}' and '{2}' are not identical.");
    pub const TYPE_ALIAS_0_CIRCULARLY_REFERENCES_ITSELF: DiagnosticMessage = diag!(2456, Error, CircularAlias, "Type alias '{0}' circularly references itself.");

    // Assignability
    pub const TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1: DiagnosticMessage = diag!(2322, Error, TypeMismatch, "Type '{0}' is not assignable to type '{1}'.");
    pub const TYPES_OF_PROPERTY_0_ARE_INCOMPATIBLE: DiagnosticMessage = diag!(2326, Message, TypeMismatch, "Types of property '{0}' are incompatible.");
    pub const PROPERTY_0_IS_MISSING_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2: DiagnosticMessage = diag!(2741, Error, MissingRequiredProperty, "Property '{0}' is missing in type '{1}' but required in type '{2}'.");
    pub const PROPERTY_0_IS_OPTIONAL_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2: DiagnosticMessage = diag!(2327, Error, MissingRequiredProperty, "Property '{0}' is optional in type '{1}' but required in type '{2}'.");
    pub const PROPERTY_0_OF_TYPE_1_IS_NOT_ASSIGNABLE_TO_2_INDEX_TYPE_3: DiagnosticMessage = diag!(2411, Error, IndexSignatureViolation, "Property '{0}' of type '{1}' is not assignable to '{2}' index type '{3}'.");
    pub const SOURCE_HAS_0_ELEMENTS_BUT_TARGET_REQUIRES_1: DiagnosticMessage = diag!(2618, Error, TypeMismatch, "Source has {0} element(s) but target requires {1}.");
    pub const PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1: DiagnosticMessage = diag!(2339, Error, TypeMismatch, "Property '{0}' does not exist on type '{1}'.");

    // Calls
    pub const ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1: DiagnosticMessage = diag!(2345, Error, NoMatchingOverload, "Argument of type '{0}' is not assignable to parameter of type '{1}'.");
    pub const THIS_EXPRESSION_IS_NOT_CALLABLE: DiagnosticMessage = diag!(2349, Error, TypeMismatch, "This expression is not callable. Type '{0}' has no call signatures.");
    pub const THIS_EXPRESSION_IS_NOT_CONSTRUCTABLE: DiagnosticMessage = diag!(2351, Error, TypeMismatch, "This expression is not constructable. Type '{0}' has no construct signatures.");
    pub const THIS_OVERLOAD_SIGNATURE_IS_NOT_COMPATIBLE_WITH_ITS_IMPLEMENTATION_SIGNATURE: DiagnosticMessage = diag!(2394, Error, TypeMismatch, "This overload signature is not compatible with its implementation signature.");
    pub const EXPECTED_0_ARGUMENTS_BUT_GOT_1: DiagnosticMessage = diag!(2554, Error, NoMatchingOverload, "Expected {0} arguments, but got {1}.");
    pub const THE_THIS_CONTEXT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_METHOD_S_THIS_OF_TYPE_1: DiagnosticMessage = diag!(2684, Error, ThisContextUnsatisfied, "The 'this' context of type '{0}' is not assignable to method's 'this' of type '{1}'.");
    pub const NO_OVERLOAD_MATCHES_THIS_CALL: DiagnosticMessage = diag!(2769, Error, NoMatchingOverload, "No overload matches this call.");
    pub const OVERLOAD_0_OF_1_2_GAVE_THE_FOLLOWING_ERROR: DiagnosticMessage = diag!(2772, Message, NoMatchingOverload, "Overload {0} of {1}, '{2}', gave the following error.");
}
