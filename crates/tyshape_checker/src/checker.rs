//! The checking driver.
//!
//! A pass runs in phases: declare every type name, resolve the declared
//! names in order, run the deferred definition checks, hoist function
//! values, then walk the statements. Failures are recorded as diagnostics and replaced
//! with a recovery type so the walk always reaches the end of the program.

use crate::env::{DeclarationKind, Environment, Lookup, Producer};
use crate::lower::LowerMode;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, trace};
use tyshape_ast::node::*;
use tyshape_core::{NodeId, TextSpan, TypeId};
use tyshape_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use tyshape_options::CheckerOptions;
use tyshape_types::{DefinitionError, ObjectShape, Property, Signature, TypeKind, TypePrinter, TypeTable};

/// Everything a finished pass produced.
#[derive(Debug)]
pub struct CheckResult {
    pub diagnostics: DiagnosticCollection,
    /// Type of every checked expression, keyed by node id, in visit order.
    pub expression_types: IndexMap<NodeId, TypeId>,
    pub types: TypeTable,
}

impl CheckResult {
    pub fn type_to_string(&self, id: TypeId) -> String {
        TypePrinter::new(&self.types).print(id)
    }

    pub fn expression_type(&self, node: NodeId) -> Option<TypeId> {
        self.expression_types.get(&node).copied()
    }
}

/// Two interface bases declaring the same property with different types.
/// `first` and `second` pair each base with its property type.
#[derive(Debug, Clone)]
pub(crate) struct BaseConflict {
    pub interface: String,
    pub span: TextSpan,
    pub property: String,
    pub first: (TypeId, TypeId),
    pub second: (TypeId, TypeId),
}

/// The type checker: owns the arena, the name environment and the
/// diagnostics of one pass.
pub struct Checker {
    /// The type table (type arena).
    pub type_table: TypeTable,
    pub(crate) env: Environment,
    diagnostics: DiagnosticCollection,
    pub(crate) options: CheckerOptions,
    /// Memo of decided `(source, target)` pairs. A pair under evaluation
    /// holds an optimistic `true`.
    pub(crate) relation_cache: FxHashMap<(TypeId, TypeId), bool>,
    /// Pairs cached as `true` since the outermost pending pair started, so a
    /// failure can retract answers that leaned on an optimistic assumption.
    pub(crate) relation_log: Vec<(TypeId, TypeId)>,
    pub(crate) relation_depth: u32,
    /// Declared values (variables and functions).
    values: IndexMap<String, TypeId>,
    expression_types: IndexMap<NodeId, TypeId>,
    pending_index_checks: Vec<(TypeId, TextSpan)>,
    pending_base_conflicts: Vec<BaseConflict>,
    definitions_sealed: bool,
}

impl Checker {
    pub fn new() -> Self {
        Self::with_options(CheckerOptions::default())
    }

    pub fn with_options(options: CheckerOptions) -> Self {
        Self {
            type_table: TypeTable::new(),
            env: Environment::new(),
            diagnostics: DiagnosticCollection::new(),
            options,
            relation_cache: FxHashMap::default(),
            relation_log: Vec::new(),
            relation_depth: 0,
            values: IndexMap::new(),
            expression_types: IndexMap::new(),
            pending_index_checks: Vec::new(),
            pending_base_conflicts: Vec::new(),
            definitions_sealed: false,
        }
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Check a whole program.
    pub fn check_program(&mut self, program: &Program) {
        let _span = debug_span!("check_program", statements = program.statements.len()).entered();
        self.declare_types(program);
        self.resolve_declared_types();
        self.seal_definitions();
        self.declare_functions(program);
        for statement in &program.statements {
            self.check_statement(statement);
        }
        debug!(
            diagnostics = self.diagnostics.len(),
            types = self.type_table.len(),
            "check finished"
        );
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn expression_type(&self, node: NodeId) -> Option<TypeId> {
        self.expression_types.get(&node).copied()
    }

    pub fn value_type(&self, name: &str) -> Option<TypeId> {
        self.values.get(name).copied()
    }

    pub fn type_to_string(&self, id: TypeId) -> String {
        TypePrinter::with_max_depth(&self.type_table, self.options.max_type_display_depth()).print(id)
    }

    pub(crate) fn signature_to_string(&self, signature: &Signature) -> String {
        TypePrinter::with_max_depth(&self.type_table, self.options.max_type_display_depth())
            .signature(signature)
    }

    pub fn finish(self) -> CheckResult {
        CheckResult {
            diagnostics: self.diagnostics,
            expression_types: self.expression_types,
            types: self.type_table,
        }
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        trace!(code = diagnostic.code, kind = %diagnostic.kind, "diagnostic");
        self.diagnostics.add(diagnostic);
    }

    pub(crate) fn error(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.report(Diagnostic::at(span, message, args));
    }

    // ========================================================================
    // Type names
    // ========================================================================

    /// Register a type name whose definition is produced lazily. A name that
    /// is already declared is reported and the new definition dropped.
    pub fn define_type(
        &mut self,
        name: &Identifier,
        kind: DeclarationKind,
        producer: Producer,
    ) -> bool {
        match self.env.define(&name.text, kind, name.data.span, producer) {
            Ok(()) => true,
            Err(_) => {
                self.error(name.data.span, &messages::DUPLICATE_IDENTIFIER_0, &[&name.text]);
                false
            }
        }
    }

    /// Resolve a declared type name. Unknown names are reported and
    /// recover as `any`.
    pub fn resolve(&mut self, name: &str) -> TypeId {
        if !self.env.is_defined(name) {
            self.report(Diagnostic::new(&messages::CANNOT_FIND_NAME_0, &[name]));
            return self.type_table.any_type;
        }
        self.resolve_name(name)
    }

    /// Resolve a name known to the environment, running its producer on
    /// first access. Re-entering a name still being produced is a cycle:
    /// it is reported once and the name resolves to `never`.
    pub(crate) fn resolve_name(&mut self, name: &str) -> TypeId {
        match self.env.begin(name) {
            Lookup::Resolved(id) => id,
            Lookup::Unknown => self.type_table.any_type,
            Lookup::Produce(producer) => {
                let _span = debug_span!("resolve", name).entered();
                let ty = producer(self);
                self.env.finish(name, ty)
            }
            Lookup::Cycle { kind, span } => {
                debug!(name, "circular type reference");
                let message = match kind {
                    DeclarationKind::TypeAlias => &messages::TYPE_ALIAS_0_CIRCULARLY_REFERENCES_ITSELF,
                    DeclarationKind::Interface => {
                        &messages::TYPE_0_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE
                    }
                };
                self.error(span, message, &[name]);
                let never = self.type_table.never_type;
                self.env.fill(name, never);
                never
            }
        }
    }

    /// Look through alias references to the type they name. A chain visits
    /// each declared name at most once, since a name that refers back to
    /// itself resolves to `never`.
    pub fn resolve_alias(&mut self, mut id: TypeId) -> TypeId {
        for _ in 0..=self.env.len() {
            let TypeKind::AliasRef(name) = self.type_table.kind(id) else {
                return id;
            };
            let name = name.clone();
            id = self.resolve_name(&name);
        }
        self.type_table.never_type
    }

    fn declare_types(&mut self, program: &Program) {
        for statement in &program.statements {
            match statement {
                Statement::TypeAlias(decl) => {
                    let node = decl.type_node.clone();
                    let producer: Producer =
                        Box::new(move |cx: &mut Checker| cx.lower_type(&node, LowerMode::Eager));
                    self.define_type(&decl.name, DeclarationKind::TypeAlias, producer);
                }
                Statement::Interface(decl) => {
                    let body = decl.clone();
                    let producer: Producer = Box::new(move |cx: &mut Checker| cx.lower_interface(&body));
                    self.define_type(&decl.name, DeclarationKind::Interface, producer);
                }
                _ => {}
            }
        }
    }

    fn resolve_declared_types(&mut self) {
        for name in self.env.names() {
            self.resolve_name(&name);
        }
    }

    // ========================================================================
    // Definition checks
    // ========================================================================

    /// Queue an index-signature check on a freshly lowered object. The check
    /// needs assignability, which is only sound once every name is resolved.
    pub(crate) fn defer_index_check(&mut self, object: TypeId, span: TextSpan) {
        if self.definitions_sealed {
            self.validate_index_signature(object, span);
        } else {
            self.pending_index_checks.push((object, span));
        }
    }

    /// Queue a comparison of two base property types. Like index checks,
    /// it runs once every name is resolved.
    pub(crate) fn defer_base_conflict(&mut self, conflict: BaseConflict) {
        if self.definitions_sealed {
            self.check_base_conflict(conflict);
        } else {
            self.pending_base_conflicts.push(conflict);
        }
    }

    fn seal_definitions(&mut self) {
        self.definitions_sealed = true;
        let pending = std::mem::take(&mut self.pending_index_checks);
        for (object, span) in pending {
            self.validate_index_signature(object, span);
        }
        let conflicts = std::mem::take(&mut self.pending_base_conflicts);
        for conflict in conflicts {
            self.check_base_conflict(conflict);
        }
    }

    /// Bases may redeclare a property only with types that still meet.
    fn check_base_conflict(&mut self, conflict: BaseConflict) {
        let (first_base, first_type) = conflict.first;
        let (second_base, second_type) = conflict.second;
        for ty in [first_type, second_type] {
            let resolved = self.resolve_alias(ty);
            if self.type_table.is_never(resolved) {
                return;
            }
        }
        let merged = self.intersect_property_types(first_type, second_type);
        if !self.type_table.is_never(merged) {
            return;
        }
        let first = self.type_to_string(first_base);
        let second = self.type_to_string(second_base);
        debug!(interface = %conflict.interface, property = %conflict.property, "conflicting base property");
        self.report(
            Diagnostic::at(
                conflict.span,
                &messages::INTERFACE_0_CANNOT_SIMULTANEOUSLY_EXTEND_TYPES_1_AND_2,
                &[&conflict.interface, &first, &second],
            )
            .with_types(Some(first_type), Some(second_type))
            .with_related(Diagnostic::new(
                &messages::NAMED_PROPERTY_0_OF_TYPES_1_AND_2_ARE_NOT_IDENTICAL,
                &[&conflict.property, &first, &second],
            )),
        );
    }

    fn validate_index_signature(&mut self, object: TypeId, span: TextSpan) {
        let TypeKind::Object(shape) = self.type_table.kind(object) else {
            return;
        };
        let shape = shape.clone();
        if let Err(err) = shape.validate_index_signature(|s, t| self.is_assignable(s, t)) {
            self.report_definition_error(err, span);
        }
    }

    pub(crate) fn report_definition_error(&mut self, err: DefinitionError, span: TextSpan) {
        match err {
            DefinitionError::DuplicateProperty { name } => {
                self.error(span, &messages::DUPLICATE_IDENTIFIER_0, &[&name]);
            }
            DefinitionError::NoCallSignatures => {
                let never = self.type_to_string(self.type_table.never_type);
                self.error(span, &messages::THIS_EXPRESSION_IS_NOT_CALLABLE, &[&never]);
            }
            DefinitionError::IndexSignatureViolation {
                property,
                property_type,
                key,
                value_type,
            } => {
                let property_text = self.type_to_string(property_type);
                let value_text = self.type_to_string(value_type);
                let key_text = key.to_string();
                self.report(
                    Diagnostic::at(
                        span,
                        &messages::PROPERTY_0_OF_TYPE_1_IS_NOT_ASSIGNABLE_TO_2_INDEX_TYPE_3,
                        &[&property, &property_text, &key_text, &value_text],
                    )
                    .with_types(Some(value_type), Some(property_type)),
                );
            }
        }
    }

    /// Build a function type, reporting a malformed signature list.
    pub(crate) fn function_type(&mut self, signatures: Vec<Signature>, span: TextSpan) -> TypeId {
        match self.type_table.function(signatures) {
            Ok(id) => id,
            Err(err) => {
                self.report_definition_error(err, span);
                self.type_table.never_type
            }
        }
    }

    // ========================================================================
    // Values
    // ========================================================================

    fn declare_functions(&mut self, program: &Program) {
        for statement in &program.statements {
            if let Statement::Function(decl) = statement {
                self.declare_function(decl);
            }
        }
    }

    /// The callable type of a function declaration is its overload list, or
    /// the implementation signature when it has no overloads.
    fn declare_function(&mut self, decl: &FunctionDeclaration) {
        let implementation = decl
            .implementation
            .as_ref()
            .map(|node| self.lower_signature(node));
        let mut signatures = Vec::with_capacity(decl.overloads.len().max(1));
        for overload in &decl.overloads {
            let signature = self.lower_signature(overload);
            if let Some(implementation) = &implementation {
                if !self.is_implementation_compatible(implementation, &signature) {
                    self.error(
                        overload.data.span,
                        &messages::THIS_OVERLOAD_SIGNATURE_IS_NOT_COMPATIBLE_WITH_ITS_IMPLEMENTATION_SIGNATURE,
                        &[],
                    );
                }
            }
            signatures.push(signature);
        }
        if signatures.is_empty() {
            signatures.extend(implementation);
        }
        let ty = self.function_type(signatures, decl.name.data.span);
        self.declare_value(&decl.name, ty);
    }

    fn declare_value(&mut self, name: &Identifier, ty: TypeId) {
        if self.values.contains_key(&name.text) {
            self.error(name.data.span, &messages::DUPLICATE_IDENTIFIER_0, &[&name.text]);
            return;
        }
        self.values.insert(name.text.clone(), ty);
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn check_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::TypeAlias(_) | Statement::Interface(_) | Statement::Function(_) => {}
            Statement::Variable(decl) => self.check_variable_declaration(decl),
            Statement::Expression(stmt) => {
                self.check_expression(&stmt.expression);
            }
        }
    }

    fn check_variable_declaration(&mut self, decl: &VariableDeclaration) {
        let declared = decl
            .type_annotation
            .as_ref()
            .map(|node| self.lower_type(node, LowerMode::Deferred));
        let ty = match (&decl.initializer, declared) {
            (Some(initializer), Some(declared)) => {
                let actual = self.check_expression(initializer);
                self.check_type_assignable(actual, declared, initializer.data.span);
                declared
            }
            (Some(initializer), None) => {
                let actual = self.check_expression(initializer);
                match decl.kind {
                    VariableKind::Const => actual,
                    VariableKind::Let => self.type_table.widen(actual),
                }
            }
            (None, Some(declared)) => declared,
            (None, None) => self.type_table.any_type,
        };
        self.declare_value(&decl.name, ty);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub(crate) fn check_expression(&mut self, expr: &Expression) -> TypeId {
        let ty = match &expr.kind {
            ExpressionKind::Literal(literal) => self.literal_type(literal),
            ExpressionKind::Identifier(ident) => self.check_identifier(ident),
            ExpressionKind::ObjectLiteral(properties) => self.check_object_literal(properties),
            ExpressionKind::ArrayLiteral(elements) => {
                let mut types = Vec::with_capacity(elements.len());
                for element in elements {
                    let ty = self.check_expression(element);
                    types.push(self.type_table.widen(ty));
                }
                self.type_table.tuple(types)
            }
            ExpressionKind::PropertyAccess(access) => self.check_property_access(access),
            ExpressionKind::Call(call) => self.check_call_expression(call, expr.data.span),
            ExpressionKind::New(new) => self.check_new_expression(new, expr.data.span),
            ExpressionKind::Function(node) => {
                let signature = self.lower_signature(node);
                self.function_type(vec![signature], node.data.span)
            }
        };
        self.expression_types.insert(expr.data.id, ty);
        ty
    }

    fn check_identifier(&mut self, ident: &Identifier) -> TypeId {
        if let Some(ty) = self.value_type(&ident.text) {
            return ty;
        }
        self.error(ident.data.span, &messages::CANNOT_FIND_NAME_0, &[&ident.text]);
        self.type_table.any_type
    }

    fn check_object_literal(&mut self, properties: &[ObjectLiteralProperty]) -> TypeId {
        let mut shape = ObjectShape::default();
        for property in properties {
            let value = self.check_expression(&property.value);
            if shape.property(&property.name.text).is_some() {
                self.error(
                    property.name.data.span,
                    &messages::DUPLICATE_IDENTIFIER_0,
                    &[&property.name.text],
                );
                continue;
            }
            let ty = self.type_table.widen(value);
            shape.properties.push(Property {
                name: property.name.text.clone(),
                ty,
                optional: false,
            });
        }
        match self.type_table.object(shape) {
            Ok(id) => id,
            Err(_) => self.type_table.never_type,
        }
    }

    fn check_property_access(&mut self, access: &PropertyAccessExpression) -> TypeId {
        let object = self.check_expression(&access.object);
        if self.type_table.is_never(object) {
            // Already reported where the `never` came from.
            return object;
        }
        match self.get_property_of_type(object, &access.name.text) {
            Some(info) if info.optional => {
                let undefined = self.type_table.undefined_type;
                self.type_table.union(vec![info.ty, undefined])
            }
            Some(info) => info.ty,
            None => {
                let object_text = self.type_to_string(object);
                self.report(
                    Diagnostic::at(
                        access.name.data.span,
                        &messages::PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1,
                        &[&access.name.text, &object_text],
                    )
                    .with_types(None, Some(object)),
                );
                self.type_table.never_type
            }
        }
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

/// Check `program` in a fresh pass.
pub fn check_program(program: &Program, options: &CheckerOptions) -> CheckResult {
    let mut checker = Checker::with_options(options.clone());
    checker.check_program(program);
    checker.finish()
}
