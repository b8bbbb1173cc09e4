//! Programmatic tree construction.
//!
//! Each node gets a fresh `NodeId` and a one-byte synthetic span at the next
//! position, so node order in the built tree is also span order.

use crate::node::*;
use std::cell::Cell;
use tyshape_core::{NodeId, TextSpan};

/// Builder methods take `&self` so calls nest the way the tree does.
#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: Cell<u32>,
    next_pos: Cell<u32>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> NodeData {
        let id = self.next_id.get();
        let pos = self.next_pos.get();
        self.next_id.set(id + 1);
        self.next_pos.set(pos + 2);
        NodeData::new(NodeId(id), TextSpan::new(pos, 1))
    }

    pub fn ident(&self, text: &str) -> Identifier {
        Identifier {
            data: self.data(),
            text: text.to_string(),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn type_node(&self, kind: TypeNodeKind) -> TypeNode {
        TypeNode {
            data: self.data(),
            kind,
        }
    }

    pub fn keyword(&self, keyword: KeywordType) -> TypeNode {
        self.type_node(TypeNodeKind::Keyword(keyword))
    }

    pub fn string_type(&self) -> TypeNode {
        self.keyword(KeywordType::String)
    }

    pub fn number_type(&self) -> TypeNode {
        self.keyword(KeywordType::Number)
    }

    pub fn boolean_type(&self) -> TypeNode {
        self.keyword(KeywordType::Boolean)
    }

    pub fn void_type(&self) -> TypeNode {
        self.keyword(KeywordType::Void)
    }

    pub fn literal_type(&self, literal: Literal) -> TypeNode {
        self.type_node(TypeNodeKind::Literal(literal))
    }

    pub fn string_literal_type(&self, value: &str) -> TypeNode {
        self.literal_type(Literal::String(value.to_string()))
    }

    pub fn number_literal_type(&self, value: f64) -> TypeNode {
        self.literal_type(Literal::Number(value))
    }

    pub fn type_ref(&self, name: &str) -> TypeNode {
        let ident = self.ident(name);
        self.type_node(TypeNodeKind::Reference(ident))
    }

    pub fn array_type(&self, element: TypeNode) -> TypeNode {
        self.type_node(TypeNodeKind::Array(Box::new(element)))
    }

    pub fn tuple_type(&self, elements: Vec<TypeNode>) -> TypeNode {
        self.type_node(TypeNodeKind::Tuple(elements))
    }

    pub fn union_type(&self, members: Vec<TypeNode>) -> TypeNode {
        self.type_node(TypeNodeKind::Union(members))
    }

    pub fn intersection_type(&self, members: Vec<TypeNode>) -> TypeNode {
        self.type_node(TypeNodeKind::Intersection(members))
    }

    pub fn object_type(
        &self,
        members: Vec<PropertySignatureNode>,
        index: Option<IndexSignatureNode>,
    ) -> TypeNode {
        self.type_node(TypeNodeKind::Object(ObjectTypeNode { members, index }))
    }

    pub fn function_type(&self, signature: SignatureNode) -> TypeNode {
        self.type_node(TypeNodeKind::Function(Box::new(signature)))
    }

    pub fn constructor_type(&self, signature: SignatureNode) -> TypeNode {
        self.type_node(TypeNodeKind::Constructor(Box::new(signature)))
    }

    pub fn prop(&self, name: &str, type_node: TypeNode) -> PropertySignatureNode {
        self.property(name, false, type_node)
    }

    pub fn optional_prop(&self, name: &str, type_node: TypeNode) -> PropertySignatureNode {
        self.property(name, true, type_node)
    }

    fn property(&self, name: &str, optional: bool, type_node: TypeNode) -> PropertySignatureNode {
        PropertySignatureNode {
            data: self.data(),
            name: self.ident(name),
            optional,
            type_node,
        }
    }

    pub fn index_signature(&self, key: IndexKey, type_node: TypeNode) -> IndexSignatureNode {
        IndexSignatureNode {
            data: self.data(),
            key,
            type_node: Box::new(type_node),
        }
    }

    pub fn signature(&self, parameters: Vec<ParameterNode>, return_type: TypeNode) -> SignatureNode {
        SignatureNode {
            data: self.data(),
            this_type: None,
            parameters,
            return_type,
        }
    }

    pub fn signature_with_this(
        &self,
        this_type: TypeNode,
        parameters: Vec<ParameterNode>,
        return_type: TypeNode,
    ) -> SignatureNode {
        SignatureNode {
            data: self.data(),
            this_type: Some(this_type),
            parameters,
            return_type,
        }
    }

    pub fn param(&self, name: &str, type_node: TypeNode) -> ParameterNode {
        self.parameter(name, false, false, type_node)
    }

    pub fn optional_param(&self, name: &str, type_node: TypeNode) -> ParameterNode {
        self.parameter(name, true, false, type_node)
    }

    /// `...name: T`, where `type_node` is the array type.
    pub fn rest_param(&self, name: &str, type_node: TypeNode) -> ParameterNode {
        self.parameter(name, false, true, type_node)
    }

    fn parameter(&self, name: &str, optional: bool, rest: bool, type_node: TypeNode) -> ParameterNode {
        ParameterNode {
            data: self.data(),
            name: self.ident(name),
            optional,
            rest,
            type_node,
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn type_alias(&self, name: &str, type_node: TypeNode) -> Statement {
        Statement::TypeAlias(TypeAliasDeclaration {
            data: self.data(),
            name: self.ident(name),
            type_node,
        })
    }

    pub fn interface(
        &self,
        name: &str,
        extends: &[&str],
        members: Vec<PropertySignatureNode>,
        index: Option<IndexSignatureNode>,
    ) -> Statement {
        let data = self.data();
        let name = self.ident(name);
        let extends = extends.iter().map(|base| self.ident(base)).collect();
        Statement::Interface(InterfaceDeclaration {
            data,
            name,
            extends,
            body: ObjectTypeNode { members, index },
        })
    }

    pub fn const_decl(
        &self,
        name: &str,
        type_annotation: Option<TypeNode>,
        initializer: Option<Expression>,
    ) -> Statement {
        self.variable(VariableKind::Const, name, type_annotation, initializer)
    }

    pub fn let_decl(
        &self,
        name: &str,
        type_annotation: Option<TypeNode>,
        initializer: Option<Expression>,
    ) -> Statement {
        self.variable(VariableKind::Let, name, type_annotation, initializer)
    }

    fn variable(
        &self,
        kind: VariableKind,
        name: &str,
        type_annotation: Option<TypeNode>,
        initializer: Option<Expression>,
    ) -> Statement {
        Statement::Variable(VariableDeclaration {
            data: self.data(),
            kind,
            name: self.ident(name),
            type_annotation,
            initializer,
        })
    }

    pub fn function_decl(
        &self,
        name: &str,
        overloads: Vec<SignatureNode>,
        implementation: Option<SignatureNode>,
    ) -> Statement {
        Statement::Function(FunctionDeclaration {
            data: self.data(),
            name: self.ident(name),
            overloads,
            implementation,
        })
    }

    pub fn expr_stmt(&self, expression: Expression) -> Statement {
        Statement::Expression(ExpressionStatement {
            data: self.data(),
            expression,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&self, kind: ExpressionKind) -> Expression {
        Expression {
            data: self.data(),
            kind,
        }
    }

    pub fn string(&self, value: &str) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::String(value.to_string())))
    }

    pub fn number(&self, value: f64) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::Number(value)))
    }

    pub fn boolean(&self, value: bool) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::Boolean(value)))
    }

    pub fn name(&self, name: &str) -> Expression {
        let ident = self.ident(name);
        self.expr(ExpressionKind::Identifier(ident))
    }

    pub fn object(&self, properties: Vec<(&str, Expression)>) -> Expression {
        let properties = properties
            .into_iter()
            .map(|(name, value)| ObjectLiteralProperty {
                name: self.ident(name),
                value,
            })
            .collect();
        self.expr(ExpressionKind::ObjectLiteral(properties))
    }

    pub fn array(&self, elements: Vec<Expression>) -> Expression {
        self.expr(ExpressionKind::ArrayLiteral(elements))
    }

    pub fn member(&self, object: Expression, name: &str) -> Expression {
        let name = self.ident(name);
        self.expr(ExpressionKind::PropertyAccess(PropertyAccessExpression {
            object: Box::new(object),
            name,
        }))
    }

    pub fn call(&self, callee: Expression, arguments: Vec<Expression>) -> Expression {
        self.expr(ExpressionKind::Call(CallExpression {
            callee: Box::new(callee),
            receiver: None,
            arguments,
        }))
    }

    /// `callee.call(receiver, ...arguments)`
    pub fn call_with_receiver(
        &self,
        callee: Expression,
        receiver: Expression,
        arguments: Vec<Expression>,
    ) -> Expression {
        self.expr(ExpressionKind::Call(CallExpression {
            callee: Box::new(callee),
            receiver: Some(Box::new(receiver)),
            arguments,
        }))
    }

    pub fn new_expr(&self, callee: Expression, arguments: Vec<Expression>) -> Expression {
        self.expr(ExpressionKind::New(NewExpression {
            callee: Box::new(callee),
            arguments,
        }))
    }

    pub fn function_expr(&self, signature: SignatureNode) -> Expression {
        self.expr(ExpressionKind::Function(Box::new(signature)))
    }
}
