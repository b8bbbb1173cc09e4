//! Tree node definitions.

use tyshape_core::{NodeId, TextSpan};

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    pub id: NodeId,
    pub span: TextSpan,
}

impl NodeData {
    pub fn new(id: NodeId, span: TextSpan) -> Self {
        Self { id, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub data: NodeData,
    pub text: String,
}

/// Literal values shared by literal types and literal expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
}

// ============================================================================
// Program and Statements
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    TypeAlias(TypeAliasDeclaration),
    Interface(InterfaceDeclaration),
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::TypeAlias(n) => &n.data,
            Statement::Interface(n) => &n.data,
            Statement::Variable(n) => &n.data,
            Statement::Function(n) => &n.data,
            Statement::Expression(n) => &n.data,
        }
    }
}

/// `type Name = T;`
#[derive(Debug, Clone)]
pub struct TypeAliasDeclaration {
    pub data: NodeData,
    pub name: Identifier,
    pub type_node: TypeNode,
}

/// `interface Name extends A, B { ... }`
#[derive(Debug, Clone)]
pub struct InterfaceDeclaration {
    pub data: NodeData,
    pub name: Identifier,
    pub extends: Vec<Identifier>,
    pub body: ObjectTypeNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Const,
    Let,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub data: NodeData,
    pub kind: VariableKind,
    pub name: Identifier,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
}

/// A function with its overload list. When `overloads` is empty the
/// implementation signature is the only call signature.
#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    pub data: NodeData,
    pub name: Identifier,
    pub overloads: Vec<SignatureNode>,
    pub implementation: Option<SignatureNode>,
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub data: NodeData,
    pub expression: Expression,
}

// ============================================================================
// Type Nodes
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub data: NodeData,
    pub kind: TypeNodeKind,
}

#[derive(Debug, Clone)]
pub enum TypeNodeKind {
    Keyword(KeywordType),
    Literal(Literal),
    Reference(Identifier),
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Object(ObjectTypeNode),
    Function(Box<SignatureNode>),
    Constructor(Box<SignatureNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordType {
    String,
    Number,
    Boolean,
    Undefined,
    Null,
    Any,
    Never,
    Void,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectTypeNode {
    pub members: Vec<PropertySignatureNode>,
    pub index: Option<IndexSignatureNode>,
}

#[derive(Debug, Clone)]
pub struct PropertySignatureNode {
    pub data: NodeData,
    pub name: Identifier,
    pub optional: bool,
    pub type_node: TypeNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKey {
    String,
    Number,
}

/// `[key: string]: T`
#[derive(Debug, Clone)]
pub struct IndexSignatureNode {
    pub data: NodeData,
    pub key: IndexKey,
    pub type_node: Box<TypeNode>,
}

#[derive(Debug, Clone)]
pub struct SignatureNode {
    pub data: NodeData,
    /// The `this: T` pseudo-parameter.
    pub this_type: Option<TypeNode>,
    pub parameters: Vec<ParameterNode>,
    pub return_type: TypeNode,
}

#[derive(Debug, Clone)]
pub struct ParameterNode {
    pub data: NodeData,
    pub name: Identifier,
    pub optional: bool,
    /// `...name: T[]`; only valid as the last parameter.
    pub rest: bool,
    pub type_node: TypeNode,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub struct Expression {
    pub data: NodeData,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Literal(Literal),
    Identifier(Identifier),
    ObjectLiteral(Vec<ObjectLiteralProperty>),
    ArrayLiteral(Vec<Expression>),
    PropertyAccess(PropertyAccessExpression),
    Call(CallExpression),
    New(NewExpression),
    /// A function value typed by its signature; bodies are not checked here.
    Function(Box<SignatureNode>),
}

#[derive(Debug, Clone)]
pub struct ObjectLiteralProperty {
    pub name: Identifier,
    pub value: Expression,
}

/// `object.name`
#[derive(Debug, Clone)]
pub struct PropertyAccessExpression {
    pub object: Box<Expression>,
    pub name: Identifier,
}

/// `callee(args)`, or `callee.call(receiver, args)` when `receiver` is set.
#[derive(Debug, Clone)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub receiver: Option<Box<Expression>>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone)]
pub struct NewExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}
