//! Type shapes.

use crate::error::DefinitionError;
use crate::flags::TypeFlags;
use std::fmt;
use std::hash::{Hash, Hasher};
use tyshape_core::TypeId;

/// A type in the arena.
#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub flags: TypeFlags,
    pub kind: TypeKind,
}

/// The closed set of type shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Literal(LiteralValue),
    Array(TypeId),
    /// Fixed-length tuple; the length is part of the identity.
    Tuple(Vec<TypeId>),
    Object(ObjectShape),
    /// At least two distinct members, none of which is itself a union.
    Union(Vec<TypeId>),
    /// At least two distinct members, none of which is itself an intersection.
    Intersection(Vec<TypeId>),
    /// Overloads in declaration order; never empty.
    Function(Vec<Signature>),
    Constructor(Signature),
    /// Indirection through a declared name, resolved by the environment.
    AliasRef(String),
}

impl TypeKind {
    pub fn flags(&self) -> TypeFlags {
        match self {
            TypeKind::Primitive(kind) => kind.flags(),
            TypeKind::Literal(value) => value.flags(),
            TypeKind::Array(_) => TypeFlags::ARRAY,
            TypeKind::Tuple(_) => TypeFlags::TUPLE,
            TypeKind::Object(_) => TypeFlags::OBJECT,
            TypeKind::Union(_) => TypeFlags::UNION,
            TypeKind::Intersection(_) => TypeFlags::INTERSECTION,
            TypeKind::Function(_) => TypeFlags::FUNCTION,
            TypeKind::Constructor(_) => TypeFlags::CONSTRUCTOR,
            TypeKind::AliasRef(_) => TypeFlags::ALIAS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Undefined,
    Null,
    Any,
    Never,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::String,
        PrimitiveKind::Number,
        PrimitiveKind::Boolean,
        PrimitiveKind::Undefined,
        PrimitiveKind::Null,
        PrimitiveKind::Any,
        PrimitiveKind::Never,
        PrimitiveKind::Void,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Any => "any",
            PrimitiveKind::Never => "never",
            PrimitiveKind::Void => "void",
        }
    }

    pub fn flags(self) -> TypeFlags {
        match self {
            PrimitiveKind::String => TypeFlags::STRING,
            PrimitiveKind::Number => TypeFlags::NUMBER,
            PrimitiveKind::Boolean => TypeFlags::BOOLEAN,
            PrimitiveKind::Undefined => TypeFlags::UNDEFINED,
            PrimitiveKind::Null => TypeFlags::NULL,
            PrimitiveKind::Any => TypeFlags::ANY,
            PrimitiveKind::Never => TypeFlags::NEVER,
            PrimitiveKind::Void => TypeFlags::VOID,
        }
    }
}

/// A number literal value with bitwise identity (`-0` folds into `0`).
#[derive(Debug, Clone, Copy)]
pub struct Number(pub f64);

impl Number {
    fn key(self) -> u64 {
        if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// The exact value carried by a literal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(String),
    Number(Number),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive kind this literal widens to.
    pub fn base(&self) -> PrimitiveKind {
        match self {
            LiteralValue::String(_) => PrimitiveKind::String,
            LiteralValue::Number(_) => PrimitiveKind::Number,
            LiteralValue::Boolean(_) => PrimitiveKind::Boolean,
        }
    }

    fn flags(&self) -> TypeFlags {
        match self {
            LiteralValue::String(_) => TypeFlags::STRING_LITERAL,
            LiteralValue::Number(_) => TypeFlags::NUMBER_LITERAL,
            LiteralValue::Boolean(_) => TypeFlags::BOOLEAN_LITERAL,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "\"{}\"", s),
            LiteralValue::Number(n) => write!(f, "{}", n.0),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKeyKind {
    String,
    Number,
}

impl IndexKeyKind {
    /// Whether a property with this name falls under the signature.
    pub fn constrains(self, name: &str) -> bool {
        match self {
            IndexKeyKind::String => true,
            IndexKeyKind::Number => name.parse::<f64>().is_ok_and(f64::is_finite),
        }
    }
}

impl fmt::Display for IndexKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKeyKind::String => f.write_str("string"),
            IndexKeyKind::Number => f.write_str("number"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key: IndexKeyKind,
    pub value: TypeId,
}

/// Property set plus optional index signature. Property order is kept for
/// stable messages only; it carries no typing meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ObjectShape {
    pub properties: Vec<Property>,
    pub index: Option<IndexSignature>,
}

impl ObjectShape {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// True for `{}`: no properties and no index signature.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.index.is_none()
    }

    /// Check that every property the index signature covers has a value
    /// type assignable to the signature's value type. Reports the first
    /// violation in declaration order.
    ///
    /// Assignability is supplied by the caller because deciding it may
    /// require resolving aliases the arena knows nothing about.
    pub fn validate_index_signature(
        &self,
        mut is_assignable: impl FnMut(TypeId, TypeId) -> bool,
    ) -> Result<(), DefinitionError> {
        let Some(index) = self.index else {
            return Ok(());
        };
        for property in &self.properties {
            if index.key.constrains(&property.name) && !is_assignable(property.ty, index.value) {
                return Err(DefinitionError::IndexSignatureViolation {
                    property: property.name.clone(),
                    property_type: property.ty,
                    key: index.key,
                    value_type: index.value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    /// For a rest parameter this is the array type, not its element.
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
}

/// One call signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Declared receiver requirement (`this: T`).
    pub this_type: Option<TypeId>,
    pub params: Vec<Parameter>,
    pub return_type: TypeId,
}

impl Signature {
    pub fn rest_param(&self) -> Option<&Parameter> {
        self.params.last().filter(|p| p.rest)
    }

    /// Parameters before the rest parameter.
    pub fn positional_params(&self) -> &[Parameter] {
        match self.rest_param() {
            Some(_) => &self.params[..self.params.len() - 1],
            None => &self.params,
        }
    }

    /// Number of arguments a call must supply.
    pub fn min_arity(&self) -> usize {
        self.positional_params().iter().filter(|p| !p.optional).count()
    }

    /// Upper bound on the argument count, `None` with a rest parameter.
    pub fn max_arity(&self) -> Option<usize> {
        match self.rest_param() {
            Some(_) => None,
            None => Some(self.params.len()),
        }
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_arity() && self.max_arity().map_or(true, |max| count <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, optional: bool, rest: bool) -> Parameter {
        Parameter { name: name.to_string(), ty: TypeId(0), optional, rest }
    }

    #[test]
    fn test_arity_bounds() {
        let sig = Signature {
            this_type: None,
            params: vec![param("a", false, false), param("b", true, false)],
            return_type: TypeId(0),
        };
        assert!(!sig.accepts_arity(0));
        assert!(sig.accepts_arity(1));
        assert!(sig.accepts_arity(2));
        assert!(!sig.accepts_arity(3));

        let variadic = Signature {
            this_type: None,
            params: vec![param("kind", false, false), param("rest", false, true)],
            return_type: TypeId(0),
        };
        assert_eq!(variadic.min_arity(), 1);
        assert_eq!(variadic.max_arity(), None);
        assert!(variadic.accepts_arity(7));
    }

    #[test]
    fn test_number_key_folds_negative_zero() {
        assert_eq!(LiteralValue::Number(Number(0.0)), LiteralValue::Number(Number(-0.0)));
        assert_ne!(LiteralValue::Number(Number(1.0)), LiteralValue::Number(Number(2.0)));
    }

    #[test]
    fn test_numeric_index_key_only_constrains_numeric_names() {
        assert!(IndexKeyKind::Number.constrains("0"));
        assert!(IndexKeyKind::Number.constrains("1.5"));
        assert!(!IndexKeyKind::Number.constrains("name"));
        assert!(IndexKeyKind::String.constrains("name"));
    }
}
