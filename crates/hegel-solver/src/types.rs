//! Type representation.
//!
//! Types live in a [`TypeArena`](crate::TypeArena) and are addressed by
//! [`TypeId`]. Every type is owned by exactly one [`TypeScope`] (its
//! `parent`). `TypeData` is a closed sum; consumers match on it exhaustively.

use hegel_common::SourceLocation;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Handle of a type in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Sentinel substituted at failure points. Compatible with everything so
    /// that one error does not cascade.
    pub const ERROR: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    /// `undefined`, also spelled `void`.
    pub const UNDEFINED: TypeId = TypeId(3);
    pub const NULL: TypeId = TypeId(4);
    pub const NUMBER: TypeId = TypeId(5);
    pub const BIGINT: TypeId = TypeId(6);
    pub const STRING: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);
    pub const SYMBOL: TypeId = TypeId(9);
    pub const TRUE: TypeId = TypeId(10);
    pub const FALSE: TypeId = TypeId(11);

    /// First id available for non-builtin types.
    pub const FIRST_USER: u32 = 12;

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a type scope in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeScopeId(pub u32);

impl TypeScopeId {
    /// Holds the built-in primitives and interned literals.
    pub const ROOT: TypeScopeId = TypeScopeId(0);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a class. Copies of a class type share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NominalId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    Unknown,
    Never,
    Undefined,
    Null,
    Number,
    BigInt,
    String,
    Boolean,
    Symbol,
}

impl PrimitiveKind {
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Unknown => "unknown",
            PrimitiveKind::Never => "never",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Number => "number",
            PrimitiveKind::BigInt => "bigint",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Symbol => "symbol",
        }
    }

    pub const fn type_id(self) -> TypeId {
        match self {
            PrimitiveKind::Unknown => TypeId::UNKNOWN,
            PrimitiveKind::Never => TypeId::NEVER,
            PrimitiveKind::Undefined => TypeId::UNDEFINED,
            PrimitiveKind::Null => TypeId::NULL,
            PrimitiveKind::Number => TypeId::NUMBER,
            PrimitiveKind::BigInt => TypeId::BIGINT,
            PrimitiveKind::String => TypeId::STRING,
            PrimitiveKind::Boolean => TypeId::BOOLEAN,
            PrimitiveKind::Symbol => TypeId::SYMBOL,
        }
    }

    /// Result of `typeof` for values of this kind.
    pub const fn typeof_tag(self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Undefined => Some("undefined"),
            PrimitiveKind::Null => Some("object"),
            PrimitiveKind::Number => Some("number"),
            PrimitiveKind::BigInt => Some("bigint"),
            PrimitiveKind::String => Some("string"),
            PrimitiveKind::Boolean => Some("boolean"),
            PrimitiveKind::Symbol => Some("symbol"),
            PrimitiveKind::Unknown | PrimitiveKind::Never => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive a literal widens to.
    pub const fn widened(&self) -> TypeId {
        match self {
            LiteralValue::Number(_) => TypeId::NUMBER,
            LiteralValue::String(_) => TypeId::STRING,
            LiteralValue::Boolean(_) => TypeId::BOOLEAN,
        }
    }

    /// Whether the value is falsy at runtime.
    pub fn is_falsy(&self) -> bool {
        match self {
            LiteralValue::Number(value) => *value == 0.0 || value.is_nan(),
            LiteralValue::String(value) => value.is_empty(),
            LiteralValue::Boolean(value) => !value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        ParamInfo {
            name: name.into(),
            ty,
            optional: false,
            rest: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionShape {
    /// Own type parameters (`Parameter` types); non-empty for generic functions.
    pub type_params: Vec<TypeId>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    /// What a call may throw, if known.
    pub throws: Option<TypeId>,
}

impl FunctionShape {
    pub fn new(params: Vec<ParamInfo>, return_type: TypeId) -> Self {
        FunctionShape {
            type_params: Vec::new(),
            params,
            return_type,
            throws: None,
        }
    }

    /// Number of arguments a call must supply.
    pub fn required_arity(&self) -> usize {
        self.params
            .iter()
            .take_while(|param| !param.optional && !param.rest)
            .count()
    }

    /// Maximum number of arguments, `None` with a rest parameter.
    pub fn max_arity(&self) -> Option<usize> {
        if self.params.iter().any(|param| param.rest) {
            None
        } else {
            Some(self.params.len())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub ty: TypeId,
    pub optional: bool,
}

impl PropertyInfo {
    pub const fn new(ty: TypeId) -> Self {
        PropertyInfo {
            ty,
            optional: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    pub properties: IndexMap<String, PropertyInfo>,
    /// Set for class instance types; compatibility is then by identity.
    pub nominal: Option<NominalId>,
    /// No properties beyond the listed ones are allowed.
    pub is_exact: bool,
    /// Construct signature of class values.
    pub constructor: Option<TypeId>,
}

impl ObjectShape {
    pub fn with_properties(properties: IndexMap<String, PropertyInfo>) -> Self {
        ObjectShape {
            properties,
            ..ObjectShape::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamInfo {
    pub name: String,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

/// A polymorphic alias or class awaiting type arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericShape {
    pub params: Vec<TypeId>,
    pub body: TypeId,
}

/// `Target<Arguments>`; expanded lazily so that recursive aliases stay finite.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeApplication {
    pub target: TypeId,
    pub arguments: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeData {
    Primitive(PrimitiveKind),
    Literal(LiteralValue),
    Function(FunctionShape),
    Object(ObjectShape),
    Parameter(TypeParamInfo),
    Generic(GenericShape),
    Application(TypeApplication),
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    /// Display name, stable once the type is published.
    pub name: String,
    /// Owning type scope.
    pub parent: TypeScopeId,
    pub data: TypeData,
    /// Nominal supertype (class `extends`).
    pub is_subtype_of: Option<TypeId>,
    pub loc: Option<SourceLocation>,
}

impl Type {
    pub const fn is_function(&self) -> bool {
        matches!(self.data, TypeData::Function(_))
    }

    pub const fn as_function(&self) -> Option<&FunctionShape> {
        match &self.data {
            TypeData::Function(shape) => Some(shape),
            _ => None,
        }
    }

    pub const fn as_object(&self) -> Option<&ObjectShape> {
        match &self.data {
            TypeData::Object(shape) => Some(shape),
            _ => None,
        }
    }

    pub const fn as_literal(&self) -> Option<&LiteralValue> {
        match &self.data {
            TypeData::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// Ordered name -> type bindings with lexical nesting.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeScope {
    pub parent: Option<TypeScopeId>,
    /// Nesting depth; on lookup the highest priority binding wins.
    pub priority: u32,
    pub body: IndexMap<String, TypeId>,
    /// Ambient scopes whose top-level types were mixed into this one.
    pub mixed_from: Vec<TypeScopeId>,
}
