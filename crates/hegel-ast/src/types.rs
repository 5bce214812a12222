//! Type annotation nodes.

use crate::node::Identifier;
use hegel_common::SourceLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: Identifier,
    pub constraint: Option<TypeAnnotation>,
    pub default: Option<TypeAnnotation>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordType {
    Number,
    String,
    Boolean,
    BigInt,
    Symbol,
    Void,
    Undefined,
    Null,
    Unknown,
    Never,
    Mixed,
}

impl KeywordType {
    pub fn from_keyword(text: &str) -> Option<Self> {
        Some(match text {
            "number" => KeywordType::Number,
            "string" => KeywordType::String,
            "boolean" => KeywordType::Boolean,
            "bigint" => KeywordType::BigInt,
            "symbol" => KeywordType::Symbol,
            "void" => KeywordType::Void,
            "undefined" => KeywordType::Undefined,
            "null" => KeywordType::Null,
            "unknown" => KeywordType::Unknown,
            "never" => KeywordType::Never,
            "mixed" => KeywordType::Mixed,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum LiteralTypeValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeAnnotation {
    Keyword {
        keyword: KeywordType,
        loc: SourceLocation,
    },
    Literal {
        value: LiteralTypeValue,
        loc: SourceLocation,
    },
    /// `Name` or `Name<A, B>`
    Reference {
        name: Identifier,
        type_arguments: Vec<TypeAnnotation>,
        loc: SourceLocation,
    },
    Object(ObjectTypeAnnotation),
    Function(FunctionTypeAnnotation),
    Union {
        types: Vec<TypeAnnotation>,
        loc: SourceLocation,
    },
    Intersection {
        types: Vec<TypeAnnotation>,
        loc: SourceLocation,
    },
    /// `T[]`
    Array {
        element: Box<TypeAnnotation>,
        loc: SourceLocation,
    },
    /// `?T`
    Nullable {
        inner: Box<TypeAnnotation>,
        loc: SourceLocation,
    },
    Tuple {
        elements: Vec<TypeAnnotation>,
        loc: SourceLocation,
    },
}

impl TypeAnnotation {
    pub fn loc(&self) -> SourceLocation {
        match self {
            TypeAnnotation::Keyword { loc, .. }
            | TypeAnnotation::Literal { loc, .. }
            | TypeAnnotation::Reference { loc, .. }
            | TypeAnnotation::Union { loc, .. }
            | TypeAnnotation::Intersection { loc, .. }
            | TypeAnnotation::Array { loc, .. }
            | TypeAnnotation::Nullable { loc, .. }
            | TypeAnnotation::Tuple { loc, .. } => *loc,
            TypeAnnotation::Object(object) => object.loc,
            TypeAnnotation::Function(function) => function.loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeAnnotation {
    pub properties: Vec<ObjectTypeProperty>,
    /// `{| ... |}`: no properties beyond the listed ones.
    pub exact: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeProperty {
    pub key: Identifier,
    pub value: TypeAnnotation,
    pub optional: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTypeAnnotation {
    pub type_parameters: Vec<TypeParameter>,
    pub params: Vec<FunctionTypeParam>,
    pub return_type: Box<TypeAnnotation>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTypeParam {
    pub name: Option<Identifier>,
    pub type_annotation: TypeAnnotation,
    pub optional: bool,
    pub rest: bool,
}
