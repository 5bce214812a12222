//! Human-readable type names.
//!
//! The name of a structural type is computed once, when it is allocated, from
//! the names of its components; it is what diagnostics and hover show.

use crate::arena::TypeArena;
use crate::types::{FunctionShape, LiteralValue, ObjectShape, TypeData};
use hegel_common::limits::UNION_MEMBER_DISPLAY_LIMIT;
use std::fmt::Write;

pub fn display_name(arena: &TypeArena, data: &TypeData) -> String {
    match data {
        TypeData::Primitive(kind) => kind.name().to_string(),
        TypeData::Literal(value) => format_literal(value),
        TypeData::Function(shape) => format_function(arena, shape),
        TypeData::Object(shape) => format_object(arena, shape),
        TypeData::Parameter(param) => param.name.clone(),
        TypeData::Generic(shape) => {
            let params: Vec<&str> = shape.params.iter().map(|&p| arena.name(p)).collect();
            format!("{}<{}>", arena.name(shape.body), params.join(", "))
        }
        TypeData::Application(app) => {
            let arguments: Vec<&str> = app.arguments.iter().map(|&a| arena.name(a)).collect();
            format!("{}<{}>", arena.name(app.target), arguments.join(", "))
        }
        TypeData::Union(members) => {
            let mut names: Vec<String> = members
                .iter()
                .take(UNION_MEMBER_DISPLAY_LIMIT)
                .map(|&m| parenthesize_function(arena, m))
                .collect();
            if members.len() > UNION_MEMBER_DISPLAY_LIMIT {
                names.push(format!(
                    "... {} more",
                    members.len() - UNION_MEMBER_DISPLAY_LIMIT
                ));
            }
            names.join(" | ")
        }
        TypeData::Intersection(members) => members
            .iter()
            .map(|&m| parenthesize_function(arena, m))
            .collect::<Vec<_>>()
            .join(" & "),
        TypeData::Error => "?".to_string(),
    }
}

pub fn format_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Number(number) => number.to_string(),
        LiteralValue::String(text) => format!("'{text}'"),
        LiteralValue::Boolean(flag) => flag.to_string(),
    }
}

fn parenthesize_function(arena: &TypeArena, id: crate::types::TypeId) -> String {
    let name = arena.name(id);
    if arena.get(id).is_function() {
        format!("({name})")
    } else {
        name.to_string()
    }
}

fn format_function(arena: &TypeArena, shape: &FunctionShape) -> String {
    let mut out = String::new();
    if !shape.type_params.is_empty() {
        let params: Vec<&str> = shape.type_params.iter().map(|&p| arena.name(p)).collect();
        let _ = write!(out, "<{}>", params.join(", "));
    }
    out.push('(');
    for (index, param) in shape.params.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        if param.rest {
            out.push_str("...");
        }
        out.push_str(arena.name(param.ty));
        if param.optional {
            out.push_str(" | undefined");
        }
    }
    let _ = write!(out, ") => {}", arena.name(shape.return_type));
    out
}

fn format_object(arena: &TypeArena, shape: &ObjectShape) -> String {
    if shape.properties.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{ ");
    for (index, (key, property)) in shape.properties.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(
            out,
            "{key}{}: {}",
            if property.optional { "?" } else { "" },
            arena.name(property.ty)
        );
    }
    out.push_str(" }");
    out
}
