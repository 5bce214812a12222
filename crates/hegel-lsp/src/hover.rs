//! Hover information.

use crate::completions::{CompletionItemKind, binding_kind};
use crate::position::{BindingTarget, PositionedModuleScope};
use hegel_binder::{Graph, VariableId};
use hegel_common::{Position, SourceLocation};
use hegel_solver::format::display_name;
use hegel_solver::{TypeData, TypeId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverInfo {
    pub name: String,
    pub type_name: String,
    /// One-line signature shown to the user, e.g. `const a: number`.
    pub display: String,
    /// Range of the hovered declaration or reference.
    pub range: SourceLocation,
    /// Range of the declaration the hovered name resolves to.
    pub declaration: SourceLocation,
    /// The binding is a narrowed copy made by a type guard.
    pub is_refined: bool,
}

impl PositionedModuleScope {
    pub fn hover(&self, graph: &Graph, position: Position) -> Option<HoverInfo> {
        let binding = self.at(position)?;
        let mut info = match binding.target {
            BindingTarget::Variable(variable) => variable_hover(graph, variable),
            BindingTarget::Type(ty) => type_hover(graph, ty),
        };
        info.range = binding.range;
        Some(info)
    }
}

fn variable_hover(graph: &Graph, variable: VariableId) -> HoverInfo {
    let info = graph.variable(variable);
    let type_name = graph.type_name(variable).to_string();
    let display = match binding_kind(graph, variable) {
        CompletionItemKind::Class => type_name.clone(),
        CompletionItemKind::Function => format!("function {}: {type_name}", info.name),
        CompletionItemKind::Constant => format!("const {}: {type_name}", info.name),
        _ => format!("let {}: {type_name}", info.name),
    };
    HoverInfo {
        name: info.name.clone(),
        type_name,
        display,
        range: info.meta.loc,
        declaration: info.meta.loc,
        is_refined: info.meta.changed,
    }
}

/// `type Name = structure` for declared types.
fn type_hover(graph: &Graph, ty: TypeId) -> HoverInfo {
    let declared = graph.types.get(ty);
    let display = match &declared.data {
        TypeData::Object(shape) if shape.nominal.is_some() => format!("class {}", declared.name),
        TypeData::Generic(shape) => {
            let params: Vec<&str> = shape.params.iter().map(|&p| graph.types.name(p)).collect();
            let body = display_name(&graph.types, graph.types.data(shape.body));
            format!("type {}<{}> = {body}", declared.name, params.join(", "))
        }
        data => {
            let structure = display_name(&graph.types, data);
            if structure == declared.name {
                format!("type {}", declared.name)
            } else {
                format!("type {} = {structure}", declared.name)
            }
        }
    };
    let loc = declared.loc.unwrap_or_default();
    HoverInfo {
        name: declared.name.clone(),
        type_name: declared.name.clone(),
        display,
        range: loc,
        declaration: loc,
        is_refined: false,
    }
}

#[cfg(test)]
#[path = "../tests/hover_tests.rs"]
mod hover_tests;
