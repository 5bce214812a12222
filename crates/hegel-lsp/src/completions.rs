//! Completions.
//!
//! Given a position, suggests the bindings visible there, or the members of
//! a named binding when the editor completes after a dot.

use crate::position::{PositionedModuleScope, members_of};
use hegel_binder::{Graph, VariableId};
use hegel_common::Position;
use hegel_solver::TypeData;
use serde::Serialize;

/// The kind of completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionItemKind {
    /// A `let`/`var` binding or parameter
    Variable,
    /// A `const` binding
    Constant,
    Function,
    /// A class value
    Class,
    Property,
    Method,
}

/// Sort priority categories. Lower strings appear first.
pub mod sort_priority {
    /// Bindings declared in the module being edited.
    pub const LOCAL_DECLARATION: &str = "10";
    /// Members after a dot.
    pub const MEMBER: &str = "11";
    /// Optional members.
    pub const OPTIONAL_MEMBER: &str = "12";
    /// Globals from the ambient libraries.
    pub const GLOBAL: &str = "15";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionItemKind,
    /// Display name of the binding's type.
    pub detail: String,
    /// See [`sort_priority`].
    pub sort_text: &'static str,
}

/// Classify a binding by the shape of its type.
pub fn binding_kind(graph: &Graph, variable: VariableId) -> CompletionItemKind {
    let info = graph.variable(variable);
    match graph.types.data(info.ty) {
        TypeData::Object(shape) if shape.constructor.is_some() => CompletionItemKind::Class,
        TypeData::Function(_) => CompletionItemKind::Function,
        _ if info.is_constant => CompletionItemKind::Constant,
        _ => CompletionItemKind::Variable,
    }
}

impl PositionedModuleScope {
    /// Bindings visible at `position`: module bindings first, then globals,
    /// each group alphabetical.
    pub fn completions(&self, graph: &Graph, position: Position) -> Vec<CompletionItem> {
        let mut items: Vec<CompletionItem> = self
            .visible_bindings(graph, position)
            .into_iter()
            .map(|variable| {
                let info = graph.variable(variable);
                CompletionItem {
                    label: info.name.clone(),
                    kind: binding_kind(graph, variable),
                    detail: graph.type_name(variable).to_string(),
                    sort_text: if self.is_local(graph, variable) {
                        sort_priority::LOCAL_DECLARATION
                    } else {
                        sort_priority::GLOBAL
                    },
                }
            })
            .collect();
        items.sort_by(|a, b| (a.sort_text, &a.label).cmp(&(b.sort_text, &b.label)));
        items
    }

    /// Members of the binding `object_name` as seen from `position`, in
    /// declaration order. Empty when the name is unbound or its type has no
    /// properties.
    pub fn member_completions(
        &self,
        graph: &mut Graph,
        position: Position,
        object_name: &str,
    ) -> Vec<CompletionItem> {
        let Some(variable) = self.lookup(graph, object_name, position) else {
            return Vec::new();
        };
        let ty = graph.variable(variable).ty;
        members_of(graph, ty)
            .into_iter()
            .map(|(label, property)| {
                let member = graph.types.get(property.ty);
                CompletionItem {
                    kind: if member.is_function() {
                        CompletionItemKind::Method
                    } else {
                        CompletionItemKind::Property
                    },
                    detail: member.name.clone(),
                    sort_text: if property.optional {
                        sort_priority::OPTIONAL_MEMBER
                    } else {
                        sort_priority::MEMBER
                    },
                    label,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/completions_tests.rs"]
mod completions_tests;
