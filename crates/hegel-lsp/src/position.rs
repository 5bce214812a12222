//! Position index over a built module.
//!
//! [`PositionedModuleScope`] records, once per build, the source range of
//! every declaration in a module, of every type it declares and of every
//! resolved identifier reference, together with the ranges of its lexical
//! scopes. Queries then answer "what
//! is bound here" without walking the syntax tree again.
//!
//! The index only holds ids. Queries take the [`Graph`] the module was built
//! in, so a snapshot can outlive any borrow of the session.

use hegel_binder::{Graph, ModuleId, ScopeId, ScopeKind, VariableId};
use hegel_common::{Position, SourceLocation};
use hegel_solver::{PropertyInfo, TypeData, TypeId, collect_properties, wrapper_class_name};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::trace;

/// What a [`Binding`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingTarget {
    Variable(VariableId),
    /// A type alias, class type or type parameter declared in the module.
    Type(TypeId),
}

/// A declaration or reference found at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub target: BindingTarget,
    /// Range of the matched declaration or reference.
    pub range: SourceLocation,
    pub is_reference: bool,
}

impl Binding {
    pub fn variable(&self) -> Option<VariableId> {
        match self.target {
            BindingTarget::Variable(variable) => Some(variable),
            BindingTarget::Type(_) => None,
        }
    }

    pub fn type_id(&self) -> Option<TypeId> {
        match self.target {
            BindingTarget::Type(ty) => Some(ty),
            BindingTarget::Variable(_) => None,
        }
    }

    const fn is_type(&self) -> bool {
        matches!(self.target, BindingTarget::Type(_))
    }
}

#[derive(Debug, Clone)]
pub struct PositionedModuleScope {
    module: ModuleId,
    root: ScopeId,
    /// Lexical scopes below the module scope, in creation order. Object
    /// literal scopes hold members rather than variables and are left out.
    scopes: Vec<(SourceLocation, ScopeId)>,
    /// Declarations and references, sorted by start position.
    entries: Vec<Binding>,
}

impl PositionedModuleScope {
    pub fn new(graph: &Graph, module: ModuleId) -> Self {
        let info = graph.module(module);
        let mut scopes = Vec::new();
        let mut entries = Vec::new();
        for &scope in &info.scopes {
            let data = graph.scope(scope);
            if scope != info.scope && data.kind != ScopeKind::Object {
                scopes.push((data.loc, scope));
            }
            for &variable in data.body.values() {
                let binding = graph.variable(variable);
                // Refined bindings and `this` span their whole guard or class.
                if binding.meta.changed || binding.name == "this" {
                    continue;
                }
                entries.push(Binding {
                    target: BindingTarget::Variable(variable),
                    range: binding.meta.loc,
                    is_reference: false,
                });
            }
            // Imported names are bound here too but point at types owned by
            // their own module.
            let type_scope = data.type_scope;
            for &ty in graph.types.scope(type_scope).body.values() {
                let declared = graph.types.get(ty);
                if let Some(range) = declared.loc.filter(|_| declared.parent == type_scope) {
                    entries.push(Binding {
                        target: BindingTarget::Type(ty),
                        range,
                        is_reference: false,
                    });
                }
            }
        }
        entries.extend(info.references.iter().map(|reference| Binding {
            target: BindingTarget::Variable(reference.variable),
            range: reference.loc,
            is_reference: true,
        }));
        entries.sort_by_key(|entry| (entry.range.start, entry.is_reference, entry.is_type()));
        trace!(
            path = %info.path,
            scopes = scopes.len(),
            entries = entries.len(),
            "position index built"
        );
        PositionedModuleScope {
            module,
            root: info.scope,
            scopes,
            entries,
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// The innermost declaration or reference whose range contains
    /// `position`. A declaration wins over a reference with the same range,
    /// and a variable over a type.
    pub fn at(&self, position: Position) -> Option<Binding> {
        self.entries
            .iter()
            .take_while(|entry| entry.range.start <= position)
            .filter(|entry| entry.range.contains(position))
            .min_by_key(|entry| (entry.range.extent(), entry.is_reference, entry.is_type()))
            .copied()
    }

    /// The innermost lexical scope containing `position`, or the module
    /// scope.
    pub fn scope_at(&self, position: Position) -> ScopeId {
        self.scopes
            .iter()
            .filter(|(loc, _)| loc.contains(position))
            .max_by_key(|(loc, _)| Reverse(loc.extent()))
            .map_or(self.root, |&(_, scope)| scope)
    }

    /// Scopes visible from `position`, innermost first, ending with the
    /// global scope.
    fn chain(&self, graph: &Graph, position: Position) -> Vec<ScopeId> {
        graph
            .scope_chain(self.scope_at(position))
            .into_iter()
            .filter(|&scope| graph.scope(scope).kind != ScopeKind::Object)
            .collect()
    }

    /// Resolve `name` as written at `position`.
    pub fn lookup(&self, graph: &Graph, name: &str, position: Position) -> Option<VariableId> {
        self.chain(graph, position)
            .into_iter()
            .find_map(|scope| graph.scope(scope).body.get(name).copied())
    }

    /// Every binding reachable by name from `position`, innermost first.
    /// Shadowed outer bindings are left out.
    pub fn visible_bindings(&self, graph: &Graph, position: Position) -> Vec<VariableId> {
        let mut seen = FxHashSet::default();
        let mut bindings = Vec::new();
        for scope in self.chain(graph, position) {
            for (name, &variable) in &graph.scope(scope).body {
                if seen.insert(name.as_str()) {
                    bindings.push(variable);
                }
            }
        }
        bindings
    }

    /// Whether `variable` is declared in this module rather than in an
    /// enclosing or ambient scope.
    pub fn is_local(&self, graph: &Graph, variable: VariableId) -> bool {
        graph.scope(graph.variable(variable).parent).module == self.module
    }
}

/// Properties of a value of type `ty`, inherited ones first.
///
/// Object types without the property continue along `is_subtype_of`;
/// primitives and functions expose their wrapper class when the ambient
/// libraries declare one.
pub fn members_of(graph: &mut Graph, ty: TypeId) -> Vec<(String, PropertyInfo)> {
    let apparent = apparent_type(graph, ty);
    collect_properties(&mut graph.types, apparent)
        .into_iter()
        .collect()
}

fn apparent_type(graph: &mut Graph, ty: TypeId) -> TypeId {
    if let TypeData::Union(members) = graph.types.data(ty) {
        let members = members.clone();
        let apparent: Vec<TypeId> = members
            .into_iter()
            .map(|member| apparent_type(graph, member))
            .collect();
        let scope = graph.types.get(ty).parent;
        return graph.types.union(apparent, scope);
    }
    let wrapper = match wrapper_class_name(&graph.types, ty) {
        Some(name) => name,
        None if graph.types.get(ty).is_function() => "Function",
        None => return ty,
    };
    graph.find_type(graph.global_scope(), wrapper).unwrap_or(ty)
}

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod position_tests;
