//! Library mixing: copies the top-level bindings of an ambient library
//! module into a target module so that code under the target resolves them
//! without imports.

use crate::scope::{Graph, ModuleId, VariableId, VariableInfo};
use hegel_solver::TypeId;
use tracing::debug;

/// Copy every top-level variable and type of `library` into `target`.
///
/// Copies keep the library binding's type and record it in `mixed_from`.
/// A name already mixed from the same library binding is left alone, so
/// mixing twice adds nothing. Returns the number of variables copied.
#[tracing::instrument(level = "debug", skip(graph))]
pub fn mix_library(graph: &mut Graph, library: ModuleId, target: ModuleId) -> usize {
    let source_scope = graph.module(library).scope;
    let target_scope = graph.module(target).scope;
    let bindings: Vec<(String, VariableId)> = graph
        .scope(source_scope)
        .body
        .iter()
        .map(|(name, &variable)| (name.clone(), variable))
        .collect();

    let mut copied = 0;
    for (name, source) in bindings {
        let already_mixed = graph
            .scope(target_scope)
            .body
            .get(&name)
            .is_some_and(|&existing| graph.variable(existing).mixed_from == Some(source));
        if already_mixed {
            continue;
        }
        let original = graph.variable(source);
        let info = VariableInfo {
            is_constant: original.is_constant,
            has_initializer: original.has_initializer,
            mixed_from: Some(source),
            ..VariableInfo::new(name, original.ty, target_scope, original.meta.loc)
        };
        graph.declare(target_scope, info);
        copied += 1;
    }

    let source_types = graph.module(library).type_scope;
    let target_types = graph.module(target).type_scope;
    let types: Vec<(String, TypeId)> = graph
        .types
        .scope(source_types)
        .body
        .iter()
        .map(|(name, &ty)| (name.clone(), ty))
        .collect();
    for (name, ty) in types {
        graph.types.define(target_types, name, ty);
    }
    let mixed = &mut graph.types.scope_mut(target_types).mixed_from;
    if !mixed.contains(&source_types) {
        mixed.push(source_types);
    }

    debug!(copied, "library mixed");
    copied
}

#[cfg(test)]
#[path = "../tests/mixer_tests.rs"]
mod mixer_tests;
