//! Scope graph construction for hegel.
//!
//! [`build_module`] walks one module's syntax tree and records its variable
//! scopes, bindings, references and inferred types in a shared [`Graph`],
//! reporting semantic problems to a [`DiagnosticBag`](hegel_common::DiagnosticBag).
//! [`mix_library`] makes the bindings of an ambient library visible to other
//! modules without imports.

pub mod mixer;
pub mod scope;
pub mod state;
mod state_classes;
mod state_expressions;
mod state_functions;
mod state_import_export;
mod state_refinement;
mod state_statements;

pub use mixer::mix_library;
pub use scope::{
    Graph, Meta, ModuleId, ModuleScope, Reference, ScopeId, ScopeKind, VariableId, VariableInfo,
    VariableScope,
};
pub use state::{BinderState, ImportTarget, MalformedTree, build_module};
