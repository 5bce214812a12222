//! Builder state and the module entry point.
//!
//! One `BinderState` walks one module tree. Statement, expression, class,
//! refinement and import/export handling live in the sibling `state_*`
//! files as further `impl BinderState` blocks.

use crate::scope::{Graph, ModuleId, Reference, ScopeId, ScopeKind, VariableId, VariableInfo};
use crate::state_functions::FunctionSite;
use hegel_ast::{Function, Identifier, Program, Statement, TypeAnnotation};
use hegel_common::diagnostics::messages;
use hegel_common::limits::{MAX_CALL_DEPTH, MAX_EXPR_CHECK_DEPTH};
use hegel_common::{DiagnosticBag, DiagnosticKind, SourceLocation, format_message};
use hegel_solver::{CompatChecker, DepthCounter, TypeId, TypeLowering, TypeScopeId};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace};

/// What an import specifier of the module being built was resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    Module(ModuleId),
    /// Resolution failed and was already reported; bindings get the error
    /// sentinel.
    Failed,
}

/// Structurally invalid input. Unlike semantic problems this stops the
/// module's build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTree {
    #[error("export at {loc} does not wrap a declaration")]
    InvalidExportDeclaration { loc: SourceLocation },
    #[error("module declaration at {loc} is not at the top level of a module")]
    NestedModuleDeclaration { loc: SourceLocation },
}

/// A hoisted function declaration whose body has not been analysed yet.
pub(crate) struct PendingFunction<'a> {
    pub(crate) function: &'a Function,
    /// Scope the declaration lives in.
    pub(crate) scope: ScopeId,
}

/// Per-function bookkeeping while its body is walked.
pub(crate) struct FunctionContext {
    /// Type `return` arguments are checked against (unwrapped for async
    /// functions).
    pub(crate) declared_return: Option<TypeId>,
    pub(crate) returns: Vec<TypeId>,
}

/// Per-class bookkeeping while its members are walked.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ClassContext {
    /// Instance type of the superclass, the type of `super.member`.
    pub(crate) super_instance: Option<TypeId>,
    /// Class value of the superclass, whose constructor `super(...)` calls.
    pub(crate) super_value: Option<TypeId>,
}

pub struct BinderState<'a> {
    pub(crate) graph: &'a mut Graph,
    pub(crate) diagnostics: &'a mut DiagnosticBag,
    pub(crate) imports: &'a FxHashMap<String, ImportTarget>,
    pub(crate) module: ModuleId,
    pub(crate) source: String,
    /// Currently open scope.
    pub(crate) scope: ScopeId,
    pub(crate) pending: IndexMap<VariableId, PendingFunction<'a>>,
    /// Function scope of each analysed function declaration.
    pub(crate) function_scopes: FxHashMap<VariableId, ScopeId>,
    pub(crate) functions: Vec<FunctionContext>,
    pub(crate) classes: Vec<ClassContext>,
    pub(crate) call_depth: DepthCounter,
    pub(crate) expr_depth: DepthCounter,
    pub(crate) malformed: Option<MalformedTree>,
}

/// Build the scope graph of `program` as a new module at `path`.
///
/// `parent` is the enclosing module: the global module for user code and
/// platform libraries, `None` for the standard library. `imports` maps the
/// module's import specifiers to already built modules; specifiers it lacks
/// fall back to ambient `declare module` blocks.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path))]
pub fn build_module(
    graph: &mut Graph,
    path: &str,
    program: &Program,
    parent: Option<ModuleId>,
    imports: &FxHashMap<String, ImportTarget>,
    diagnostics: &mut DiagnosticBag,
) -> Result<ModuleId, MalformedTree> {
    let module = graph.new_module(path, parent, program.loc);
    let scope = graph.module(module).scope;
    let mut state = BinderState {
        graph,
        diagnostics,
        imports,
        module,
        source: path.to_string(),
        scope,
        pending: IndexMap::new(),
        function_scopes: FxHashMap::default(),
        functions: Vec::new(),
        classes: Vec::new(),
        call_depth: DepthCounter::new(MAX_CALL_DEPTH),
        expr_depth: DepthCounter::new(MAX_EXPR_CHECK_DEPTH),
        malformed: None,
    };
    state.bind_program(program);
    if let Some(error) = state.malformed {
        debug!(%error, "malformed tree");
        return Err(error);
    }
    debug!(
        bindings = state.graph.scope(scope).body.len(),
        references = state.graph.module(module).references.len(),
        "module built"
    );
    Ok(module)
}

impl<'a> BinderState<'a> {
    pub(crate) fn bind_program(&mut self, program: &'a Program) {
        for statement in &program.body {
            if let Statement::DeclareModule(declaration) = statement {
                self.bind_declare_module(declaration);
            }
        }
        self.bind_body(&program.body);
    }

    /// Hoist and bind a statement list in the current scope.
    pub(crate) fn bind_body(&mut self, body: &'a [Statement]) {
        self.hoist_declarations(body);
        for statement in body {
            self.bind_statement(statement);
        }
        self.flush_pending(self.scope);
    }

    pub(crate) fn malformed(&mut self, error: MalformedTree) {
        self.malformed.get_or_insert(error);
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Open a scope nested in the current one; returns the scope to restore.
    pub(crate) fn enter_scope(&mut self, kind: ScopeKind, loc: SourceLocation) -> ScopeId {
        let previous = self.scope;
        self.scope = self.graph.new_scope(kind, previous, loc);
        previous
    }

    pub(crate) fn exit_scope(&mut self, previous: ScopeId) {
        self.scope = previous;
    }

    pub(crate) fn type_scope(&self) -> TypeScopeId {
        self.graph.scope(self.scope).type_scope
    }

    pub(crate) fn module_scope(&self) -> ScopeId {
        self.graph.module(self.module).scope
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    pub(crate) fn declare_variable(
        &mut self,
        name: &str,
        ty: TypeId,
        loc: SourceLocation,
        is_constant: bool,
        has_initializer: bool,
    ) -> VariableId {
        let mut info = VariableInfo::new(name, ty, self.scope, loc);
        info.is_constant = is_constant;
        info.has_initializer = has_initializer;
        trace!(name, ty = %self.graph.types.name(ty), "declare");
        self.graph.declare(self.scope, info)
    }

    /// Resolve an identifier occurrence, analysing a hoisted function on
    /// first use, and record the reference.
    pub(crate) fn resolve_identifier(&mut self, ident: &Identifier) -> Option<VariableId> {
        let variable = self.graph.find_variable(self.scope, &ident.name)?;
        self.ensure_processed(variable);
        self.graph.module_mut(self.module).references.push(Reference {
            name: ident.name.clone(),
            loc: ident.loc,
            scope: self.scope,
            variable,
        });
        Some(variable)
    }

    /// Analyse a pending hoisted function now.
    pub(crate) fn ensure_processed(&mut self, variable: VariableId) {
        let Some(pending) = self.pending.shift_remove(&variable) else {
            return;
        };
        if !self.call_depth.enter() {
            debug!(name = %self.graph.variable(variable).name, "call depth exceeded");
            self.graph.variable_mut(variable).ty = TypeId::ERROR;
            return;
        }
        let previous = self.scope;
        self.scope = pending.scope;
        self.infer_function(
            pending.function,
            FunctionSite {
                declaration: Some(variable),
                ..Default::default()
            },
        );
        self.scope = previous;
        self.call_depth.leave();
    }

    /// Analyse every function still pending in `scope`.
    pub(crate) fn flush_pending(&mut self, scope: ScopeId) {
        let waiting: Vec<VariableId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.scope == scope)
            .map(|(&variable, _)| variable)
            .collect();
        for variable in waiting {
            self.ensure_processed(variable);
        }
    }

    // =========================================================================
    // Types and diagnostics
    // =========================================================================

    pub(crate) fn lower_type(&mut self, annotation: &TypeAnnotation) -> TypeId {
        let scope = self.type_scope();
        self.lower_type_in(annotation, scope)
    }

    pub(crate) fn lower_type_in(
        &mut self,
        annotation: &TypeAnnotation,
        scope: TypeScopeId,
    ) -> TypeId {
        TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source)
            .lower(annotation, scope)
    }

    pub(crate) fn type_name(&self, ty: TypeId) -> String {
        self.graph.types.name(ty).to_string()
    }

    pub(crate) fn report(&mut self, message: String, loc: SourceLocation) {
        self.diagnostics
            .report(DiagnosticKind::Type, message, loc, &self.source);
    }

    pub(crate) fn report_resolution(&mut self, message: String, loc: SourceLocation) {
        self.diagnostics
            .report(DiagnosticKind::Resolution, message, loc, &self.source);
    }

    /// Check `source` against `target`, reporting an incompatibility at `loc`.
    pub(crate) fn check_assignable(
        &mut self,
        source: TypeId,
        target: TypeId,
        loc: SourceLocation,
    ) -> bool {
        if CompatChecker::new(&mut self.graph.types).is_assignable(source, target) {
            return true;
        }
        let message = format_message(
            messages::INCOMPATIBLE_TYPES,
            &[&self.type_name(source), &self.type_name(target)],
        );
        self.report(message, loc);
        false
    }
}

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod state_tests;
