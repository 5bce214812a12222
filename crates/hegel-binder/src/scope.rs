//! Scope model: variable scopes, module scopes and the graph arena that owns
//! them together with the type arena.
//!
//! All links (`parent`, `module`, `declaration`) are ids into [`Graph`].
//! A scope's parent chain ends at a module scope without parent: the global
//! module, or an ambient library module.

use hegel_common::SourceLocation;
use hegel_common::limits::MAX_SCOPE_CHAIN_DEPTH;
use hegel_solver::{TypeArena, TypeId, TypeScopeId};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VariableId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    Object,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub loc: SourceLocation,
    /// Set on bindings produced by refinement.
    pub changed: bool,
}

impl Meta {
    pub const fn new(loc: SourceLocation) -> Self {
        Meta {
            loc,
            changed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub ty: TypeId,
    pub parent: ScopeId,
    pub is_constant: bool,
    pub has_initializer: bool,
    pub meta: Meta,
    /// The ambient binding this one was mixed from.
    pub mixed_from: Option<VariableId>,
}

impl VariableInfo {
    pub fn new(name: impl Into<String>, ty: TypeId, parent: ScopeId, loc: SourceLocation) -> Self {
        VariableInfo {
            name: name.into(),
            ty,
            parent,
            is_constant: false,
            has_initializer: false,
            meta: Meta::new(loc),
            mixed_from: None,
        }
    }

    /// Placeholder for a released slot.
    fn vacant() -> Self {
        VariableInfo::new("", TypeId::ERROR, ScopeId(u32::MAX), SourceLocation::default())
    }

    #[must_use]
    pub const fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    #[must_use]
    pub const fn initialized(mut self) -> Self {
        self.has_initializer = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableScope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub module: ModuleId,
    pub body: IndexMap<String, VariableId>,
    pub type_scope: TypeScopeId,
    /// Types an exception escaping this scope may have. Collected on
    /// function scopes and `try` blocks.
    pub throwable: Vec<TypeId>,
    /// Whether `throw` statements inside are collected here.
    pub collects_throwable: bool,
    /// The function or class binding this scope belongs to.
    pub declaration: Option<VariableId>,
    /// Calls of the owning function are not analysed while set.
    pub skip_calls: bool,
    /// Cleared on hoisted functions until their body has been analysed.
    pub is_processed: bool,
    pub loc: SourceLocation,
}

impl VariableScope {
    fn vacant() -> Self {
        VariableScope {
            kind: ScopeKind::Block,
            parent: None,
            module: ModuleId(u32::MAX),
            body: IndexMap::new(),
            type_scope: TypeScopeId::ROOT,
            throwable: Vec::new(),
            collects_throwable: false,
            declaration: None,
            skip_calls: false,
            is_processed: true,
            loc: SourceLocation::default(),
        }
    }
}

/// A resolved identifier occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: String,
    pub loc: SourceLocation,
    pub scope: ScopeId,
    pub variable: VariableId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleScope {
    pub path: String,
    /// Enclosing module; `None` for the global module and ambient libraries.
    pub parent: Option<ModuleId>,
    /// The module's top-level variable scope.
    pub scope: ScopeId,
    pub type_scope: TypeScopeId,
    pub exports: IndexMap<String, VariableId>,
    pub exports_types: IndexMap<String, TypeId>,
    /// Every variable scope the module owns, in creation order.
    pub scopes: Vec<ScopeId>,
    pub references: Vec<Reference>,
}

impl ModuleScope {
    fn vacant() -> Self {
        ModuleScope {
            path: String::new(),
            parent: None,
            scope: ScopeId(u32::MAX),
            type_scope: TypeScopeId::ROOT,
            exports: IndexMap::new(),
            exports_types: IndexMap::new(),
            scopes: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// Arena of all scopes, bindings, modules and types of a session.
pub struct Graph {
    pub types: TypeArena,
    scopes: Vec<VariableScope>,
    variables: Vec<VariableInfo>,
    modules: Vec<ModuleScope>,
    pub global: ModuleId,
    /// `declare module "name"` blocks, by name.
    pub ambient_modules: IndexMap<String, ModuleId>,
    /// Released slots, reused by later allocations.
    free_scopes: Vec<ScopeId>,
    free_variables: Vec<VariableId>,
    free_modules: Vec<ModuleId>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        let mut graph = Graph {
            types: TypeArena::new(),
            scopes: Vec::new(),
            variables: Vec::new(),
            modules: Vec::new(),
            global: ModuleId(0),
            ambient_modules: IndexMap::new(),
            free_scopes: Vec::new(),
            free_variables: Vec::new(),
            free_modules: Vec::new(),
        };
        graph.global = graph.new_module("<global>", None, SourceLocation::default());
        graph
    }

    // =========================================================================
    // Modules
    // =========================================================================

    /// Create a module whose top-level scope is nested in `parent`'s (or a
    /// root when `parent` is `None`).
    pub fn new_module(
        &mut self,
        path: impl Into<String>,
        parent: Option<ModuleId>,
        loc: SourceLocation,
    ) -> ModuleId {
        let id = match self.free_modules.pop() {
            Some(id) => id,
            None => {
                self.modules.push(ModuleScope::vacant());
                ModuleId(self.modules.len() as u32 - 1)
            }
        };
        let (parent_scope, parent_types) = match parent {
            Some(parent) => {
                let module = &self.modules[parent.0 as usize];
                (Some(module.scope), module.type_scope)
            }
            None => (None, TypeScopeId::ROOT),
        };
        let type_scope = self.types.new_scope(parent_types);
        let scope = self.push_scope(VariableScope {
            kind: ScopeKind::Module,
            parent: parent_scope,
            module: id,
            body: IndexMap::new(),
            type_scope,
            throwable: Vec::new(),
            collects_throwable: false,
            declaration: None,
            skip_calls: false,
            is_processed: true,
            loc,
        });
        self.modules[id.0 as usize] = ModuleScope {
            path: path.into(),
            parent,
            scope,
            type_scope,
            exports: IndexMap::new(),
            exports_types: IndexMap::new(),
            scopes: vec![scope],
            references: Vec::new(),
        };
        id
    }

    pub fn module(&self, id: ModuleId) -> &ModuleScope {
        &self.modules[id.0 as usize]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut ModuleScope {
        &mut self.modules[id.0 as usize]
    }

    /// Modules that have not been released.
    pub fn module_count(&self) -> usize {
        self.modules.len() - self.free_modules.len()
    }

    /// Release `module` with its scopes, bindings and types so that later
    /// builds reuse their slots. Refused for the global module, ambient
    /// modules and modules another live module is nested in. Callers must
    /// drop every id they hold into the released module.
    pub fn release_module(&mut self, module: ModuleId) -> bool {
        let free_modules: FxHashSet<ModuleId> = self.free_modules.iter().copied().collect();
        let has_children = self.modules.iter().enumerate().any(|(index, other)| {
            other.parent == Some(module) && !free_modules.contains(&ModuleId(index as u32))
        });
        if module == self.global
            || free_modules.contains(&module)
            || has_children
            || self.ambient_modules.values().any(|&ambient| ambient == module)
        {
            return false;
        }

        let released = std::mem::replace(&mut self.modules[module.0 as usize], ModuleScope::vacant());
        let scopes: FxHashSet<ScopeId> = released.scopes.iter().copied().collect();
        let free_variables: FxHashSet<VariableId> = self.free_variables.iter().copied().collect();
        let variables: Vec<VariableId> = self
            .variables
            .iter()
            .enumerate()
            .map(|(index, info)| (VariableId(index as u32), info))
            .filter(|(id, info)| scopes.contains(&info.parent) && !free_variables.contains(id))
            .map(|(id, _)| id)
            .collect();
        for &id in &variables {
            self.variables[id.0 as usize] = VariableInfo::vacant();
        }

        let type_scopes: Vec<TypeScopeId> = released
            .scopes
            .iter()
            .map(|&id| self.scopes[id.0 as usize].type_scope)
            .collect();
        for &id in &released.scopes {
            self.scopes[id.0 as usize] = VariableScope::vacant();
        }
        let types = self.types.release_scopes(&type_scopes);
        debug!(
            path = %released.path,
            scopes = released.scopes.len(),
            variables = variables.len(),
            types,
            "released module"
        );
        self.free_variables.extend(variables);
        self.free_scopes.extend(released.scopes);
        self.free_modules.push(module);
        true
    }

    pub fn global_scope(&self) -> ScopeId {
        self.module(self.global).scope
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    pub fn new_scope(&mut self, kind: ScopeKind, parent: ScopeId, loc: SourceLocation) -> ScopeId {
        let (module, parent_types) = {
            let parent = &self.scopes[parent.0 as usize];
            (parent.module, parent.type_scope)
        };
        let type_scope = self.types.new_scope(parent_types);
        let id = self.push_scope(VariableScope {
            kind,
            parent: Some(parent),
            module,
            body: IndexMap::new(),
            type_scope,
            throwable: Vec::new(),
            collects_throwable: kind == ScopeKind::Function,
            declaration: None,
            skip_calls: false,
            is_processed: true,
            loc,
        });
        self.modules[module.0 as usize].scopes.push(id);
        id
    }

    fn push_scope(&mut self, scope: VariableScope) -> ScopeId {
        if let Some(id) = self.free_scopes.pop() {
            self.scopes[id.0 as usize] = scope;
            return id;
        }
        self.scopes.push(scope);
        ScopeId(self.scopes.len() as u32 - 1)
    }

    pub fn scope(&self, id: ScopeId) -> &VariableScope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut VariableScope {
        &mut self.scopes[id.0 as usize]
    }

    /// `scope` followed by its ancestors, innermost first.
    pub fn scope_chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            if chain.len() as u32 >= MAX_SCOPE_CHAIN_DEPTH {
                break;
            }
            chain.push(id);
            current = self.scopes[id.0 as usize].parent;
        }
        chain
    }

    /// Nearest scope on the chain that collects thrown types.
    pub fn throwable_collector(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope_chain(scope)
            .into_iter()
            .find(|&id| self.scope(id).collects_throwable)
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Bind a variable in `scope`. A binding of the same name in the same
    /// scope is replaced; bindings in other scopes are untouched.
    pub fn declare(&mut self, scope: ScopeId, info: VariableInfo) -> VariableId {
        let name = info.name.clone();
        let id = self.alloc_variable(VariableInfo {
            parent: scope,
            ..info
        });
        self.scopes[scope.0 as usize].body.insert(name, id);
        id
    }

    /// Allocate a binding that no scope body lists (anonymous default
    /// exports).
    pub fn alloc_variable(&mut self, info: VariableInfo) -> VariableId {
        if let Some(id) = self.free_variables.pop() {
            self.variables[id.0 as usize] = info;
            return id;
        }
        self.variables.push(info);
        VariableId(self.variables.len() as u32 - 1)
    }

    pub fn variable(&self, id: VariableId) -> &VariableInfo {
        &self.variables[id.0 as usize]
    }

    pub fn variable_mut(&mut self, id: VariableId) -> &mut VariableInfo {
        &mut self.variables[id.0 as usize]
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len() - self.free_variables.len()
    }

    /// Resolve `name` from `scope` outward.
    pub fn find_variable(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        self.scope_chain(scope)
            .into_iter()
            .find_map(|id| self.scope(id).body.get(name).copied())
    }

    /// Like [`find_variable`](Self::find_variable), skipping bindings
    /// produced by refinement.
    pub fn find_declared_variable(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        self.scope_chain(scope).into_iter().find_map(|id| {
            self.scope(id)
                .body
                .get(name)
                .copied()
                .filter(|&var| !self.variable(var).meta.changed)
        })
    }

    /// Resolve a type name from a variable scope's type scope.
    pub fn find_type(&self, scope: ScopeId, name: &str) -> Option<TypeId> {
        self.types.find_type(self.scope(scope).type_scope, name)
    }

    /// Display name of a variable's type.
    pub fn type_name(&self, id: VariableId) -> &str {
        self.types.name(self.variable(id).ty)
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod scope_tests;
