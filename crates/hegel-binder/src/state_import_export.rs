//! Imports, exports and ambient module declarations.

use crate::scope::{Meta, ModuleId, VariableId, VariableInfo};
use crate::state::{BinderState, ImportTarget, MalformedTree};
use crate::state_functions::FunctionSite;
use hegel_ast::{
    DeclareModule, ExportDefaultDeclaration, ExportDefaultKind, ExportNamedDeclaration,
    Identifier, ImportDeclaration, ImportKind, ImportSpecifier, Statement, StringLiteral,
};
use hegel_common::diagnostics::messages;
use hegel_common::{SourceLocation, format_message};
use hegel_solver::{ObjectShape, PropertyInfo, TypeId};
use indexmap::IndexMap;
use tracing::{debug, trace};

impl<'a> BinderState<'a> {
    // =========================================================================
    // Imports
    // =========================================================================

    /// The module an import source refers to: a module resolved by the
    /// caller, else a `declare module` block of that name.
    fn import_target(&mut self, source: &StringLiteral) -> Option<ModuleId> {
        match self.imports.get(&source.value) {
            Some(ImportTarget::Module(module)) => return Some(*module),
            Some(ImportTarget::Failed) => return None,
            None => {}
        }
        if let Some(&module) = self.graph.ambient_modules.get(&source.value) {
            return Some(module);
        }
        self.report_resolution(
            format_message(messages::PATH_CANNOT_BE_RESOLVED, &[&source.value]),
            source.loc,
        );
        None
    }

    pub(crate) fn bind_import(&mut self, import: &'a ImportDeclaration) {
        let target = self.import_target(&import.source);
        if let Some(target) = target {
            self.link_type_scope(target);
        }
        let path = &import.source.value;
        for specifier in &import.specifiers {
            match specifier {
                ImportSpecifier::Named {
                    imported, local, ..
                } => self.import_binding(target, path, &imported.name, local, import.import_kind),
                ImportSpecifier::Default { local, .. } => {
                    self.import_binding(target, path, "default", local, import.import_kind);
                }
                ImportSpecifier::Namespace { local, .. } => self.import_namespace(target, local),
            }
        }
    }

    fn import_binding(
        &mut self,
        target: Option<ModuleId>,
        path: &str,
        name: &str,
        local: &Identifier,
        kind: ImportKind,
    ) {
        let Some(target) = target else {
            self.declare_variable(&local.name, TypeId::ERROR, local.loc, true, true);
            return;
        };
        let module = self.graph.module(target);
        let variable = module
            .exports
            .get(name)
            .copied()
            .filter(|_| kind == ImportKind::Value);
        let ty = module.exports_types.get(name).copied();
        if variable.is_none() && ty.is_none() {
            self.report_resolution(
                format_message(messages::MISSING_EXPORT, &[path, name]),
                local.loc,
            );
            self.declare_variable(&local.name, TypeId::ERROR, local.loc, true, true);
            return;
        }
        if let Some(variable) = variable {
            let mut info = self.graph.variable(variable).clone();
            info.name = local.name.clone();
            info.is_constant = true;
            info.meta = Meta::new(local.loc);
            self.graph.declare(self.scope, info);
        }
        if let Some(ty) = ty {
            let scope = self.type_scope();
            self.graph.types.define(scope, local.name.clone(), ty);
        }
        trace!(name, local = %local.name, "imported");
    }

    /// `import * as ns`: an object of the module's value exports, and its
    /// type exports bound as `ns.Name`.
    fn import_namespace(&mut self, target: Option<ModuleId>, local: &Identifier) {
        let Some(target) = target else {
            self.declare_variable(&local.name, TypeId::ERROR, local.loc, true, true);
            return;
        };
        let module = self.graph.module(target);
        let properties: IndexMap<String, PropertyInfo> = module
            .exports
            .iter()
            .map(|(name, &variable)| {
                (name.clone(), PropertyInfo::new(self.graph.variable(variable).ty))
            })
            .collect();
        let types: Vec<(String, TypeId)> = module
            .exports_types
            .iter()
            .map(|(name, &ty)| (format!("{}.{name}", local.name), ty))
            .collect();
        let scope = self.type_scope();
        let namespace = self
            .graph
            .types
            .object(ObjectShape::with_properties(properties), scope);
        self.declare_variable(&local.name, namespace, local.loc, true, true);
        for (name, ty) in types {
            self.graph.types.define(scope, name, ty);
        }
    }

    /// Make types of `target` count as visible from this module's types.
    fn link_type_scope(&mut self, target: ModuleId) {
        let imported = self.graph.module(target).type_scope;
        let own = self.graph.module(self.module).type_scope;
        let mixed = &mut self.graph.types.scope_mut(own).mixed_from;
        if !mixed.contains(&imported) {
            mixed.push(imported);
        }
    }

    // =========================================================================
    // Exports
    // =========================================================================

    pub(crate) fn bind_export_named(&mut self, export: &'a ExportNamedDeclaration) {
        if let Some(declaration) = &export.declaration {
            self.bind_exported_declaration(declaration, export);
            return;
        }

        let source = match &export.source {
            Some(source) => match self.import_target(source) {
                Some(target) => Some((target, source.value.as_str())),
                None => return,
            },
            None => None,
        };
        let values = export.export_kind == ImportKind::Value;
        for specifier in &export.specifiers {
            let (variable, ty) = match source {
                Some((target, _)) => {
                    let module = self.graph.module(target);
                    (
                        module.exports.get(&specifier.local.name).copied(),
                        module.exports_types.get(&specifier.local.name).copied(),
                    )
                }
                None => (
                    self.resolve_identifier(&specifier.local),
                    self.graph.find_type(self.scope, &specifier.local.name),
                ),
            };
            let variable = variable.filter(|_| values);
            if variable.is_none() && ty.is_none() {
                match source {
                    Some((_, path)) => self.report_resolution(
                        format_message(messages::MISSING_EXPORT, &[path, &specifier.local.name]),
                        specifier.local.loc,
                    ),
                    None => self.report(
                        format_message(messages::UNDEFINED_VARIABLE, &[&specifier.local.name]),
                        specifier.local.loc,
                    ),
                }
                continue;
            }
            let exported = specifier.exported.name.clone();
            let module = self.graph.module_mut(self.module);
            if let Some(variable) = variable {
                module.exports.insert(exported.clone(), variable);
            }
            if let Some(ty) = ty {
                module.exports_types.insert(exported, ty);
            }
        }
    }

    fn bind_exported_declaration(
        &mut self,
        declaration: &'a Statement,
        export: &ExportNamedDeclaration,
    ) {
        let mut values: Vec<String> = Vec::new();
        let mut types: Vec<String> = Vec::new();
        match declaration {
            Statement::VariableDeclaration(declaration) => {
                values.extend(declaration.declarations.iter().map(|d| d.id.name.clone()));
            }
            Statement::FunctionDeclaration(function) => {
                values.extend(function.id.iter().map(|id| id.name.clone()));
            }
            Statement::ClassDeclaration(class) => {
                values.extend(class.id.iter().map(|id| id.name.clone()));
                types.extend(class.id.iter().map(|id| id.name.clone()));
            }
            Statement::TypeAlias(alias) => types.push(alias.id.name.clone()),
            _ => {
                self.malformed(MalformedTree::InvalidExportDeclaration { loc: export.loc });
                return;
            }
        }
        self.bind_statement(declaration);
        for name in values {
            if let Some(&variable) = self.graph.scope(self.scope).body.get(&name) {
                self.graph.module_mut(self.module).exports.insert(name, variable);
            }
        }
        for name in types {
            if let Some(ty) = self.graph.find_type(self.scope, &name) {
                self.graph.module_mut(self.module).exports_types.insert(name, ty);
            }
        }
    }

    pub(crate) fn bind_export_default(&mut self, export: &'a ExportDefaultDeclaration) {
        let variable = match &export.declaration {
            ExportDefaultKind::Function(function) => match &function.id {
                Some(id) => {
                    self.bind_function_declaration(function);
                    self.graph.scope(self.scope).body.get(&id.name).copied()
                }
                None => {
                    let ty = self.infer_function(function, FunctionSite::default());
                    Some(self.default_binding(ty, function.loc))
                }
            },
            ExportDefaultKind::Class(class) => {
                let (variable, ty) = self.bind_class(class);
                self.graph
                    .module_mut(self.module)
                    .exports_types
                    .insert("default".to_string(), ty);
                Some(variable)
            }
            ExportDefaultKind::Expression(expression) => {
                let ty = self.infer_expression(expression, None);
                Some(self.default_binding(ty, expression.loc()))
            }
        };
        if let Some(variable) = variable {
            self.graph
                .module_mut(self.module)
                .exports
                .insert("default".to_string(), variable);
        }
    }

    fn default_binding(&mut self, ty: TypeId, loc: SourceLocation) -> VariableId {
        let info = VariableInfo::new("default", ty, self.scope, loc)
            .constant()
            .initialized();
        self.graph.alloc_variable(info)
    }

    // =========================================================================
    // Ambient modules
    // =========================================================================

    /// Bind `declare module "name" { ... }` as a module nested in the current
    /// one, exporting all of its top-level bindings.
    pub(crate) fn bind_declare_module(&mut self, declaration: &'a DeclareModule) {
        if self.scope != self.module_scope() {
            self.malformed(MalformedTree::NestedModuleDeclaration {
                loc: declaration.loc,
            });
            return;
        }
        let name = declaration.name.value.clone();
        let module = self
            .graph
            .new_module(name.clone(), Some(self.module), declaration.loc);
        self.graph.ambient_modules.insert(name.clone(), module);

        let previous_module = std::mem::replace(&mut self.module, module);
        let previous_scope = std::mem::replace(&mut self.scope, self.graph.module(module).scope);
        self.bind_body(&declaration.body);

        let scope = self.graph.module(module).scope;
        let type_scope = self.graph.module(module).type_scope;
        let values: Vec<(String, VariableId)> = self
            .graph
            .scope(scope)
            .body
            .iter()
            .map(|(name, &variable)| (name.clone(), variable))
            .collect();
        let types: Vec<(String, TypeId)> = self
            .graph
            .types
            .scope(type_scope)
            .body
            .iter()
            .map(|(name, &ty)| (name.clone(), ty))
            .collect();
        let ambient = self.graph.module_mut(module);
        for (name, variable) in values {
            ambient.exports.entry(name).or_insert(variable);
        }
        for (name, ty) in types {
            ambient.exports_types.entry(name).or_insert(ty);
        }

        self.module = previous_module;
        self.scope = previous_scope;
        debug!(module = %name, "ambient module bound");
    }
}

#[cfg(test)]
#[path = "../tests/import_export_tests.rs"]
mod import_export_tests;
