//! Statement binding: hoisting, declarations, control flow, try/throw.

use crate::scope::ScopeKind;
use crate::state::{BinderState, MalformedTree, PendingFunction};
use crate::state_functions::FunctionSite;
use hegel_ast::{
    ExportDefaultKind, ForInit, Function, Statement, TryStatement, UnknownNode,
    VariableDeclaration, VariableKind,
};
use hegel_common::diagnostics::messages;
use hegel_common::format_message;
use hegel_solver::{TypeId, TypeLowering};
use tracing::trace;

impl<'a> BinderState<'a> {
    // =========================================================================
    // Hoisting
    // =========================================================================

    /// Bind type aliases and pre-register function declarations of a
    /// statement list before any of its statements is walked.
    pub(crate) fn hoist_declarations(&mut self, body: &'a [Statement]) {
        for statement in body {
            match statement {
                Statement::TypeAlias(alias) => self.bind_type_alias(alias),
                Statement::FunctionDeclaration(function) => self.hoist_function(function),
                Statement::ExportNamed(export) => match export.declaration.as_deref() {
                    Some(Statement::TypeAlias(alias)) => self.bind_type_alias(alias),
                    Some(Statement::FunctionDeclaration(function)) => {
                        self.hoist_function(function);
                    }
                    _ => {}
                },
                Statement::ExportDefault(export) => {
                    if let ExportDefaultKind::Function(function) = &export.declaration {
                        self.hoist_function(function);
                    }
                }
                _ => {}
            }
        }
    }

    fn hoist_function(&mut self, function: &'a Function) {
        let Some(id) = &function.id else {
            return;
        };
        let variable = self.declare_variable(&id.name, TypeId::UNKNOWN, function.loc, false, true);
        self.pending.insert(
            variable,
            PendingFunction {
                function,
                scope: self.scope,
            },
        );
    }

    fn bind_type_alias(&mut self, alias: &hegel_ast::TypeAlias) {
        let scope = self.type_scope();
        TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source)
            .define_alias(alias, scope);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn bind_statement(&mut self, statement: &'a Statement) {
        match statement {
            Statement::VariableDeclaration(declaration) => {
                self.bind_variable_declaration(declaration);
            }
            Statement::FunctionDeclaration(function) => self.bind_function_declaration(function),
            Statement::ClassDeclaration(class) => {
                self.bind_class(class);
            }
            // Bound while hoisting.
            Statement::TypeAlias(_) | Statement::Empty { .. } => {}
            Statement::DeclareModule(declaration) => {
                let ambient = self.graph.ambient_modules.values().any(|&m| m == self.module);
                if ambient || self.scope != self.module_scope() {
                    self.malformed(MalformedTree::NestedModuleDeclaration {
                        loc: declaration.loc,
                    });
                }
            }
            Statement::Block(block) => {
                let previous = self.enter_scope(ScopeKind::Block, block.loc);
                self.bind_body(&block.body);
                self.exit_scope(previous);
            }
            Statement::If(node) => {
                self.infer_expression(&node.test, None);
                self.bind_branch(&node.consequent, &node.test, true);
                if let Some(alternate) = &node.alternate {
                    self.bind_branch(alternate, &node.test, false);
                }
            }
            Statement::While(node) => {
                self.infer_expression(&node.test, None);
                self.bind_branch(&node.body, &node.test, true);
            }
            Statement::For(node) => {
                let previous = self.enter_scope(ScopeKind::Block, node.loc);
                match &node.init {
                    Some(ForInit::Variable(declaration)) => {
                        self.bind_variable_declaration(declaration);
                    }
                    Some(ForInit::Expression(expression)) => {
                        self.infer_expression(expression, None);
                    }
                    None => {}
                }
                if let Some(test) = &node.test {
                    self.infer_expression(test, None);
                }
                if let Some(update) = &node.update {
                    self.infer_expression(update, None);
                }
                match &node.test {
                    Some(test) => self.bind_branch(&node.body, test, true),
                    None => self.bind_statement(&node.body),
                }
                self.exit_scope(previous);
            }
            Statement::Return(node) => {
                let expected = self.functions.last().and_then(|c| c.declared_return);
                let ty = match &node.argument {
                    Some(argument) => self.infer_expression(argument, expected),
                    None => TypeId::UNDEFINED,
                };
                let loc = node.argument.as_ref().map_or(node.loc, |a| a.loc());
                self.record_return(ty, loc);
            }
            Statement::Throw(node) => {
                let ty = self.infer_expression(&node.argument, None);
                let ty = self.graph.types.widen(ty);
                self.add_throwable(ty);
            }
            Statement::Try(node) => self.bind_try(node),
            Statement::Expression(node) => {
                self.infer_expression(&node.expression, None);
            }
            Statement::Import(import) => self.bind_import(import),
            Statement::ExportNamed(export) => self.bind_export_named(export),
            Statement::ExportDefault(export) => self.bind_export_default(export),
            Statement::Unknown(node) => self.report_unsupported(node),
        }
    }

    pub(crate) fn report_unsupported(&mut self, node: &UnknownNode) {
        self.report(
            format_message(messages::UNSUPPORTED_SYNTAX, &[&node.kind]),
            node.loc,
        );
    }

    pub(crate) fn bind_variable_declaration(&mut self, declaration: &'a VariableDeclaration) {
        let is_constant = declaration.kind == VariableKind::Const;
        for declarator in &declaration.declarations {
            let annotated = declarator
                .type_annotation
                .as_ref()
                .map(|annotation| self.lower_type(annotation));
            let ty = match (&declarator.init, annotated) {
                (Some(init), Some(annotated)) => {
                    let ty = self.infer_expression(init, Some(annotated));
                    self.check_assignable(ty, annotated, init.loc());
                    annotated
                }
                (Some(init), None) => {
                    let ty = self.infer_expression(init, None);
                    if is_constant {
                        ty
                    } else {
                        self.graph.types.widen(ty)
                    }
                }
                (None, Some(annotated)) => annotated,
                (None, None) => TypeId::UNKNOWN,
            };
            self.declare_variable(
                &declarator.id.name,
                ty,
                declarator.loc,
                is_constant,
                declarator.init.is_some() || declaration.declare,
            );
        }
    }

    /// Analyse a hoisted function at its declaration unless a reference
    /// already did.
    pub(crate) fn bind_function_declaration(&mut self, function: &'a Function) {
        let hoisted = self
            .pending
            .iter()
            .find(|(_, pending)| std::ptr::eq(pending.function, function))
            .map(|(&variable, _)| variable);
        match hoisted {
            Some(variable) => self.ensure_processed(variable),
            None if function.id.is_none() => {
                self.infer_function(function, FunctionSite::default());
            }
            None => trace!("function already analysed"),
        }
    }

    /// Bind `statement` in a block scope holding the refinements `test`
    /// implies when it evaluates to `truthy`.
    pub(crate) fn bind_branch(
        &mut self,
        statement: &'a Statement,
        test: &'a hegel_ast::Expression,
        truthy: bool,
    ) {
        let previous = self.enter_scope(ScopeKind::Block, statement.loc());
        self.apply_refinements(test, truthy);
        match statement {
            Statement::Block(block) => self.bind_body(&block.body),
            other => {
                self.hoist_declarations(std::slice::from_ref(other));
                self.bind_statement(other);
                self.flush_pending(self.scope);
            }
        }
        self.exit_scope(previous);
    }

    fn bind_try(&mut self, node: &'a TryStatement) {
        let previous = self.enter_scope(ScopeKind::Block, node.block.loc);
        let try_scope = self.scope;
        self.graph.scope_mut(try_scope).collects_throwable = true;
        self.bind_body(&node.block.body);
        self.exit_scope(previous);
        let thrown = self.graph.scope(try_scope).throwable.clone();

        match &node.handler {
            Some(handler) => {
                let previous = self.enter_scope(ScopeKind::Block, handler.loc);
                if let Some(param) = &handler.param {
                    let ty = if thrown.is_empty() {
                        TypeId::UNKNOWN
                    } else {
                        let scope = self.type_scope();
                        self.graph.types.union(thrown, scope)
                    };
                    self.declare_variable(&param.name, ty, param.loc, false, true);
                }
                self.bind_body(&handler.body.body);
                self.exit_scope(previous);
            }
            None => {
                for ty in thrown {
                    self.add_throwable(ty);
                }
            }
        }

        if let Some(finalizer) = &node.finalizer {
            let previous = self.enter_scope(ScopeKind::Block, finalizer.loc);
            self.bind_body(&finalizer.body);
            self.exit_scope(previous);
        }
    }
}
