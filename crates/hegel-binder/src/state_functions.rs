//! Function inference: signatures, bodies, return and throw collection.

use crate::scope::{ScopeKind, VariableId};
use crate::state::{BinderState, FunctionContext};
use hegel_ast::{Function, FunctionBody};
use hegel_common::SourceLocation;
use hegel_solver::{FunctionShape, ParamInfo, TypeData, TypeId, TypeLowering, TypeScopeId};
use tracing::trace;

/// Context a function is inferred in.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FunctionSite {
    /// Binding of a function declaration.
    pub(crate) declaration: Option<VariableId>,
    /// Contextual function type supplying types for unannotated parameters.
    pub(crate) expected: Option<TypeId>,
    /// Type of `this` inside methods.
    pub(crate) this_type: Option<TypeId>,
}

impl<'a> BinderState<'a> {
    /// Analyse `function` in the current scope and return its type.
    pub(crate) fn infer_function(&mut self, function: &'a Function, site: FunctionSite) -> TypeId {
        let previous = self.enter_scope(ScopeKind::Function, function.loc);
        let scope = self.scope;
        self.graph.scope_mut(scope).declaration = site.declaration;
        self.graph.scope_mut(scope).is_processed = false;
        if let Some(variable) = site.declaration {
            self.function_scopes.insert(variable, scope);
        }
        let outer_types = self.graph.scope(previous).type_scope;
        let inner_types = self.type_scope();
        if let Some(this_type) = site.this_type {
            self.declare_variable("this", this_type, function.loc, true, true);
        }

        let type_params = if function.type_parameters.is_empty() {
            Vec::new()
        } else {
            TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source)
                .declare_type_parameters(&function.type_parameters, inner_types)
        };
        let owner = if type_params.is_empty() {
            outer_types
        } else {
            inner_types
        };

        let expected = site
            .expected
            .and_then(|ty| self.graph.types.get(ty).as_function().cloned());
        let mut params = Vec::with_capacity(function.params.len());
        for (index, param) in function.params.iter().enumerate() {
            let annotated = param.type_annotation.as_ref().map(|a| self.lower_type(a));
            let default = param.default.as_ref().map(|default| {
                let ty = self.infer_expression(default, annotated);
                (ty, default.loc())
            });
            let ty = match (annotated, default) {
                (Some(annotated), Some((default, loc))) => {
                    self.check_assignable(default, annotated, loc);
                    annotated
                }
                (Some(annotated), None) => annotated,
                (None, Some((default, _))) => self.graph.types.widen(default),
                (None, None) => expected
                    .as_ref()
                    .and_then(|shape| shape.params.get(index))
                    .map_or(TypeId::UNKNOWN, |p| p.ty),
            };
            let ty = if param.rest && annotated.is_none() && expected.is_none() {
                TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source)
                    .array_of(TypeId::UNKNOWN, inner_types)
            } else {
                ty
            };
            let optional = param.optional || param.default.is_some();
            let binding = if param.optional {
                self.graph.types.union([ty, TypeId::UNDEFINED], inner_types)
            } else {
                ty
            };
            self.declare_variable(&param.name.name, binding, param.loc, false, true);
            params.push(ParamInfo {
                name: param.name.name.clone(),
                ty,
                optional,
                rest: param.rest,
            });
        }

        let annotated_return = function.return_type.as_ref().map(|a| self.lower_type(a));
        let declared_return = annotated_return.map(|ty| {
            if function.is_async {
                self.unwrap_promise(ty)
            } else {
                ty
            }
        });

        // Visible to recursive calls while the body is walked.
        let provisional = self.graph.types.function(
            FunctionShape {
                type_params: type_params.clone(),
                params: params.clone(),
                return_type: annotated_return.unwrap_or(TypeId::UNKNOWN),
                throws: None,
            },
            owner,
        );
        if let Some(variable) = site.declaration {
            self.graph.variable_mut(variable).ty = provisional;
        }

        self.graph.scope_mut(scope).skip_calls = true;
        self.functions.push(FunctionContext {
            declared_return,
            returns: Vec::new(),
        });
        match &function.body {
            Some(FunctionBody::Block(block)) => self.bind_body(&block.body),
            Some(FunctionBody::Expression(expression)) => {
                let ty = self.infer_expression(expression, declared_return);
                self.record_return(ty, expression.loc());
            }
            None => {}
        }
        let context = self.functions.pop();
        let function_scope = self.graph.scope_mut(scope);
        function_scope.skip_calls = false;
        function_scope.is_processed = true;

        let return_type = match annotated_return {
            Some(ty) => ty,
            None if function.body.is_none() => TypeId::UNKNOWN,
            None => {
                let returns = context.map(|c| c.returns).unwrap_or_default();
                let inferred = if returns.is_empty() {
                    TypeId::UNDEFINED
                } else {
                    let widened: Vec<TypeId> =
                        returns.into_iter().map(|ty| self.graph.types.widen(ty)).collect();
                    self.graph.types.union(widened, owner)
                };
                if function.is_async {
                    self.wrap_promise(inferred, owner)
                } else {
                    inferred
                }
            }
        };
        let throwable = self.graph.scope(scope).throwable.clone();
        let throws = (!throwable.is_empty()).then(|| self.graph.types.union(throwable, owner));
        self.exit_scope(previous);

        let ty = self.graph.types.function(
            FunctionShape {
                type_params,
                params,
                return_type,
                throws,
            },
            owner,
        );
        self.graph.types.get_mut(ty).loc = Some(function.loc);
        if let Some(variable) = site.declaration {
            self.graph.variable_mut(variable).ty = ty;
        }
        trace!(ty = %self.graph.types.name(ty), "function inferred");
        ty
    }

    /// Signature of a method from its annotations alone, for members
    /// referenced before their bodies are analysed.
    pub(crate) fn function_signature(
        &mut self,
        function: &Function,
        return_fallback: TypeId,
    ) -> TypeId {
        let outer = self.type_scope();
        let inner = if function.type_parameters.is_empty() {
            outer
        } else {
            self.graph.types.new_scope(outer)
        };
        let type_params = if function.type_parameters.is_empty() {
            Vec::new()
        } else {
            TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source)
                .declare_type_parameters(&function.type_parameters, inner)
        };
        let params = function
            .params
            .iter()
            .map(|param| ParamInfo {
                name: param.name.name.clone(),
                ty: param
                    .type_annotation
                    .as_ref()
                    .map_or(TypeId::UNKNOWN, |a| self.lower_type_in(a, inner)),
                optional: param.optional || param.default.is_some(),
                rest: param.rest,
            })
            .collect();
        let return_type = function
            .return_type
            .as_ref()
            .map_or(return_fallback, |a| self.lower_type_in(a, inner));
        self.graph.types.function(
            FunctionShape {
                type_params,
                params,
                return_type,
                throws: None,
            },
            inner,
        )
    }

    /// Record a `return` argument, checking it against the declared return
    /// type.
    pub(crate) fn record_return(&mut self, ty: TypeId, loc: SourceLocation) {
        if let Some(declared) = self.functions.last().and_then(|c| c.declared_return) {
            self.check_assignable(ty, declared, loc);
        }
        if let Some(context) = self.functions.last_mut() {
            context.returns.push(ty);
        }
    }

    /// Add a thrown type to the nearest collecting scope.
    pub(crate) fn add_throwable(&mut self, ty: TypeId) {
        let Some(collector) = self.graph.throwable_collector(self.scope) else {
            return;
        };
        let throwable = &mut self.graph.scope_mut(collector).throwable;
        if !throwable.contains(&ty) {
            throwable.push(ty);
        }
    }

    // =========================================================================
    // Promises
    // =========================================================================

    fn promise_type(&self) -> Option<TypeId> {
        self.graph
            .find_type(self.scope, "Promise")
            .filter(|&ty| matches!(self.graph.types.data(ty), TypeData::Generic(_)))
    }

    pub(crate) fn wrap_promise(&mut self, ty: TypeId, scope: TypeScopeId) -> TypeId {
        match self.promise_type() {
            Some(promise) => self.graph.types.application(promise, vec![ty], scope),
            None => ty,
        }
    }

    /// `T` for `Promise<T>`; other types are returned unchanged.
    pub(crate) fn unwrap_promise(&self, ty: TypeId) -> TypeId {
        let Some(promise) = self.promise_type() else {
            return ty;
        };
        match self.graph.types.data(ty) {
            TypeData::Application(app) if app.target == promise && app.arguments.len() == 1 => {
                app.arguments[0]
            }
            _ => ty,
        }
    }
}
