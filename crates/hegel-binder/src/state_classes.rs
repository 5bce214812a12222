//! Class declarations.
//!
//! A class yields two types: the nominal instance object, bound as a type
//! under the class name, and the class value (`class X`) holding static
//! members and the construct signature, bound as a variable. Member
//! signatures are collected before any body is analysed so that methods may
//! call each other in any order.

use crate::scope::{ScopeKind, VariableId, VariableInfo};
use crate::state::{BinderState, ClassContext};
use crate::state_functions::FunctionSite;
use hegel_ast::{CallExpression, Class, ClassMember, MethodKind};
use hegel_common::diagnostics::messages;
use hegel_common::{SourceLocation, format_message};
use hegel_solver::{
    FunctionShape, GenericShape, ObjectShape, ParamInfo, PropertyInfo, TypeData, TypeId,
    TypeLowering, TypeScopeId, instantiate_function,
};
use tracing::debug;

impl<'a> BinderState<'a> {
    /// Bind `class` in the current scope; returns its binding and the type
    /// bound under its name.
    pub(crate) fn bind_class(&mut self, class: &'a Class) -> (VariableId, TypeId) {
        let name = class
            .id
            .as_ref()
            .map_or_else(|| "default".to_string(), |id| id.name.clone());
        let outer_types = self.type_scope();
        let previous = self.enter_scope(ScopeKind::Class, class.loc);
        let class_scope = self.scope;
        let inner_types = self.type_scope();

        let type_params = if class.type_parameters.is_empty() {
            Vec::new()
        } else {
            TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source)
                .declare_type_parameters(&class.type_parameters, inner_types)
        };
        let generic = !type_params.is_empty();

        let nominal = self.graph.types.fresh_nominal();
        let instance = self.graph.types.add_named(
            name.clone(),
            TypeData::Object(ObjectShape {
                nominal: Some(nominal),
                ..ObjectShape::default()
            }),
            if generic { inner_types } else { outer_types },
        );
        self.graph.types.get_mut(instance).loc = Some(class.loc);
        let (instance_ref, type_binding) = if generic {
            let target = self.graph.types.add_named(
                name.clone(),
                TypeData::Generic(GenericShape {
                    params: type_params.clone(),
                    body: instance,
                }),
                outer_types,
            );
            self.graph.types.get_mut(target).loc = Some(class.loc);
            let applied = self
                .graph
                .types
                .application(target, type_params.clone(), inner_types);
            (applied, target)
        } else {
            (instance, instance)
        };
        if class.id.is_some() {
            self.graph.types.define(outer_types, name.clone(), type_binding);
        }

        let value = self.graph.types.add_named(
            format!("class {name}"),
            TypeData::Object(ObjectShape::default()),
            outer_types,
        );
        self.graph.types.get_mut(value).loc = Some(class.loc);
        let info = VariableInfo::new(name.clone(), value, previous, class.loc).initialized();
        let variable = match &class.id {
            Some(_) => self.graph.declare(previous, info),
            None => self.graph.alloc_variable(info),
        };
        self.graph.scope_mut(class_scope).declaration = Some(variable);

        let context = self.bind_super_class(class, instance, value, inner_types);
        self.classes.push(context);
        self.declare_variable("this", instance_ref, class.loc, true, true);

        // Signatures.
        let mut constructor_params: Option<Vec<ParamInfo>> = None;
        for member in &class.body {
            match member {
                ClassMember::Property(property) => {
                    let annotated = property
                        .type_annotation
                        .as_ref()
                        .map(|annotation| self.lower_type(annotation));
                    let ty = match (&property.value, annotated) {
                        (Some(init), Some(annotated)) => {
                            let ty = self.infer_expression(init, Some(annotated));
                            self.check_assignable(ty, annotated, init.loc());
                            annotated
                        }
                        (Some(init), None) => {
                            let ty = self.infer_expression(init, None);
                            self.graph.types.widen(ty)
                        }
                        (None, Some(annotated)) => annotated,
                        (None, None) => TypeId::UNKNOWN,
                    };
                    let owner = if property.is_static { value } else { instance };
                    self.set_member(owner, &property.key.name, ty);
                }
                ClassMember::Method(method) => match method.kind {
                    MethodKind::Constructor => {
                        let signature = self.function_signature(&method.function, instance_ref);
                        constructor_params = self
                            .graph
                            .types
                            .get(signature)
                            .as_function()
                            .map(|shape| shape.params.clone());
                    }
                    MethodKind::Method | MethodKind::Get | MethodKind::Set => {
                        let signature = self.function_signature(&method.function, TypeId::UNKNOWN);
                        let ty = match method.kind {
                            MethodKind::Get => self.return_type_of(signature),
                            MethodKind::Set => self
                                .graph
                                .types
                                .get(signature)
                                .as_function()
                                .and_then(|shape| shape.params.first())
                                .map_or(TypeId::UNKNOWN, |param| param.ty),
                            _ => signature,
                        };
                        let owner = if method.is_static { value } else { instance };
                        self.set_member(owner, &method.key.name, ty);
                    }
                },
            }
        }

        let params = match constructor_params {
            Some(params) => params,
            None => self.inherited_constructor_params(context),
        };
        let constructor = self.graph.types.function(
            FunctionShape {
                type_params: type_params.clone(),
                params,
                return_type: instance_ref,
                throws: None,
            },
            if generic { inner_types } else { outer_types },
        );
        if let TypeData::Object(shape) = &mut self.graph.types.get_mut(value).data {
            shape.constructor = Some(constructor);
        }

        // Bodies.
        for member in &class.body {
            let ClassMember::Method(method) = member else {
                continue;
            };
            if method.function.body.is_none() {
                continue;
            }
            let this_type = if method.is_static { value } else { instance_ref };
            let ty = self.infer_function(
                &method.function,
                FunctionSite {
                    this_type: Some(this_type),
                    ..FunctionSite::default()
                },
            );
            let owner = if method.is_static { value } else { instance };
            match method.kind {
                MethodKind::Method => self.set_member(owner, &method.key.name, ty),
                MethodKind::Get if method.function.return_type.is_none() => {
                    let returned = self.return_type_of(ty);
                    self.set_member(owner, &method.key.name, returned);
                }
                MethodKind::Constructor => {
                    if let Some(throws) =
                        self.graph.types.get(ty).as_function().and_then(|f| f.throws)
                        && let TypeData::Function(shape) =
                            &mut self.graph.types.get_mut(constructor).data
                    {
                        shape.throws = Some(throws);
                    }
                }
                _ => {}
            }
        }

        self.graph.types.refresh_name(constructor);
        self.classes.pop();
        self.exit_scope(previous);
        debug!(class = %name, "class bound");
        (variable, type_binding)
    }

    fn bind_super_class(
        &mut self,
        class: &'a Class,
        instance: TypeId,
        value: TypeId,
        inner_types: TypeScopeId,
    ) -> ClassContext {
        let mut context = ClassContext::default();
        let Some(super_ident) = &class.super_class else {
            return context;
        };
        let Some(variable) = self.resolve_identifier(super_ident) else {
            self.report(
                format_message(messages::UNDEFINED_VARIABLE, &[&super_ident.name]),
                super_ident.loc,
            );
            return context;
        };
        let super_value = self.graph.variable(variable).ty;
        let super_instance = match self.graph.types.find_type(inner_types, &super_ident.name) {
            Some(target) => {
                let arguments: Vec<TypeId> = class
                    .super_type_arguments
                    .iter()
                    .map(|argument| self.lower_type(argument))
                    .collect();
                TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source).apply(
                    target,
                    arguments,
                    inner_types,
                    super_ident.loc,
                )
            }
            None => {
                self.report(
                    format_message(messages::UNDEFINED_TYPE, &[&super_ident.name]),
                    super_ident.loc,
                );
                TypeId::ERROR
            }
        };
        if !super_instance.is_error() {
            self.graph.types.get_mut(instance).is_subtype_of = Some(super_instance);
            context.super_instance = Some(super_instance);
        }
        if !super_value.is_error() {
            self.graph.types.get_mut(value).is_subtype_of = Some(super_value);
            context.super_value = Some(super_value);
        }
        context
    }

    /// Constructor parameters of the superclass, specialized to the
    /// arguments given in `extends`.
    fn inherited_constructor_params(&mut self, context: ClassContext) -> Vec<ParamInfo> {
        let Some(constructor) = context
            .super_value
            .and_then(|value| self.graph.types.get(value).as_object())
            .and_then(|shape| shape.constructor)
        else {
            return Vec::new();
        };
        let Some(shape) = self.graph.types.get(constructor).as_function().cloned() else {
            return Vec::new();
        };
        let arguments = match context.super_instance.map(|ty| self.graph.types.data(ty)) {
            Some(TypeData::Application(app)) => app.arguments.clone(),
            _ => Vec::new(),
        };
        if shape.type_params.is_empty() || arguments.is_empty() {
            return shape.params;
        }
        let scope = self.type_scope();
        let specialized =
            instantiate_function(&mut self.graph.types, constructor, &arguments, scope);
        self.graph
            .types
            .get(specialized)
            .as_function()
            .map_or(shape.params, |shape| shape.params.clone())
    }

    fn set_member(&mut self, owner: TypeId, name: &str, ty: TypeId) {
        if let TypeData::Object(shape) = &mut self.graph.types.get_mut(owner).data {
            shape.properties.insert(name.to_string(), PropertyInfo::new(ty));
        }
    }

    fn return_type_of(&self, function: TypeId) -> TypeId {
        self.graph
            .types
            .get(function)
            .as_function()
            .map_or(TypeId::UNKNOWN, |shape| shape.return_type)
    }

    // =========================================================================
    // super
    // =========================================================================

    /// `super` used as a value: the superclass instance.
    pub(crate) fn infer_super(&mut self, loc: SourceLocation) -> TypeId {
        match self.classes.last().and_then(|context| context.super_instance) {
            Some(ty) => ty,
            None => {
                self.report(format_message(messages::UNDEFINED_VARIABLE, &["super"]), loc);
                TypeId::ERROR
            }
        }
    }

    /// `super(...)`: checked against the superclass constructor.
    pub(crate) fn infer_super_call(&mut self, call: &'a CallExpression) -> TypeId {
        let constructor = self
            .classes
            .last()
            .and_then(|context| context.super_value)
            .and_then(|value| self.graph.types.get(value).as_object())
            .and_then(|shape| shape.constructor);
        match constructor {
            Some(constructor) => {
                self.check_call(constructor, call, false);
                TypeId::UNDEFINED
            }
            None => {
                for argument in &call.arguments {
                    self.infer_expression(argument, None);
                }
                self.report(
                    format_message(messages::UNDEFINED_VARIABLE, &["super"]),
                    call.callee.loc(),
                );
                TypeId::ERROR
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/classes_tests.rs"]
mod classes_tests;
