//! Lowering of type annotations to canonical types.
//!
//! Names resolve through the type scope chain of the annotation's position.
//! Unknown names, wrong generic arity and constraint violations are reported
//! as diagnostics and lowered to the error sentinel (constraint violations
//! still produce the application).

use crate::arena::TypeArena;
use crate::compat::is_assignable;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::*;
use hegel_ast::{
    FunctionTypeAnnotation, KeywordType, LiteralTypeValue, TypeAlias, TypeAnnotation,
    TypeParameter,
};
use hegel_common::diagnostics::messages;
use hegel_common::{DiagnosticBag, DiagnosticKind, SourceLocation, format_message};
use indexmap::IndexMap;

pub struct TypeLowering<'a> {
    pub arena: &'a mut TypeArena,
    pub diagnostics: &'a mut DiagnosticBag,
    pub source: &'a str,
}

impl<'a> TypeLowering<'a> {
    pub fn new(
        arena: &'a mut TypeArena,
        diagnostics: &'a mut DiagnosticBag,
        source: &'a str,
    ) -> Self {
        TypeLowering {
            arena,
            diagnostics,
            source,
        }
    }

    fn error(&mut self, message: String, loc: SourceLocation) -> TypeId {
        self.diagnostics
            .report(DiagnosticKind::Type, message, loc, self.source);
        TypeId::ERROR
    }

    pub fn lower(&mut self, annotation: &TypeAnnotation, scope: TypeScopeId) -> TypeId {
        match annotation {
            TypeAnnotation::Keyword { keyword, .. } => keyword_type(*keyword),
            TypeAnnotation::Literal { value, .. } => match value {
                LiteralTypeValue::String(text) => self.arena.literal_string(text),
                LiteralTypeValue::Number(number) => self.arena.literal_number(*number),
                LiteralTypeValue::Boolean(flag) => self.arena.literal_boolean(*flag),
            },
            TypeAnnotation::Reference {
                name,
                type_arguments,
                loc,
            } => {
                let Some(found) = self.arena.find_type(scope, &name.name) else {
                    return self.error(
                        format_message(messages::UNDEFINED_TYPE, &[&name.name]),
                        name.loc,
                    );
                };
                let arguments: Vec<TypeId> = type_arguments
                    .iter()
                    .map(|argument| self.lower(argument, scope))
                    .collect();
                self.apply(found, arguments, scope, *loc)
            }
            TypeAnnotation::Object(object) => {
                let mut properties = IndexMap::new();
                for property in &object.properties {
                    let ty = self.lower(&property.value, scope);
                    properties.insert(
                        property.key.name.clone(),
                        PropertyInfo {
                            ty,
                            optional: property.optional,
                        },
                    );
                }
                let id = self.arena.object(
                    ObjectShape {
                        properties,
                        is_exact: object.exact,
                        ..ObjectShape::default()
                    },
                    scope,
                );
                self.arena.get_mut(id).loc = Some(object.loc);
                id
            }
            TypeAnnotation::Function(function) => self.lower_function(function, scope),
            TypeAnnotation::Union { types, .. } => {
                let members: Vec<TypeId> = types.iter().map(|t| self.lower(t, scope)).collect();
                self.arena.union(members, scope)
            }
            TypeAnnotation::Intersection { types, .. } => {
                let members: Vec<TypeId> = types.iter().map(|t| self.lower(t, scope)).collect();
                self.arena.intersection(members, scope)
            }
            TypeAnnotation::Array { element, .. } => {
                let element = self.lower(element, scope);
                self.array_of(element, scope)
            }
            TypeAnnotation::Nullable { inner, .. } => {
                let inner = self.lower(inner, scope);
                self.arena.nullable(inner, scope)
            }
            TypeAnnotation::Tuple { elements, .. } => {
                let members: Vec<TypeId> =
                    elements.iter().map(|t| self.lower(t, scope)).collect();
                let element = if members.is_empty() {
                    TypeId::NEVER
                } else {
                    self.arena.union(members, scope)
                };
                self.array_of(element, scope)
            }
        }
    }

    /// `Array<element>`, using whichever `Array` is visible from `scope`.
    pub fn array_of(&mut self, element: TypeId, scope: TypeScopeId) -> TypeId {
        let array = self
            .arena
            .find_type(scope, "Array")
            .unwrap_or(TypeId::ERROR);
        self.arena.application(array, vec![element], scope)
    }

    /// Apply `arguments` to a named type, checking arity and constraints.
    pub fn apply(
        &mut self,
        target: TypeId,
        arguments: Vec<TypeId>,
        scope: TypeScopeId,
        loc: SourceLocation,
    ) -> TypeId {
        let TypeData::Generic(generic) = self.arena.data(target) else {
            if !arguments.is_empty() {
                let name = self.arena.name(target).to_string();
                return self.error(format_message(messages::NOT_GENERIC, &[&name]), loc);
            }
            return target;
        };
        let params = generic.params.clone();

        let required = params
            .iter()
            .take_while(|&&param| {
                !matches!(self.arena.data(param), TypeData::Parameter(info) if info.default.is_some())
            })
            .count();
        if arguments.len() > params.len() || arguments.len() < required {
            let name = self.arena.name(target).to_string();
            return self.error(
                format_message(
                    messages::GENERIC_ARITY,
                    &[&name, &params.len().to_string(), &arguments.len().to_string()],
                ),
                loc,
            );
        }

        let subst = TypeSubstitution::from_args(self.arena, &params, &arguments);
        let mut complete = Vec::with_capacity(params.len());
        for &param in &params {
            let argument = subst.get(param).unwrap_or(TypeId::UNKNOWN);
            complete.push(argument);
            let TypeData::Parameter(info) = self.arena.data(param) else {
                continue;
            };
            let param_name = info.name.clone();
            let Some(constraint) = info.constraint else {
                continue;
            };
            let bound = instantiate_type(self.arena, constraint, &subst, scope);
            if !is_assignable(self.arena, argument, bound) {
                let argument_name = self.arena.name(argument).to_string();
                let bound_name = self.arena.name(bound).to_string();
                self.error(
                    format_message(
                        messages::CONSTRAINT_VIOLATION,
                        &[&argument_name, &bound_name, &param_name],
                    ),
                    loc,
                );
            }
        }
        self.arena.application(target, complete, scope)
    }

    fn lower_function(&mut self, function: &FunctionTypeAnnotation, scope: TypeScopeId) -> TypeId {
        let (inner, type_params) = if function.type_parameters.is_empty() {
            (scope, Vec::new())
        } else {
            let inner = self.arena.new_scope(scope);
            let params = self.declare_type_parameters(&function.type_parameters, inner);
            (inner, params)
        };
        let params = function
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| ParamInfo {
                name: param
                    .name
                    .as_ref()
                    .map_or_else(|| format!("arg{index}"), |n| n.name.clone()),
                ty: self.lower(&param.type_annotation, inner),
                optional: param.optional,
                rest: param.rest,
            })
            .collect();
        let return_type = self.lower(&function.return_type, inner);
        let id = self.arena.function(
            FunctionShape {
                type_params,
                params,
                return_type,
                throws: None,
            },
            inner,
        );
        self.arena.get_mut(id).loc = Some(function.loc);
        id
    }

    /// Create `Parameter` types for `params` and bind them in `scope`.
    /// Parameters are bound before their bounds are lowered, so a bound may
    /// mention any parameter of the list.
    pub fn declare_type_parameters(
        &mut self,
        params: &[TypeParameter],
        scope: TypeScopeId,
    ) -> Vec<TypeId> {
        let ids: Vec<TypeId> = params
            .iter()
            .map(|param| {
                let id = self.arena.add_named(
                    param.name.name.clone(),
                    TypeData::Parameter(TypeParamInfo {
                        name: param.name.name.clone(),
                        constraint: None,
                        default: None,
                    }),
                    scope,
                );
                self.arena.get_mut(id).loc = Some(param.loc);
                self.arena.define(scope, param.name.name.clone(), id);
                id
            })
            .collect();
        for (param, &id) in params.iter().zip(&ids) {
            let constraint = param.constraint.as_ref().map(|c| self.lower(c, scope));
            let default = param.default.as_ref().map(|d| self.lower(d, scope));
            if let TypeData::Parameter(info) = &mut self.arena.get_mut(id).data {
                info.constraint = constraint;
                info.default = default;
            }
        }
        ids
    }

    /// Bind a type alias in `scope`. Object and function types created for
    /// the alias take its name; generic aliases become `Generic` types. The
    /// name is bound before the right-hand side is lowered, so aliases may
    /// refer to themselves.
    pub fn define_alias(&mut self, alias: &TypeAlias, scope: TypeScopeId) -> TypeId {
        let name = alias.id.name.clone();
        if alias.type_parameters.is_empty() {
            if let TypeAnnotation::Object(_) = &alias.right {
                let reserved = self.arena.add_named(
                    name.clone(),
                    TypeData::Object(ObjectShape::default()),
                    scope,
                );
                self.arena.define(scope, name.clone(), reserved);
                let lowered = self.lower(&alias.right, scope);
                let data = self.arena.data(lowered).clone();
                let target = self.arena.get_mut(reserved);
                target.data = data;
                target.loc = Some(alias.loc);
                return reserved;
            }
            let mark = self.arena.allocation_mark();
            let lowered = self.lower(&alias.right, scope);
            if self.arena.allocated_since(lowered, mark) && self.arena.get(lowered).is_function() {
                self.arena.get_mut(lowered).name = name.clone();
            }
            self.arena.define(scope, name, lowered);
            return lowered;
        }

        let params_scope = self.arena.new_scope(scope);
        let generic = self.arena.add_named(
            name.clone(),
            TypeData::Generic(GenericShape {
                params: Vec::new(),
                body: TypeId::ERROR,
            }),
            scope,
        );
        self.arena.get_mut(generic).loc = Some(alias.loc);
        self.arena.define(scope, name.clone(), generic);
        let params = self.declare_type_parameters(&alias.type_parameters, params_scope);
        if let TypeData::Generic(shape) = &mut self.arena.get_mut(generic).data {
            shape.params = params.clone();
        }
        let mark = self.arena.allocation_mark();
        let body = self.lower(&alias.right, params_scope);
        if self.arena.allocated_since(body, mark)
            && matches!(
                self.arena.data(body),
                TypeData::Object(_) | TypeData::Function(_)
            )
        {
            self.arena.get_mut(body).name = name;
        }
        if let TypeData::Generic(shape) = &mut self.arena.get_mut(generic).data {
            shape.body = body;
        }
        generic
    }
}

pub const fn keyword_type(keyword: KeywordType) -> TypeId {
    match keyword {
        KeywordType::Number => TypeId::NUMBER,
        KeywordType::String => TypeId::STRING,
        KeywordType::Boolean => TypeId::BOOLEAN,
        KeywordType::BigInt => TypeId::BIGINT,
        KeywordType::Symbol => TypeId::SYMBOL,
        KeywordType::Void | KeywordType::Undefined => TypeId::UNDEFINED,
        KeywordType::Null => TypeId::NULL,
        KeywordType::Unknown | KeywordType::Mixed => TypeId::UNKNOWN,
        KeywordType::Never => TypeId::NEVER,
    }
}
