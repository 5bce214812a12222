//! Expression inference.
//!
//! Every expression gets a type; failures are reported and replaced by the
//! error sentinel so that analysis continues.

use crate::scope::{Reference, ScopeKind, VariableInfo};
use crate::state::BinderState;
use crate::state_functions::FunctionSite;
use hegel_ast::{
    ArrayExpression, AssignmentExpression, BinaryExpression, BinaryOperator, CallExpression,
    ConditionalExpression, Expression, Identifier, LogicalExpression, LogicalOperator,
    MemberExpression, MemberProperty, ObjectExpression, ObjectMember, UnaryExpression,
    UnaryOperator, UpdateExpression,
};
use hegel_common::diagnostics::messages;
use hegel_common::{SourceLocation, format_message};
use hegel_solver::{
    FunctionShape, LiteralValue, ObjectShape, PropertyInfo, TypeData, TypeId, find_property,
    infer_type_arguments, instantiate_function, instantiate_type, is_assignable,
    resolve_application, wrapper_class_name, TypeSubstitution,
};
use indexmap::IndexMap;
use tracing::trace;

/// How a type behaves as an operand of arithmetic and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Number,
    BigInt,
    String,
    /// `unknown` or an unconstrained type parameter; accepted without a
    /// diagnostic.
    Lenient,
    Error,
    Other,
}

impl<'a> BinderState<'a> {
    pub(crate) fn infer_expression(
        &mut self,
        expression: &'a Expression,
        expected: Option<TypeId>,
    ) -> TypeId {
        if !self.expr_depth.enter() {
            self.report(messages::EXPRESSION_TOO_DEEP.to_string(), expression.loc());
            return TypeId::ERROR;
        }
        let ty = self.infer_expression_kind(expression, expected);
        self.expr_depth.leave();
        ty
    }

    fn infer_expression_kind(
        &mut self,
        expression: &'a Expression,
        expected: Option<TypeId>,
    ) -> TypeId {
        match expression {
            Expression::Identifier(ident) => self.infer_identifier(ident),
            Expression::NumericLiteral(literal) => self.graph.types.literal_number(literal.value),
            Expression::StringLiteral(literal) => self.graph.types.literal_string(&literal.value),
            Expression::BooleanLiteral(literal) => self.graph.types.literal_boolean(literal.value),
            Expression::NullLiteral { .. } => TypeId::NULL,
            Expression::TemplateLiteral(template) => {
                for part in &template.expressions {
                    self.infer_expression(part, None);
                }
                TypeId::STRING
            }
            Expression::This { loc } => match self.graph.find_variable(self.scope, "this") {
                Some(variable) => self.graph.variable(variable).ty,
                None => {
                    self.report(messages::THIS_OUTSIDE_CLASS.to_string(), *loc);
                    TypeId::ERROR
                }
            },
            Expression::Array(array) => self.infer_array(array, expected),
            Expression::Object(object) => self.infer_object(object, expected),
            Expression::Function(function) => self.infer_function(
                function,
                FunctionSite {
                    expected,
                    ..FunctionSite::default()
                },
            ),
            Expression::Call(call) => self.infer_call(call),
            Expression::New(call) => self.infer_new(call),
            Expression::Member(member) => self.infer_member(member),
            Expression::Unary(unary) => self.infer_unary(unary),
            Expression::Update(update) => self.infer_update(update),
            Expression::Binary(binary) => self.infer_binary(binary),
            Expression::Logical(logical) => self.infer_logical(logical, expected),
            Expression::Conditional(conditional) => self.infer_conditional(conditional, expected),
            Expression::Assignment(assignment) => self.infer_assignment(assignment),
            Expression::Sequence(sequence) => {
                let mut ty = TypeId::UNDEFINED;
                for part in &sequence.expressions {
                    ty = self.infer_expression(part, None);
                }
                ty
            }
            Expression::TypeCast(cast) => {
                let target = self.lower_type(&cast.type_annotation);
                let ty = self.infer_expression(&cast.expression, Some(target));
                self.check_assignable(ty, target, cast.expression.loc());
                target
            }
            Expression::Unknown(node) if node.kind == "Super" => self.infer_super(node.loc),
            Expression::Unknown(node) => {
                self.report_unsupported(node);
                TypeId::ERROR
            }
        }
    }

    fn infer_identifier(&mut self, ident: &Identifier) -> TypeId {
        if let Some(variable) = self.resolve_identifier(ident) {
            return self.graph.variable(variable).ty;
        }
        if ident.name == "undefined" {
            return TypeId::UNDEFINED;
        }
        self.report(
            format_message(messages::UNDEFINED_VARIABLE, &[&ident.name]),
            ident.loc,
        );
        TypeId::ERROR
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn infer_array(&mut self, array: &'a ArrayExpression, expected: Option<TypeId>) -> TypeId {
        let expected_element = expected.and_then(|ty| self.array_element(ty));
        let mut elements = Vec::with_capacity(array.elements.len());
        for element in &array.elements {
            let ty = self.infer_expression(element, expected_element);
            let ty = if expected_element.is_some() {
                ty
            } else {
                self.graph.types.widen(ty)
            };
            elements.push(ty);
        }
        let scope = self.type_scope();
        let element = if elements.is_empty() {
            expected_element.unwrap_or(TypeId::UNKNOWN)
        } else {
            self.graph.types.union(elements, scope)
        };
        self.array_of(element)
    }

    pub(crate) fn array_of(&mut self, element: TypeId) -> TypeId {
        let scope = self.type_scope();
        hegel_solver::TypeLowering::new(&mut self.graph.types, self.diagnostics, &self.source)
            .array_of(element, scope)
    }

    /// Element type of an `Array<T>` application.
    pub(crate) fn array_element(&self, ty: TypeId) -> Option<TypeId> {
        match self.graph.types.data(ty) {
            TypeData::Application(app)
                if app.arguments.len() == 1 && self.graph.types.name(app.target) == "Array" =>
            {
                Some(app.arguments[0])
            }
            _ => None,
        }
    }

    /// Object literals get their own scope listing the properties; values
    /// and methods are inferred in the enclosing scope.
    fn infer_object(&mut self, object: &'a ObjectExpression, expected: Option<TypeId>) -> TypeId {
        let object_scope = self.graph.new_scope(ScopeKind::Object, self.scope, object.loc);
        let mut properties = IndexMap::new();
        for member in &object.properties {
            match member {
                ObjectMember::Property {
                    key, value, loc, ..
                } => {
                    let expected_property = self.expected_property(expected, &key.name);
                    let ty = self.infer_expression(value, expected_property);
                    let ty = if expected_property.is_some() {
                        ty
                    } else {
                        self.graph.types.widen(ty)
                    };
                    let info = VariableInfo::new(&key.name, ty, object_scope, *loc);
                    self.graph.declare(object_scope, info);
                    properties.insert(key.name.clone(), PropertyInfo::new(ty));
                }
                ObjectMember::Method { key, function, .. } => {
                    let signature = self.function_signature(function, TypeId::UNKNOWN);
                    properties.insert(key.name.clone(), PropertyInfo::new(signature));
                }
            }
        }
        let scope = self.type_scope();
        let object_ty = self
            .graph
            .types
            .object(ObjectShape::with_properties(properties), scope);
        self.graph.types.get_mut(object_ty).loc = Some(object.loc);

        for member in &object.properties {
            let ObjectMember::Method { key, function, loc } = member else {
                continue;
            };
            let expected_method = self.expected_property(expected, &key.name);
            let ty = self.infer_function(
                function,
                FunctionSite {
                    expected: expected_method,
                    this_type: Some(object_ty),
                    declaration: None,
                },
            );
            let info = VariableInfo::new(&key.name, ty, object_scope, *loc);
            self.graph.declare(object_scope, info);
            if let TypeData::Object(shape) = &mut self.graph.types.get_mut(object_ty).data {
                shape.properties.insert(key.name.clone(), PropertyInfo::new(ty));
            }
        }
        self.graph.types.refresh_name(object_ty);
        object_ty
    }

    fn expected_property(&mut self, expected: Option<TypeId>, name: &str) -> Option<TypeId> {
        let expected = expected?;
        find_property(&mut self.graph.types, expected, name).map(|property| property.ty)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn infer_call(&mut self, call: &'a CallExpression) -> TypeId {
        if matches!(&*call.callee, Expression::Unknown(node) if node.kind == "Super") {
            return self.infer_super_call(call);
        }
        let callee = self.infer_expression(&call.callee, None);
        let skip = self.is_skipped_call(&call.callee);
        let target = self.callable_type(callee);
        match self.graph.types.data(target) {
            TypeData::Function(_) => self.check_call(target, call, skip),
            TypeData::Error => {
                self.infer_arguments(call);
                TypeId::ERROR
            }
            _ => {
                let name = self.type_name(callee);
                self.report(
                    format_message(messages::NOT_CALLABLE, &[&name]),
                    call.callee.loc(),
                );
                self.infer_arguments(call);
                TypeId::ERROR
            }
        }
    }

    fn infer_new(&mut self, call: &'a CallExpression) -> TypeId {
        let callee = self.infer_expression(&call.callee, None);
        let target = resolve_application(&mut self.graph.types, callee);
        let constructor = match self.graph.types.data(target) {
            TypeData::Object(shape) => shape.constructor,
            TypeData::Error => {
                self.infer_arguments(call);
                return TypeId::ERROR;
            }
            _ => None,
        };
        match constructor {
            Some(constructor) => self.check_call(constructor, call, false),
            None => {
                let name = self.type_name(callee);
                self.report(
                    format_message(messages::NOT_CONSTRUCTABLE, &[&name]),
                    call.callee.loc(),
                );
                self.infer_arguments(call);
                TypeId::ERROR
            }
        }
    }

    fn infer_arguments(&mut self, call: &'a CallExpression) {
        for argument in &call.arguments {
            self.infer_expression(argument, None);
        }
    }

    /// The function type a callee of type `ty` is called through.
    fn callable_type(&mut self, ty: TypeId) -> TypeId {
        let ty = resolve_application(&mut self.graph.types, ty);
        match self.graph.types.data(ty) {
            TypeData::Parameter(info) => match info.constraint {
                Some(constraint) => self.callable_type(constraint),
                None => ty,
            },
            TypeData::Intersection(members) => members
                .iter()
                .copied()
                .find(|&member| self.graph.types.get(member).is_function())
                .unwrap_or(ty),
            _ => ty,
        }
    }

    /// Whether `callee` names a function whose own signature is still being
    /// inferred.
    fn is_skipped_call(&self, callee: &Expression) -> bool {
        let Some(ident) = callee.as_identifier() else {
            return false;
        };
        self.graph
            .find_variable(self.scope, &ident.name)
            .and_then(|variable| self.function_scopes.get(&variable))
            .map(|&scope| self.graph.scope(scope))
            .is_some_and(|scope| scope.skip_calls || !scope.is_processed)
    }

    /// Check a call of `function` and return its result type. Generic
    /// callees are instantiated with explicit or inferred type arguments;
    /// function-expression arguments of generic calls are inferred against
    /// the partially instantiated signature.
    pub(crate) fn check_call(
        &mut self,
        function: TypeId,
        call: &'a CallExpression,
        skip: bool,
    ) -> TypeId {
        let Some(mut shape) = self.graph.types.get(function).as_function().cloned() else {
            return TypeId::ERROR;
        };
        let generic = !shape.type_params.is_empty();
        let mut arguments: Vec<Option<TypeId>> = Vec::with_capacity(call.arguments.len());
        for (index, argument) in call.arguments.iter().enumerate() {
            if generic && matches!(argument, Expression::Function(_)) {
                arguments.push(None);
                continue;
            }
            let expected = if generic {
                None
            } else {
                self.param_type_at(&shape, index)
            };
            arguments.push(Some(self.infer_expression(argument, expected)));
        }
        if skip {
            trace!("re-entrant call, signature is provisional");
            return shape.return_type;
        }

        let given = arguments.len();
        let required = shape.required_arity();
        let maximum = shape.max_arity();
        if given < required || maximum.is_some_and(|max| given > max) {
            let expected_count = if given < required {
                required
            } else {
                maximum.unwrap_or(required)
            };
            self.report(
                format_message(
                    messages::ARITY_MISMATCH,
                    &[&expected_count.to_string(), &given.to_string()],
                ),
                call.loc,
            );
        }

        if generic {
            let explicit: Vec<TypeId> = call
                .type_arguments
                .iter()
                .map(|argument| self.lower_type(argument))
                .collect();
            let mut instantiated =
                self.instantiate_call(function, &shape, &explicit, &arguments, call);
            if arguments.iter().any(Option::is_none) {
                if let Some(partial) = self.graph.types.get(instantiated).as_function().cloned() {
                    for (index, argument) in call.arguments.iter().enumerate() {
                        if arguments[index].is_none() {
                            let expected = self.param_type_at(&partial, index);
                            arguments[index] = Some(self.infer_expression(argument, expected));
                        }
                    }
                }
                instantiated =
                    self.instantiate_call(function, &shape, &explicit, &arguments, call);
            }
            match self.graph.types.get(instantiated).as_function().cloned() {
                Some(specialized) => shape = specialized,
                None => {
                    let name = self.type_name(function);
                    self.report(
                        format_message(messages::INSTANTIATION_TOO_DEEP, &[&name]),
                        call.loc,
                    );
                    return TypeId::ERROR;
                }
            }
        }

        for (index, argument) in call.arguments.iter().enumerate() {
            let (Some(ty), Some(param)) = (arguments[index], self.param_type_at(&shape, index))
            else {
                continue;
            };
            self.check_assignable(ty, param, argument.loc());
        }
        if let Some(throws) = shape.throws {
            self.add_throwable(throws);
        }
        shape.return_type
    }

    fn instantiate_call(
        &mut self,
        function: TypeId,
        shape: &FunctionShape,
        explicit: &[TypeId],
        arguments: &[Option<TypeId>],
        call: &CallExpression,
    ) -> TypeId {
        let type_args = if explicit.is_empty() {
            let given: Vec<TypeId> = arguments
                .iter()
                .map(|argument| argument.unwrap_or(TypeId::NEVER))
                .collect();
            infer_type_arguments(&mut self.graph.types, &shape.type_params, &shape.params, &given)
        } else {
            if explicit.len() > shape.type_params.len() {
                let name = self.type_name(function);
                self.report(
                    format_message(
                        messages::GENERIC_ARITY,
                        &[
                            &name,
                            &shape.type_params.len().to_string(),
                            &explicit.len().to_string(),
                        ],
                    ),
                    call.loc,
                );
            }
            explicit.to_vec()
        };
        self.check_constraints(&shape.type_params, &type_args, call.loc);
        let scope = self.type_scope();
        instantiate_function(&mut self.graph.types, function, &type_args, scope)
    }

    fn check_constraints(&mut self, params: &[TypeId], args: &[TypeId], loc: SourceLocation) {
        let subst = TypeSubstitution::from_args(&self.graph.types, params, args);
        let scope = self.type_scope();
        for &param in params {
            let TypeData::Parameter(info) = self.graph.types.data(param) else {
                continue;
            };
            let Some(constraint) = info.constraint else {
                continue;
            };
            let param_name = info.name.clone();
            let argument = subst.get(param).unwrap_or(TypeId::UNKNOWN);
            let bound = instantiate_type(&mut self.graph.types, constraint, &subst, scope);
            if !is_assignable(&mut self.graph.types, argument, bound) {
                let message = format_message(
                    messages::CONSTRAINT_VIOLATION,
                    &[&self.type_name(argument), &self.type_name(bound), &param_name],
                );
                self.report(message, loc);
            }
        }
    }

    /// Declared type of the parameter receiving argument `index`; rest
    /// parameters yield their element type, optional ones admit `undefined`.
    fn param_type_at(&mut self, shape: &FunctionShape, index: usize) -> Option<TypeId> {
        let param = shape
            .params
            .get(index)
            .or_else(|| shape.params.last().filter(|param| param.rest))?;
        if param.rest {
            return Some(self.array_element(param.ty).unwrap_or(param.ty));
        }
        if param.optional {
            let scope = self.type_scope();
            return Some(self.graph.types.union([param.ty, TypeId::UNDEFINED], scope));
        }
        Some(param.ty)
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub(crate) fn infer_member(&mut self, member: &'a MemberExpression) -> TypeId {
        let object = self.infer_expression(&member.object, None);
        let target = if member.optional {
            self.non_nullable(object)
        } else {
            object
        };
        let ty = match &member.property {
            MemberProperty::Named(ident) => self.property_type(target, &ident.name, ident.loc),
            MemberProperty::Computed(key) => {
                let key_ty = self.infer_expression(key, None);
                let resolved = resolve_application(&mut self.graph.types, target);
                let name = match self.graph.types.get(key_ty).as_literal() {
                    Some(LiteralValue::String(name)) => Some(name.clone()),
                    _ => None,
                };
                match name {
                    Some(name) => self.property_type(target, &name, key.loc()),
                    None => self
                        .array_element(target)
                        .or_else(|| self.array_element(resolved))
                        .unwrap_or(TypeId::UNKNOWN),
                }
            }
        };
        if member.optional && target != object {
            let scope = self.type_scope();
            self.graph.types.union([ty, TypeId::UNDEFINED], scope)
        } else {
            ty
        }
    }

    /// Type of property `name` on a value of type `ty`, reporting a missing
    /// property at `loc`.
    pub(crate) fn property_type(&mut self, ty: TypeId, name: &str, loc: SourceLocation) -> TypeId {
        if ty.is_error() {
            return TypeId::ERROR;
        }
        let apparent = self.apparent_type(ty);
        match find_property(&mut self.graph.types, apparent, name) {
            Some(property) if property.optional => {
                let scope = self.type_scope();
                self.graph
                    .types
                    .union([property.ty, TypeId::UNDEFINED], scope)
            }
            Some(property) => property.ty,
            None => {
                let message =
                    format_message(messages::MISSING_PROPERTY, &[name, &self.type_name(ty)]);
                self.report(message, loc);
                TypeId::ERROR
            }
        }
    }

    /// Primitives and functions expose the members of their wrapper class
    /// (`Number`, `String`, `Function`, ...) when a library declares it.
    pub(crate) fn apparent_type(&mut self, ty: TypeId) -> TypeId {
        if let TypeData::Union(members) = self.graph.types.data(ty) {
            let members = members.clone();
            let apparent: Vec<TypeId> =
                members.into_iter().map(|m| self.apparent_type(m)).collect();
            let scope = self.graph.types.get(ty).parent;
            return self.graph.types.union(apparent, scope);
        }
        let wrapper = match wrapper_class_name(&self.graph.types, ty) {
            Some(name) => name,
            None if self.graph.types.get(ty).is_function() => "Function",
            None => return ty,
        };
        self.graph.find_type(self.scope, wrapper).unwrap_or(ty)
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn operand(&mut self, ty: TypeId) -> Operand {
        let widened = self.graph.types.widen(ty);
        match self.graph.types.data(widened).clone() {
            TypeData::Error => Operand::Error,
            TypeData::Parameter(info) => match info.constraint {
                Some(constraint) => self.operand(constraint),
                None => Operand::Lenient,
            },
            TypeData::Union(members) => {
                let kinds: Vec<Operand> = members.into_iter().map(|m| self.operand(m)).collect();
                match kinds.split_first() {
                    Some((&first, rest)) if rest.iter().all(|&kind| kind == first) => first,
                    _ => Operand::Other,
                }
            }
            _ => match widened {
                TypeId::NUMBER => Operand::Number,
                TypeId::BIGINT => Operand::BigInt,
                TypeId::STRING => Operand::String,
                TypeId::UNKNOWN => Operand::Lenient,
                _ => Operand::Other,
            },
        }
    }

    fn invalid_operand(&mut self, operator: &str, ty: TypeId, loc: SourceLocation) -> TypeId {
        let message = format_message(messages::INVALID_OPERAND, &[operator, &self.type_name(ty)]);
        self.report(message, loc);
        TypeId::ERROR
    }

    fn infer_unary(&mut self, unary: &'a UnaryExpression) -> TypeId {
        let argument = self.infer_expression(&unary.argument, None);
        match unary.operator {
            UnaryOperator::Await => self.unwrap_promise(argument),
            UnaryOperator::Not | UnaryOperator::Delete => TypeId::BOOLEAN,
            UnaryOperator::TypeOf => TypeId::STRING,
            UnaryOperator::Void => TypeId::UNDEFINED,
            UnaryOperator::Plus => TypeId::NUMBER,
            UnaryOperator::Minus | UnaryOperator::BitwiseNot => {
                let symbol = if unary.operator == UnaryOperator::Minus {
                    "-"
                } else {
                    "~"
                };
                if unary.operator == UnaryOperator::Minus
                    && let Some(LiteralValue::Number(value)) =
                        self.graph.types.get(argument).as_literal()
                {
                    let negated = -*value;
                    return self.graph.types.literal_number(negated);
                }
                match self.operand(argument) {
                    Operand::Number | Operand::Lenient => TypeId::NUMBER,
                    Operand::BigInt => TypeId::BIGINT,
                    Operand::Error => TypeId::ERROR,
                    Operand::String | Operand::Other => {
                        self.invalid_operand(symbol, argument, unary.loc)
                    }
                }
            }
        }
    }

    fn infer_update(&mut self, update: &'a UpdateExpression) -> TypeId {
        let argument = self.infer_expression(&update.argument, None);
        if let Some(ident) = update.argument.as_identifier() {
            self.check_not_constant(ident, update.loc);
        }
        let symbol = match update.operator {
            hegel_ast::UpdateOperator::Increment => "++",
            hegel_ast::UpdateOperator::Decrement => "--",
        };
        match self.operand(argument) {
            Operand::Number | Operand::Lenient => TypeId::NUMBER,
            Operand::BigInt => TypeId::BIGINT,
            Operand::Error => TypeId::ERROR,
            Operand::String | Operand::Other => self.invalid_operand(symbol, argument, update.loc),
        }
    }

    fn infer_binary(&mut self, binary: &'a BinaryExpression) -> TypeId {
        let left = self.infer_expression(&binary.left, None);
        let right = self.infer_expression(&binary.right, None);
        self.binary_result(binary.operator, left, right, binary.loc)
    }

    pub(crate) fn binary_result(
        &mut self,
        operator: BinaryOperator,
        left: TypeId,
        right: TypeId,
        loc: SourceLocation,
    ) -> TypeId {
        use BinaryOperator::*;
        let symbol = operator.as_str();
        match operator {
            Equal | NotEqual | StrictEqual | StrictNotEqual | In | InstanceOf => TypeId::BOOLEAN,
            Less | LessEqual | Greater | GreaterEqual => {
                match (self.operand(left), self.operand(right)) {
                    (Operand::Other, _) => {
                        self.invalid_operand(symbol, left, loc);
                    }
                    (_, Operand::Other) => {
                        self.invalid_operand(symbol, right, loc);
                    }
                    _ => {}
                }
                TypeId::BOOLEAN
            }
            Add => match (self.operand(left), self.operand(right)) {
                (Operand::Error, _) | (_, Operand::Error) => TypeId::ERROR,
                (Operand::String, _) | (_, Operand::String) => TypeId::STRING,
                (Operand::Number, Operand::Number)
                | (Operand::Number, Operand::Lenient)
                | (Operand::Lenient, Operand::Number) => TypeId::NUMBER,
                (Operand::BigInt, Operand::BigInt)
                | (Operand::BigInt, Operand::Lenient)
                | (Operand::Lenient, Operand::BigInt) => TypeId::BIGINT,
                (Operand::Lenient, Operand::Lenient) => {
                    let scope = self.type_scope();
                    self.graph
                        .types
                        .union([TypeId::NUMBER, TypeId::STRING], scope)
                }
                (Operand::Other, _) | (Operand::BigInt, _) => {
                    self.invalid_operand(symbol, left, loc)
                }
                (_, Operand::Other) | (_, Operand::BigInt) => {
                    self.invalid_operand(symbol, right, loc)
                }
            },
            _ => match (self.operand(left), self.operand(right)) {
                (Operand::Error, _) | (_, Operand::Error) => TypeId::ERROR,
                (Operand::Number | Operand::Lenient, Operand::Number | Operand::Lenient) => {
                    TypeId::NUMBER
                }
                (Operand::BigInt, Operand::BigInt | Operand::Lenient)
                | (Operand::Lenient, Operand::BigInt) => TypeId::BIGINT,
                (Operand::Number | Operand::Lenient, _) => self.invalid_operand(symbol, right, loc),
                _ => self.invalid_operand(symbol, left, loc),
            },
        }
    }

    fn infer_logical(
        &mut self,
        logical: &'a LogicalExpression,
        expected: Option<TypeId>,
    ) -> TypeId {
        let left = self.infer_expression(&logical.left, expected);
        let previous = self.enter_scope(ScopeKind::Block, logical.right.loc());
        match logical.operator {
            LogicalOperator::And => self.apply_refinements(&logical.left, true),
            LogicalOperator::Or => self.apply_refinements(&logical.left, false),
            LogicalOperator::NullishCoalescing => {}
        }
        let right = self.infer_expression(&logical.right, expected);
        self.exit_scope(previous);
        let kept = match logical.operator {
            LogicalOperator::And => self.falsy_part(left),
            LogicalOperator::Or => self.truthy_part(left),
            LogicalOperator::NullishCoalescing => self.non_nullable(left),
        };
        let scope = self.type_scope();
        self.graph.types.union([kept, right], scope)
    }

    fn infer_conditional(
        &mut self,
        conditional: &'a ConditionalExpression,
        expected: Option<TypeId>,
    ) -> TypeId {
        self.infer_expression(&conditional.test, None);
        let mut branches = Vec::with_capacity(2);
        for (branch, truthy) in [(&conditional.consequent, true), (&conditional.alternate, false)] {
            let previous = self.enter_scope(ScopeKind::Block, branch.loc());
            self.apply_refinements(&conditional.test, truthy);
            branches.push(self.infer_expression(branch, expected));
            self.exit_scope(previous);
        }
        let scope = self.type_scope();
        self.graph.types.union(branches, scope)
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    fn infer_assignment(&mut self, assignment: &'a AssignmentExpression) -> TypeId {
        match &*assignment.left {
            Expression::Identifier(ident) => {
                let Some(variable) = self.graph.find_declared_variable(self.scope, &ident.name)
                else {
                    self.infer_expression(&assignment.right, None);
                    self.report(
                        format_message(messages::UNDEFINED_VARIABLE, &[&ident.name]),
                        ident.loc,
                    );
                    return TypeId::ERROR;
                };
                self.graph.module_mut(self.module).references.push(Reference {
                    name: ident.name.clone(),
                    loc: ident.loc,
                    scope: self.scope,
                    variable,
                });
                let declared = self.graph.variable(variable).ty;
                let value = self.infer_expression(&assignment.right, Some(declared));
                let value = match assignment.operator.binary() {
                    Some(operator) => {
                        // A refined copy in an enclosing block holds the current value.
                        let current = self
                            .graph
                            .find_variable(self.scope, &ident.name)
                            .map_or(declared, |v| self.graph.variable(v).ty);
                        self.binary_result(operator, current, value, assignment.loc)
                    }
                    None => value,
                };
                if self.check_not_constant(ident, assignment.loc) {
                    self.check_assignable(value, declared, assignment.right.loc());
                }
                value
            }
            Expression::Member(member) => {
                let target = self.infer_member(member);
                let value = self.infer_expression(&assignment.right, Some(target));
                let value = match assignment.operator.binary() {
                    Some(operator) => self.binary_result(operator, target, value, assignment.loc),
                    None => value,
                };
                self.check_assignable(value, target, assignment.right.loc());
                value
            }
            other => {
                self.infer_expression(other, None);
                self.infer_expression(&assignment.right, None)
            }
        }
    }

    /// Report an assignment to a constant binding; `true` when assignable.
    fn check_not_constant(&mut self, ident: &Identifier, loc: SourceLocation) -> bool {
        let Some(variable) = self.graph.find_declared_variable(self.scope, &ident.name) else {
            return true;
        };
        if !self.graph.variable(variable).is_constant {
            return true;
        }
        self.report(
            format_message(messages::CONSTANT_REASSIGNMENT, &[&ident.name]),
            loc,
        );
        false
    }
}

#[cfg(test)]
#[path = "../tests/expressions_tests.rs"]
mod expressions_tests;
