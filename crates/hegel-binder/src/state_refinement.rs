//! Flow refinement.
//!
//! A branch guarded by a test gets its own block scope; the test's
//! implications are bound there as copies of the tested variables with a
//! narrower type and `meta.changed` set. Only plain identifiers are refined.

use crate::scope::VariableInfo;
use crate::state::BinderState;
use hegel_ast::{BinaryOperator, Expression, LogicalOperator, UnaryOperator};
use hegel_solver::{TypeData, TypeId, resolve_application};
use tracing::trace;

/// What a comparison against a nullish value checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nullish {
    Null,
    Undefined,
    /// `== null` / `!= null`, matching both.
    Either,
}

impl<'a> BinderState<'a> {
    /// Bind the refinements `test` implies when it evaluates to `truthy`
    /// into the current scope.
    pub(crate) fn apply_refinements(&mut self, test: &'a Expression, truthy: bool) {
        match test {
            Expression::Identifier(ident) => {
                let Some(current) = self.current_type(&ident.name) else {
                    return;
                };
                let refined = if truthy {
                    self.truthy_part(current)
                } else {
                    self.falsy_part(current)
                };
                self.refine(&ident.name, refined, test);
            }
            Expression::Unary(unary) if unary.operator == UnaryOperator::Not => {
                self.apply_refinements(&unary.argument, !truthy);
            }
            Expression::Logical(logical) => match (logical.operator, truthy) {
                (LogicalOperator::And, true) | (LogicalOperator::Or, false) => {
                    self.apply_refinements(&logical.left, truthy);
                    self.apply_refinements(&logical.right, truthy);
                }
                _ => {}
            },
            Expression::Binary(binary) => {
                let (equal, strict) = match binary.operator {
                    BinaryOperator::StrictEqual => (true, true),
                    BinaryOperator::StrictNotEqual => (false, true),
                    BinaryOperator::Equal => (true, false),
                    BinaryOperator::NotEqual => (false, false),
                    _ => return,
                };
                let matches = equal == truthy;
                for (subject, other) in [
                    (&*binary.left, &*binary.right),
                    (&*binary.right, &*binary.left),
                ] {
                    if let Some((name, tag)) = typeof_test(subject, other) {
                        let Some(current) = self.current_type(name) else {
                            return;
                        };
                        let refined = self.filter_typeof(current, tag, matches);
                        self.refine(name, refined, test);
                        return;
                    }
                    if let (Some(ident), Some(nullish)) =
                        (subject.as_identifier(), nullish_literal(other, strict))
                    {
                        let Some(current) = self.current_type(&ident.name) else {
                            return;
                        };
                        let refined = self.filter_nullish(current, nullish, matches);
                        self.refine(&ident.name, refined, test);
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    fn current_type(&self, name: &str) -> Option<TypeId> {
        let variable = self.graph.find_variable(self.scope, name)?;
        Some(self.graph.variable(variable).ty)
    }

    fn refine(&mut self, name: &str, ty: TypeId, test: &Expression) {
        let Some(variable) = self.graph.find_variable(self.scope, name) else {
            return;
        };
        let original = self.graph.variable(variable);
        if original.ty == ty {
            return;
        }
        trace!(
            name,
            from = %self.graph.types.name(original.ty),
            to = %self.graph.types.name(ty),
            "refine"
        );
        let mut info = VariableInfo::new(name, ty, self.scope, test.loc());
        info.is_constant = original.is_constant;
        info.has_initializer = original.has_initializer;
        info.meta.changed = true;
        self.graph.declare(self.scope, info);
    }

    fn filter_members(
        &mut self,
        ty: TypeId,
        mut keep: impl FnMut(&mut Self, TypeId) -> Option<TypeId>,
    ) -> TypeId {
        let parent = self.graph.types.get(ty).parent;
        let members = self.graph.types.union_members(ty);
        let kept: Vec<TypeId> = members
            .into_iter()
            .filter_map(|member| keep(self, member))
            .collect();
        self.graph.types.union(kept, parent)
    }

    /// The part of `ty` that may be truthy.
    pub(crate) fn truthy_part(&mut self, ty: TypeId) -> TypeId {
        self.filter_members(ty, |state, member| match member {
            TypeId::NULL | TypeId::UNDEFINED | TypeId::FALSE => None,
            TypeId::BOOLEAN => Some(TypeId::TRUE),
            _ => match state.graph.types.get(member).as_literal() {
                Some(value) if value.is_falsy() => None,
                _ => Some(member),
            },
        })
    }

    /// The part of `ty` that may be falsy.
    pub(crate) fn falsy_part(&mut self, ty: TypeId) -> TypeId {
        self.filter_members(ty, |state, member| match member {
            TypeId::NULL
            | TypeId::UNDEFINED
            | TypeId::FALSE
            | TypeId::NUMBER
            | TypeId::STRING
            | TypeId::BIGINT
            | TypeId::UNKNOWN
            | TypeId::ERROR => Some(member),
            TypeId::BOOLEAN => Some(TypeId::FALSE),
            _ => match state.graph.types.data(member) {
                TypeData::Literal(value) if value.is_falsy() => Some(member),
                TypeData::Parameter(_) => Some(member),
                _ => None,
            },
        })
    }

    /// `ty` without `null` and `undefined`.
    pub(crate) fn non_nullable(&mut self, ty: TypeId) -> TypeId {
        self.filter_members(ty, |_, member| {
            (member != TypeId::NULL && member != TypeId::UNDEFINED).then_some(member)
        })
    }

    fn filter_nullish(&mut self, ty: TypeId, nullish: Nullish, matches: bool) -> TypeId {
        let is_match = move |member: TypeId| match nullish {
            Nullish::Null => member == TypeId::NULL,
            Nullish::Undefined => member == TypeId::UNDEFINED,
            Nullish::Either => member == TypeId::NULL || member == TypeId::UNDEFINED,
        };
        if matches && ty == TypeId::UNKNOWN {
            return match nullish {
                Nullish::Null => TypeId::NULL,
                Nullish::Undefined => TypeId::UNDEFINED,
                Nullish::Either => {
                    let scope = self.type_scope();
                    self.graph.types.union([TypeId::NULL, TypeId::UNDEFINED], scope)
                }
            };
        }
        self.filter_members(ty, |_, member| {
            (member == TypeId::UNKNOWN || is_match(member) == matches).then_some(member)
        })
    }

    /// Keep (or drop, when `matches` is false) the members of `ty` whose
    /// `typeof` is `tag`.
    fn filter_typeof(&mut self, ty: TypeId, tag: &str, matches: bool) -> TypeId {
        self.filter_members(ty, |state, member| match state.typeof_tag(member) {
            Some(member_tag) => ((member_tag == tag) == matches).then_some(member),
            None if matches && member == TypeId::UNKNOWN => {
                Some(primitive_for_tag(tag).unwrap_or(member))
            }
            None => Some(member),
        })
    }

    fn typeof_tag(&mut self, ty: TypeId) -> Option<&'static str> {
        let ty = resolve_application(&mut self.graph.types, ty);
        match self.graph.types.data(ty) {
            TypeData::Primitive(kind) => kind.typeof_tag(),
            TypeData::Literal(value) => {
                let widened = value.widened();
                self.typeof_tag(widened)
            }
            TypeData::Function(_) => Some("function"),
            TypeData::Object(shape) if shape.constructor.is_some() => Some("function"),
            TypeData::Object(_) => Some("object"),
            TypeData::Intersection(members)
                if members
                    .iter()
                    .any(|&member| self.graph.types.get(member).is_function()) =>
            {
                Some("function")
            }
            TypeData::Intersection(_) => Some("object"),
            _ => None,
        }
    }
}

/// `typeof name` compared with a string literal.
fn typeof_test<'e>(subject: &'e Expression, other: &'e Expression) -> Option<(&'e str, &'e str)> {
    let Expression::Unary(unary) = subject else {
        return None;
    };
    if unary.operator != UnaryOperator::TypeOf {
        return None;
    }
    let ident = unary.argument.as_identifier()?;
    let Expression::StringLiteral(tag) = other else {
        return None;
    };
    Some((&ident.name, &tag.value))
}

fn nullish_literal(expression: &Expression, strict: bool) -> Option<Nullish> {
    let nullish = match expression {
        Expression::NullLiteral { .. } => Nullish::Null,
        Expression::Identifier(ident) if ident.name == "undefined" => Nullish::Undefined,
        _ => return None,
    };
    Some(if strict { nullish } else { Nullish::Either })
}

fn primitive_for_tag(tag: &str) -> Option<TypeId> {
    match tag {
        "number" => Some(TypeId::NUMBER),
        "string" => Some(TypeId::STRING),
        "boolean" => Some(TypeId::BOOLEAN),
        "bigint" => Some(TypeId::BIGINT),
        "symbol" => Some(TypeId::SYMBOL),
        "undefined" => Some(TypeId::UNDEFINED),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/refinement_tests.rs"]
mod refinement_tests;
