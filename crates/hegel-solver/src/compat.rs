//! Assignability between types.
//!
//! Structural for objects and functions, nominal along `is_subtype_of` for
//! class instances. Recursive types are compared coinductively: a pair that
//! is already being compared further up the stack is assumed compatible.

use crate::arena::TypeArena;
use crate::infer::infer_type_arguments;
use crate::instantiate::{expand_application, instantiate_function};
use crate::objects::find_property;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;

pub struct CompatChecker<'a> {
    arena: &'a mut TypeArena,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'a> CompatChecker<'a> {
    pub fn new(arena: &'a mut TypeArena) -> Self {
        CompatChecker {
            arena,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target
            || target == TypeId::UNKNOWN
            || source == TypeId::NEVER
            || source.is_error()
            || target.is_error()
        {
            return true;
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {
                let result = self.check(source, target);
                self.guard.leave((source, target));
                result
            }
            RecursionResult::Cycle => true,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => false,
        }
    }

    fn check(&mut self, source: TypeId, target: TypeId) -> bool {
        let source_data = self.arena.data(source).clone();
        let target_data = self.arena.data(target).clone();

        // Union source: every member must fit.
        if let TypeData::Union(members) = &source_data {
            return members.iter().all(|&m| self.is_assignable(m, target));
        }
        if let TypeData::Parameter(info) = &source_data {
            if let TypeData::Union(members) = &target_data
                && members.contains(&source)
            {
                return true;
            }
            let bound = info.constraint.unwrap_or(TypeId::UNKNOWN);
            return bound != TypeId::UNKNOWN && self.is_assignable(bound, target);
        }
        // Intersection target: every member must accept.
        if let TypeData::Intersection(members) = &target_data {
            return members.iter().all(|&m| self.is_assignable(source, m));
        }
        // Union target: some member must accept.
        if let TypeData::Union(members) = &target_data {
            return members.iter().any(|&m| self.is_assignable(source, m));
        }

        if let (TypeData::Application(left), TypeData::Application(right)) =
            (&source_data, &target_data)
            && left.target == right.target
            && left.arguments.len() == right.arguments.len()
        {
            let pairs: Vec<(TypeId, TypeId)> = left
                .arguments
                .iter()
                .copied()
                .zip(right.arguments.iter().copied())
                .collect();
            if pairs.iter().all(|&(l, r)| self.is_assignable(l, r)) {
                return true;
            }
        }
        if matches!(source_data, TypeData::Application(_)) {
            let expanded = expand_application(self.arena, source);
            return expanded != source && self.is_assignable(expanded, target);
        }
        if matches!(target_data, TypeData::Application(_)) {
            let expanded = expand_application(self.arena, target);
            return expanded != target && self.is_assignable(source, expanded);
        }

        if let TypeData::Intersection(members) = &source_data {
            if members.iter().any(|&m| self.is_assignable(m, target)) {
                return true;
            }
            return matches!(target_data, TypeData::Object(_))
                && self.check_object(source, target);
        }

        match (&source_data, &target_data) {
            (TypeData::Literal(value), TypeData::Primitive(_)) => value.widened() == target,
            (TypeData::Object(_), TypeData::Object(_)) => self.check_object(source, target),
            (TypeData::Function(left), TypeData::Function(right)) => {
                self.check_function(source, left, right)
            }
            _ => false,
        }
    }

    fn check_object(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some(target_shape) = self.arena.get(target).as_object().cloned() else {
            return false;
        };

        if let Some(nominal) = target_shape.nominal
            && !self.inherits_nominal(source, nominal)
        {
            return false;
        }

        for (key, expected) in &target_shape.properties {
            match find_property(self.arena, source, key) {
                Some(actual) => {
                    if actual.optional && !expected.optional {
                        return false;
                    }
                    if !self.is_assignable(actual.ty, expected.ty) {
                        return false;
                    }
                }
                None if expected.optional => {}
                None => return false,
            }
        }

        if target_shape.is_exact
            && let Some(source_shape) = self.arena.get(source).as_object()
            && source_shape
                .properties
                .keys()
                .any(|key| !target_shape.properties.contains_key(key))
        {
            return false;
        }
        true
    }

    /// Whether `source`, or a supertype on its `is_subtype_of` chain, carries
    /// `nominal`.
    fn inherits_nominal(&mut self, source: TypeId, nominal: NominalId) -> bool {
        let mut current = Some(source);
        for _ in 0..RecursionProfile::SubtypeCheck.max_depth() {
            let Some(ty) = current else {
                return false;
            };
            let ty = if matches!(self.arena.data(ty), TypeData::Application(_)) {
                expand_application(self.arena, ty)
            } else {
                ty
            };
            match self.arena.data(ty) {
                TypeData::Object(shape) if shape.nominal == Some(nominal) => return true,
                TypeData::Intersection(members) => {
                    let members = members.clone();
                    return members.into_iter().any(|m| self.inherits_nominal(m, nominal));
                }
                _ => {}
            }
            current = self.arena.get(ty).is_subtype_of;
        }
        false
    }

    fn check_function(
        &mut self,
        source: TypeId,
        left: &FunctionShape,
        right: &FunctionShape,
    ) -> bool {
        // A generic source is specialized against the target's parameters.
        if !left.type_params.is_empty() {
            let args: Vec<TypeId> = right.params.iter().map(|p| p.ty).collect();
            let inferred = infer_type_arguments(self.arena, &left.type_params, &left.params, &args);
            let scope = self.arena.get(source).parent;
            let specialized = instantiate_function(self.arena, source, &inferred, scope);
            let Some(shape) = self.arena.get(specialized).as_function().cloned() else {
                return false;
            };
            return self.check_function(specialized, &shape, right);
        }

        if right.max_arity().is_some_and(|max| left.required_arity() > max) {
            return false;
        }
        for (index, param) in left.params.iter().enumerate() {
            let Some(expected) = right.params.get(index) else {
                break;
            };
            if !self.is_assignable(expected.ty, param.ty) {
                return false;
            }
        }
        right.return_type == TypeId::UNDEFINED
            || self.is_assignable(left.return_type, right.return_type)
    }
}

/// Whether a value of type `source` may be used where `target` is expected.
pub fn is_assignable(arena: &mut TypeArena, source: TypeId, target: TypeId) -> bool {
    CompatChecker::new(arena).is_assignable(source, target)
}
