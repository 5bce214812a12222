//! Call-site inference of type arguments.
//!
//! Each type parameter collects candidate types by walking the declared
//! parameter types alongside the argument types. Candidates are widened and
//! joined into a union; a parameter nothing binds falls back to its default,
//! then its constraint, then `unknown`.

use crate::arena::TypeArena;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::*;
use rustc_hash::FxHashMap;

struct Inference<'a> {
    arena: &'a mut TypeArena,
    params: &'a [TypeId],
    candidates: FxHashMap<TypeId, Vec<TypeId>>,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl Inference<'_> {
    fn collect(&mut self, declared: TypeId, actual: TypeId) {
        if actual.is_error() || actual == TypeId::NEVER {
            return;
        }
        if self.params.contains(&declared) {
            let widened = self.arena.widen(actual);
            let slot = self.candidates.entry(declared).or_default();
            if !slot.contains(&widened) {
                slot.push(widened);
            }
            return;
        }
        if !self.guard.enter((declared, actual)).is_entered() {
            return;
        }
        self.collect_structural(declared, actual);
        self.guard.leave((declared, actual));
    }

    fn collect_structural(&mut self, declared: TypeId, actual: TypeId) {
        let declared_data = self.arena.data(declared).clone();
        let actual_data = self.arena.data(actual).clone();
        match (declared_data, actual_data) {
            (TypeData::Function(expected), TypeData::Function(given)) => {
                for (param, arg) in expected.params.iter().zip(given.params.iter()) {
                    self.collect(param.ty, arg.ty);
                }
                self.collect(expected.return_type, given.return_type);
            }
            (TypeData::Object(expected), TypeData::Object(given)) => {
                for (key, property) in &expected.properties {
                    if let Some(found) = given.properties.get(key) {
                        self.collect(property.ty, found.ty);
                    }
                }
            }
            (TypeData::Application(expected), TypeData::Application(given))
                if expected.target == given.target =>
            {
                for (param, arg) in expected.arguments.iter().zip(given.arguments.iter()) {
                    self.collect(*param, *arg);
                }
            }
            // `T | null` against `number | null` binds `T` to `number`.
            (TypeData::Union(expected), _) => {
                let (generic, fixed): (Vec<TypeId>, Vec<TypeId>) = expected
                    .iter()
                    .partition(|&&member| self.mentions_param(member));
                let [generic] = generic.as_slice() else {
                    return;
                };
                let rest: Vec<TypeId> = self
                    .arena
                    .union_members(actual)
                    .into_iter()
                    .filter(|member| !fixed.contains(member))
                    .collect();
                if rest.is_empty() {
                    return;
                }
                let parent = self.arena.get(actual).parent;
                let remainder = self.arena.union(rest, parent);
                self.collect(*generic, remainder);
            }
            _ => {}
        }
    }

    fn mentions_param(&self, ty: TypeId) -> bool {
        if self.params.contains(&ty) {
            return true;
        }
        match self.arena.data(ty) {
            TypeData::Application(app) => app.arguments.iter().any(|&a| self.mentions_param(a)),
            TypeData::Function(shape) => {
                shape.params.iter().any(|p| self.params.contains(&p.ty))
                    || self.params.contains(&shape.return_type)
            }
            TypeData::Object(shape) => shape
                .properties
                .values()
                .any(|p| self.params.contains(&p.ty)),
            _ => false,
        }
    }
}

/// Infer one argument per entry of `type_params` from a call with `args`
/// against the declared `params`.
pub fn infer_type_arguments(
    arena: &mut TypeArena,
    type_params: &[TypeId],
    params: &[ParamInfo],
    args: &[TypeId],
) -> Vec<TypeId> {
    let mut inference = Inference {
        arena,
        params: type_params,
        candidates: FxHashMap::default(),
        guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
    };
    for (index, &arg) in args.iter().enumerate() {
        let declared = match params.get(index).or_else(|| params.last()) {
            Some(param) if param.rest => rest_element(inference.arena, param.ty),
            Some(param) if index < params.len() => param.ty,
            _ => break,
        };
        inference.collect(declared, arg);
    }

    let Inference {
        arena, candidates, ..
    } = inference;
    type_params
        .iter()
        .map(|param| match candidates.get(param) {
            Some(found) => arena.union(found.iter().copied(), TypeScopeId::ROOT),
            None => match arena.data(*param) {
                TypeData::Parameter(info) => {
                    info.default.or(info.constraint).unwrap_or(TypeId::UNKNOWN)
                }
                _ => TypeId::UNKNOWN,
            },
        })
        .collect()
}

/// Element type of a rest parameter declared as `Array<T>`.
fn rest_element(arena: &TypeArena, ty: TypeId) -> TypeId {
    match arena.data(ty) {
        TypeData::Application(app) if app.arguments.len() == 1 => app.arguments[0],
        _ => ty,
    }
}
