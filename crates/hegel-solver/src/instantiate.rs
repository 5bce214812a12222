//! Generic type instantiation.
//!
//! Substitutes type parameters with concrete arguments. Generic types are
//! never mutated: every instantiation allocates new types for the parts that
//! mention a substituted parameter, so two call sites never share a result.

use crate::arena::TypeArena;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Mapping from type parameter to the argument replacing it.
#[derive(Debug, Clone, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `params` with `args`. Missing arguments fall back to the
    /// parameter's default, then its constraint, then `unknown`.
    pub fn from_args(arena: &TypeArena, params: &[TypeId], args: &[TypeId]) -> Self {
        let mut subst = TypeSubstitution::new();
        for (index, &param) in params.iter().enumerate() {
            let arg = match args.get(index) {
                Some(&arg) => arg,
                None => match arena.data(param) {
                    TypeData::Parameter(info) => {
                        info.default.or(info.constraint).unwrap_or(TypeId::UNKNOWN)
                    }
                    _ => TypeId::UNKNOWN,
                },
            };
            subst.insert(param, arg);
        }
        subst
    }

    pub fn insert(&mut self, param: TypeId, arg: TypeId) {
        self.map.insert(param, arg);
    }

    pub fn get(&self, param: TypeId) -> Option<TypeId> {
        self.map.get(&param).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

pub struct Instantiator<'a> {
    arena: &'a mut TypeArena,
    subst: &'a TypeSubstitution,
    scope: TypeScopeId,
    /// Source type -> its copy; closes cycles through recursive object types.
    memo: FxHashMap<TypeId, TypeId>,
    mentions: FxHashSet<TypeId>,
    depth: DepthCounter,
}

impl<'a> Instantiator<'a> {
    pub fn new(arena: &'a mut TypeArena, subst: &'a TypeSubstitution, scope: TypeScopeId) -> Self {
        Instantiator {
            arena,
            subst,
            scope,
            memo: FxHashMap::default(),
            mentions: FxHashSet::default(),
            depth: DepthCounter::with_profile(RecursionProfile::TypeApplication),
        }
    }

    pub fn depth_exceeded(&self) -> bool {
        self.depth.is_exceeded()
    }

    /// Instantiate `ty`. A composite root is always a fresh type, even when
    /// no substituted parameter occurs in it.
    pub fn instantiate(&mut self, ty: TypeId) -> TypeId {
        let result = self.instantiate_inner(ty);
        if result != ty {
            return result;
        }
        match self.arena.data(ty) {
            TypeData::Function(_) | TypeData::Object(_) => {
                let mut copy = self.arena.get(ty).clone();
                copy.parent = self.scope;
                self.arena.alloc(copy)
            }
            _ => result,
        }
    }

    fn instantiate_inner(&mut self, ty: TypeId) -> TypeId {
        if let Some(arg) = self.subst.get(ty) {
            return arg;
        }
        if let Some(&copy) = self.memo.get(&ty) {
            return copy;
        }
        if !self.mentions_substituted(ty, &mut FxHashSet::default()) {
            return ty;
        }
        if !self.depth.enter() {
            return TypeId::ERROR;
        }
        let result = self.instantiate_data(ty);
        self.depth.leave();
        result
    }

    fn instantiate_data(&mut self, ty: TypeId) -> TypeId {
        let original = self.arena.get(ty).clone();
        match &original.data {
            TypeData::Primitive(_)
            | TypeData::Literal(_)
            | TypeData::Error
            | TypeData::Parameter(_) => ty,
            TypeData::Function(shape) => {
                let copy = self.placeholder(ty, &original);
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        ty: self.instantiate_inner(param.ty),
                        ..param.clone()
                    })
                    .collect();
                let return_type = self.instantiate_inner(shape.return_type);
                let throws = shape.throws.map(|t| self.instantiate_inner(t));
                self.arena.get_mut(copy).data = TypeData::Function(FunctionShape {
                    type_params: shape.type_params.clone(),
                    params,
                    return_type,
                    throws,
                });
                self.arena.refresh_name(copy);
                copy
            }
            TypeData::Object(shape) => {
                let copy = self.placeholder(ty, &original);
                let properties = shape
                    .properties
                    .iter()
                    .map(|(key, property)| {
                        (
                            key.clone(),
                            PropertyInfo {
                                ty: self.instantiate_inner(property.ty),
                                optional: property.optional,
                            },
                        )
                    })
                    .collect();
                let constructor = shape.constructor.map(|c| self.instantiate_inner(c));
                let is_subtype_of = original.is_subtype_of.map(|s| self.instantiate_inner(s));
                let target = self.arena.get_mut(copy);
                target.data = TypeData::Object(ObjectShape {
                    properties,
                    nominal: shape.nominal,
                    is_exact: shape.is_exact,
                    constructor,
                });
                target.is_subtype_of = is_subtype_of;
                // Nominal types keep their declared name.
                if shape.nominal.is_none() {
                    self.arena.refresh_name(copy);
                }
                copy
            }
            TypeData::Union(members) => {
                let members: Vec<TypeId> =
                    members.iter().map(|&m| self.instantiate_inner(m)).collect();
                self.arena.union(members, self.scope)
            }
            TypeData::Intersection(members) => {
                let members: Vec<TypeId> =
                    members.iter().map(|&m| self.instantiate_inner(m)).collect();
                self.arena.intersection(members, self.scope)
            }
            TypeData::Application(app) => {
                let arguments = app
                    .arguments
                    .iter()
                    .map(|&a| self.instantiate_inner(a))
                    .collect();
                self.arena.application(app.target, arguments, self.scope)
            }
            TypeData::Generic(shape) => {
                let body = self.instantiate_inner(shape.body);
                self.arena.add_named(
                    original.name.clone(),
                    TypeData::Generic(GenericShape {
                        params: shape.params.clone(),
                        body,
                    }),
                    self.scope,
                )
            }
        }
    }

    fn placeholder(&mut self, ty: TypeId, original: &Type) -> TypeId {
        let copy = self.arena.alloc(Type {
            name: original.name.clone(),
            parent: self.scope,
            data: TypeData::Error,
            is_subtype_of: original.is_subtype_of,
            loc: original.loc,
        });
        self.memo.insert(ty, copy);
        copy
    }

    /// Whether a substituted parameter is reachable from `ty` without
    /// expanding applications.
    fn mentions_substituted(&mut self, ty: TypeId, visiting: &mut FxHashSet<TypeId>) -> bool {
        if self.subst.get(ty).is_some() {
            return true;
        }
        if self.mentions.contains(&ty) {
            return true;
        }
        if !visiting.insert(ty) {
            return false;
        }
        let children: Vec<TypeId> = match self.arena.data(ty) {
            TypeData::Primitive(_)
            | TypeData::Literal(_)
            | TypeData::Error
            | TypeData::Parameter(_) => Vec::new(),
            TypeData::Function(shape) => shape
                .params
                .iter()
                .map(|p| p.ty)
                .chain(std::iter::once(shape.return_type))
                .chain(shape.throws)
                .collect(),
            TypeData::Object(shape) => shape
                .properties
                .values()
                .map(|p| p.ty)
                .chain(shape.constructor)
                .collect(),
            TypeData::Union(members) | TypeData::Intersection(members) => members.clone(),
            TypeData::Application(app) => app.arguments.clone(),
            TypeData::Generic(shape) => vec![shape.body],
        };
        let found = children
            .into_iter()
            .any(|child| self.mentions_substituted(child, visiting));
        visiting.remove(&ty);
        // Negative answers may depend on the visiting set, only cache hits.
        if found {
            self.mentions.insert(ty);
        }
        found
    }
}

/// Instantiate `ty` under `subst`, allocating into `scope`. Returns the error
/// sentinel when instantiation nests too deeply.
pub fn instantiate_type(
    arena: &mut TypeArena,
    ty: TypeId,
    subst: &TypeSubstitution,
    scope: TypeScopeId,
) -> TypeId {
    let mut instantiator = Instantiator::new(arena, subst, scope);
    let result = instantiator.instantiate(ty);
    if instantiator.depth_exceeded() {
        return TypeId::ERROR;
    }
    result
}

/// Specialize a generic function type with explicit or inferred arguments.
/// The result has no type parameters of its own.
pub fn instantiate_function(
    arena: &mut TypeArena,
    function: TypeId,
    args: &[TypeId],
    scope: TypeScopeId,
) -> TypeId {
    let Some(shape) = arena.get(function).as_function() else {
        return function;
    };
    if shape.type_params.is_empty() {
        return function;
    }
    let params = shape.type_params.clone();
    let subst = TypeSubstitution::from_args(arena, &params, args);
    let result = instantiate_type(arena, function, &subst, scope);
    if let TypeData::Function(shape) = &mut arena.get_mut(result).data {
        shape.type_params.clear();
    }
    arena.refresh_name(result);
    result
}

/// Expand `Target<Args>` to the instantiated body of its generic target.
/// Expansions are cached per (target, arguments) within the application's
/// scope; a non-generic target is returned unchanged.
pub fn expand_application(arena: &mut TypeArena, application: TypeId) -> TypeId {
    let TypeData::Application(app) = arena.data(application) else {
        return application;
    };
    let app = app.clone();
    let TypeData::Generic(generic) = arena.data(app.target) else {
        return app.target;
    };
    let generic = generic.clone();
    let scope = arena.get(application).parent;
    let key = (app.target, app.arguments.clone(), scope);
    if let Some(&expanded) = arena.expansions.get(&key) {
        return expanded;
    }

    let subst = TypeSubstitution::from_args(arena, &generic.params, &app.arguments);
    let expanded = instantiate_type(arena, generic.body, &subst, scope);
    if expanded.is_error() {
        trace!(application = %arena.name(application), "expansion too deep");
        return expanded;
    }
    if expanded != generic.body && matches!(arena.data(expanded), TypeData::Object(_)) {
        arena.get_mut(expanded).name = arena.name(application).to_string();
    }
    arena.expansions.insert(key, expanded);
    expanded
}

/// Resolve applications until a non-application type is reached.
pub fn resolve_application(arena: &mut TypeArena, ty: TypeId) -> TypeId {
    let mut current = ty;
    for _ in 0..RecursionProfile::TypeApplication.max_depth() {
        if !matches!(arena.data(current), TypeData::Application(_)) {
            return current;
        }
        let next = expand_application(arena, current);
        if next == current {
            return current;
        }
        current = next;
    }
    TypeId::ERROR
}
