//! Type arena and type scopes.
//!
//! Types and type scopes are addressed by index; "parent" links are plain
//! ids, so the graph has no reference cycles and can be cloned or inspected
//! freely. Built-in primitives occupy fixed ids in [`TypeScopeId::ROOT`].

use crate::format::display_name;
use crate::types::*;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

pub struct TypeArena {
    types: Vec<Type>,
    scopes: Vec<TypeScope>,
    number_literals: FxHashMap<u64, TypeId>,
    string_literals: FxHashMap<String, TypeId>,
    /// Application expansions by (target, arguments, owning scope).
    pub(crate) expansions: FxHashMap<(TypeId, Vec<TypeId>, TypeScopeId), TypeId>,
    next_nominal: u32,
    /// Allocation order of each slot; reused slots get a fresh stamp.
    stamps: Vec<u64>,
    next_stamp: u64,
    /// Released slots, reused by later allocations.
    free_types: Vec<TypeId>,
    free_scopes: Vec<TypeScopeId>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = TypeArena {
            types: Vec::new(),
            scopes: vec![TypeScope {
                parent: None,
                priority: 0,
                body: IndexMap::new(),
                mixed_from: Vec::new(),
            }],
            number_literals: FxHashMap::default(),
            string_literals: FxHashMap::default(),
            expansions: FxHashMap::default(),
            next_nominal: 0,
            stamps: Vec::new(),
            next_stamp: 0,
            free_types: Vec::new(),
            free_scopes: Vec::new(),
        };

        arena.push_builtin("?", TypeData::Error);
        for kind in [
            PrimitiveKind::Unknown,
            PrimitiveKind::Never,
            PrimitiveKind::Undefined,
            PrimitiveKind::Null,
            PrimitiveKind::Number,
            PrimitiveKind::BigInt,
            PrimitiveKind::String,
            PrimitiveKind::Boolean,
            PrimitiveKind::Symbol,
        ] {
            let id = arena.push_builtin(kind.name(), TypeData::Primitive(kind));
            debug_assert_eq!(id, kind.type_id());
            arena.define(TypeScopeId::ROOT, kind.name(), id);
        }
        arena.define(TypeScopeId::ROOT, "void", TypeId::UNDEFINED);
        arena.define(TypeScopeId::ROOT, "mixed", TypeId::UNKNOWN);
        arena.push_builtin("true", TypeData::Literal(LiteralValue::Boolean(true)));
        arena.push_builtin("false", TypeData::Literal(LiteralValue::Boolean(false)));
        debug_assert_eq!(arena.types.len() as u32, TypeId::FIRST_USER);

        arena.define_builtin_array();
        arena
    }

    fn push_builtin(&mut self, name: &str, data: TypeData) -> TypeId {
        self.alloc(Type {
            name: name.to_string(),
            parent: TypeScopeId::ROOT,
            data,
            is_subtype_of: None,
            loc: None,
        })
    }

    /// `Array<T>` without members, so that array literals have a type even
    /// when no standard library is loaded. A library `Array` shadows it.
    fn define_builtin_array(&mut self) {
        let params_scope = self.new_scope(TypeScopeId::ROOT);
        let element = self.add_named(
            "T",
            TypeData::Parameter(TypeParamInfo {
                name: "T".to_string(),
                constraint: None,
                default: None,
            }),
            params_scope,
        );
        let body = self.add_named("Array", TypeData::Object(ObjectShape::default()), params_scope);
        let array = self.add_named(
            "Array",
            TypeData::Generic(GenericShape {
                params: vec![element],
                body,
            }),
            TypeScopeId::ROOT,
        );
        self.define(TypeScopeId::ROOT, "Array", array);
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Allocated types that have not been released.
    pub fn live_count(&self) -> usize {
        self.types.len() - self.free_types.len()
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Mutable access, for filling in a type before it is published.
    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    pub fn data(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()].data
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.types[id.index()].name
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        if let Some(id) = self.free_types.pop() {
            self.types[id.index()] = ty;
            self.stamps[id.index()] = stamp;
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        self.stamps.push(stamp);
        id
    }

    /// Mark to pass to [`allocated_since`](Self::allocated_since).
    pub fn allocation_mark(&self) -> u64 {
        self.next_stamp
    }

    /// Whether `id` was allocated after `mark` was taken.
    pub fn allocated_since(&self, id: TypeId, mark: u64) -> bool {
        self.stamps[id.index()] >= mark
    }

    /// Allocate a type whose name is derived from its structure.
    pub fn add(&mut self, data: TypeData, parent: TypeScopeId) -> TypeId {
        let name = display_name(self, &data);
        self.add_named(name, data, parent)
    }

    pub fn add_named(
        &mut self,
        name: impl Into<String>,
        data: TypeData,
        parent: TypeScopeId,
    ) -> TypeId {
        self.alloc(Type {
            name: name.into(),
            parent,
            data,
            is_subtype_of: None,
            loc: None,
        })
    }

    /// Recompute the structural name of a type after it was filled in.
    pub fn refresh_name(&mut self, id: TypeId) {
        let name = display_name(self, &self.types[id.index()].data);
        self.types[id.index()].name = name;
    }

    pub fn fresh_nominal(&mut self) -> NominalId {
        self.next_nominal += 1;
        NominalId(self.next_nominal)
    }

    pub fn literal_number(&mut self, value: f64) -> TypeId {
        let key = value.to_bits();
        if let Some(&id) = self.number_literals.get(&key) {
            return id;
        }
        let id = self.add(
            TypeData::Literal(LiteralValue::Number(value)),
            TypeScopeId::ROOT,
        );
        self.number_literals.insert(key, id);
        id
    }

    pub fn literal_string(&mut self, value: &str) -> TypeId {
        if let Some(&id) = self.string_literals.get(value) {
            return id;
        }
        let id = self.add(
            TypeData::Literal(LiteralValue::String(value.to_string())),
            TypeScopeId::ROOT,
        );
        self.string_literals.insert(value.to_string(), id);
        id
    }

    pub const fn literal_boolean(&self, value: bool) -> TypeId {
        if value { TypeId::TRUE } else { TypeId::FALSE }
    }

    pub fn literal(&mut self, value: &LiteralValue) -> TypeId {
        match value {
            LiteralValue::Number(number) => self.literal_number(*number),
            LiteralValue::String(text) => self.literal_string(text),
            LiteralValue::Boolean(flag) => self.literal_boolean(*flag),
        }
    }

    /// Normalized union: nested unions are flattened, duplicates removed,
    /// literals absorbed by their primitive, `never` dropped; `unknown` and
    /// the error sentinel absorb everything. A single member is returned as is.
    pub fn union(&mut self, members: impl IntoIterator<Item = TypeId>, parent: TypeScopeId) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::new();
        let mut stack: Vec<TypeId> = members.into_iter().collect();
        stack.reverse();
        while let Some(member) = stack.pop() {
            match self.data(member) {
                TypeData::Union(inner) => stack.extend(inner.iter().rev().copied()),
                TypeData::Error => return TypeId::ERROR,
                _ if member == TypeId::UNKNOWN => return TypeId::UNKNOWN,
                _ if member == TypeId::NEVER => {}
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }

        if flat.contains(&TypeId::TRUE) && flat.contains(&TypeId::FALSE) {
            flat.retain(|&id| id != TypeId::TRUE && id != TypeId::FALSE);
            if !flat.contains(&TypeId::BOOLEAN) {
                flat.push(TypeId::BOOLEAN);
            }
        }
        let present: Vec<TypeId> = flat.clone();
        flat.retain(|&id| match self.data(id) {
            TypeData::Literal(value) => !present.contains(&value.widened()),
            _ => true,
        });

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                // Members must be visible from the union's own scope.
                let parent = self.innermost_parent(&flat, parent);
                self.add(TypeData::Union(flat), parent)
            }
        }
    }

    pub fn intersection(
        &mut self,
        members: impl IntoIterator<Item = TypeId>,
        parent: TypeScopeId,
    ) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::new();
        for member in members {
            match self.data(member) {
                TypeData::Intersection(inner) => {
                    for &id in inner {
                        if !flat.contains(&id) {
                            flat.push(id);
                        }
                    }
                }
                TypeData::Error => return TypeId::ERROR,
                _ if member == TypeId::NEVER => return TypeId::NEVER,
                _ if member == TypeId::UNKNOWN => {}
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }
        match flat.len() {
            0 => TypeId::UNKNOWN,
            1 => flat[0],
            _ => {
                let parent = self.innermost_parent(&flat, parent);
                self.add(TypeData::Intersection(flat), parent)
            }
        }
    }

    /// Pick the deepest of `fallback` and the members' parents when they lie
    /// on one chain; otherwise keep `fallback`.
    fn innermost_parent(&self, members: &[TypeId], fallback: TypeScopeId) -> TypeScopeId {
        let mut parent = fallback;
        for &member in members {
            let candidate = self.get(member).parent;
            if self.is_ancestor_scope(parent, candidate) {
                parent = candidate;
            }
        }
        parent
    }

    /// `T | null | undefined`
    pub fn nullable(&mut self, ty: TypeId, parent: TypeScopeId) -> TypeId {
        self.union([ty, TypeId::NULL, TypeId::UNDEFINED], parent)
    }

    /// Literal types widened to their primitive, through unions.
    pub fn widen(&mut self, ty: TypeId) -> TypeId {
        match self.data(ty) {
            TypeData::Literal(value) => value.widened(),
            TypeData::Union(members) => {
                let members = members.clone();
                let parent = self.get(ty).parent;
                let widened: Vec<TypeId> = members.into_iter().map(|m| self.widen(m)).collect();
                self.union(widened, parent)
            }
            _ => ty,
        }
    }

    /// Members of a union, or the type itself.
    pub fn union_members(&self, ty: TypeId) -> Vec<TypeId> {
        match self.data(ty) {
            TypeData::Union(members) => members.clone(),
            _ => vec![ty],
        }
    }

    pub fn application(
        &mut self,
        target: TypeId,
        arguments: Vec<TypeId>,
        parent: TypeScopeId,
    ) -> TypeId {
        let parent = self.innermost_parent(&arguments, parent);
        self.add(TypeData::Application(TypeApplication { target, arguments }), parent)
    }

    pub fn function(&mut self, shape: FunctionShape, parent: TypeScopeId) -> TypeId {
        self.add(TypeData::Function(shape), parent)
    }

    pub fn object(&mut self, shape: ObjectShape, parent: TypeScopeId) -> TypeId {
        self.add(TypeData::Object(shape), parent)
    }

    // =========================================================================
    // Type scopes
    // =========================================================================

    pub fn new_scope(&mut self, parent: TypeScopeId) -> TypeScopeId {
        let priority = self.scopes[parent.index()].priority + 1;
        let scope = TypeScope {
            parent: Some(parent),
            priority,
            body: IndexMap::new(),
            mixed_from: Vec::new(),
        };
        if let Some(id) = self.free_scopes.pop() {
            self.scopes[id.index()] = scope;
            return id;
        }
        let id = TypeScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    /// Release `roots`, every scope nested in them and every type they own.
    /// Returns the number of released types. Released ids are handed out
    /// again, so callers must drop every id they hold into the released
    /// scopes. The root scope is never released.
    pub fn release_scopes(&mut self, roots: &[TypeScopeId]) -> usize {
        let free: FxHashSet<TypeScopeId> = self.free_scopes.iter().copied().collect();
        let mut released: FxHashSet<TypeScopeId> = roots
            .iter()
            .copied()
            .filter(|&id| id != TypeScopeId::ROOT && !free.contains(&id))
            .collect();
        if released.is_empty() {
            return 0;
        }
        // Reused slots may precede their parent, so grow to a fixpoint.
        loop {
            let before = released.len();
            for (index, scope) in self.scopes.iter().enumerate() {
                let id = TypeScopeId(index as u32);
                if !free.contains(&id) && scope.parent.is_some_and(|p| released.contains(&p)) {
                    released.insert(id);
                }
            }
            if released.len() == before {
                break;
            }
        }

        let free_types: FxHashSet<TypeId> = self.free_types.iter().copied().collect();
        let dead: Vec<TypeId> = self
            .types
            .iter()
            .enumerate()
            .map(|(index, ty)| (TypeId(index as u32), ty))
            .filter(|(id, ty)| {
                id.0 >= TypeId::FIRST_USER
                    && released.contains(&ty.parent)
                    && !free_types.contains(id)
            })
            .map(|(id, _)| id)
            .collect();
        let dead_set: FxHashSet<TypeId> = dead.iter().copied().collect();

        self.expansions.retain(|(target, arguments, scope), expanded| {
            !released.contains(scope)
                && !dead_set.contains(target)
                && !dead_set.contains(expanded)
                && !arguments.iter().any(|argument| dead_set.contains(argument))
        });
        for &id in &dead {
            self.types[id.index()] = Type {
                name: String::new(),
                parent: TypeScopeId::ROOT,
                data: TypeData::Error,
                is_subtype_of: None,
                loc: None,
            };
        }
        for scope in &mut self.scopes {
            scope.mixed_from.retain(|mixed| !released.contains(mixed));
        }
        let mut released: Vec<TypeScopeId> = released.into_iter().collect();
        released.sort_unstable();
        for &id in &released {
            self.scopes[id.index()] = TypeScope {
                parent: None,
                priority: 0,
                body: IndexMap::new(),
                mixed_from: Vec::new(),
            };
        }
        let count = dead.len();
        self.free_types.extend(dead);
        self.free_scopes.extend(released);
        count
    }

    pub fn scope(&self, id: TypeScopeId) -> &TypeScope {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: TypeScopeId) -> &mut TypeScope {
        &mut self.scopes[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in `scope`. A second binding of the same name in the same
    /// scope replaces the first.
    pub fn define(&mut self, scope: TypeScopeId, name: impl Into<String>, ty: TypeId) {
        self.scopes[scope.index()].body.insert(name.into(), ty);
    }

    /// Resolve a type name from `scope` outward; among matches on the chain the
    /// highest priority (innermost) binding wins.
    pub fn find_type(&self, scope: TypeScopeId, name: &str) -> Option<TypeId> {
        self.find_type_with_scope(scope, name).map(|(id, _)| id)
    }

    /// Like [`find_type`](Self::find_type), also returning the scope that
    /// holds the binding.
    pub fn find_type_with_scope(
        &self,
        scope: TypeScopeId,
        name: &str,
    ) -> Option<(TypeId, TypeScopeId)> {
        let mut best: Option<(u32, TypeId, TypeScopeId)> = None;
        let mut current = Some(scope);
        while let Some(id) = current {
            let type_scope = &self.scopes[id.index()];
            if let Some(&ty) = type_scope.body.get(name)
                && best.is_none_or(|(priority, _, _)| type_scope.priority > priority)
            {
                best = Some((type_scope.priority, ty, id));
            }
            current = type_scope.parent;
        }
        best.map(|(_, ty, id)| (ty, id))
    }

    /// Whether `ancestor` is `scope` or lies on its parent chain. Scopes
    /// recorded in `mixed_from` count as ancestors of the scope they were
    /// mixed into.
    pub fn is_ancestor_scope(&self, ancestor: TypeScopeId, scope: TypeScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            let type_scope = &self.scopes[id.index()];
            if type_scope
                .mixed_from
                .iter()
                .any(|&mixed| self.is_ancestor_scope(ancestor, mixed))
            {
                return true;
            }
            current = type_scope.parent;
        }
        false
    }

    /// Whether `ty` may be referenced from `scope`.
    pub fn is_visible_from(&self, ty: TypeId, scope: TypeScopeId) -> bool {
        self.is_ancestor_scope(self.get(ty).parent, scope)
    }
}
