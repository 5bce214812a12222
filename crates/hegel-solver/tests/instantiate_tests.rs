use super::*;
use indexmap::IndexMap;

fn type_param(arena: &mut TypeArena, name: &str, scope: TypeScopeId) -> TypeId {
    let id = arena.add_named(
        name,
        TypeData::Parameter(TypeParamInfo {
            name: name.to_string(),
            constraint: None,
            default: None,
        }),
        scope,
    );
    arena.define(scope, name, id);
    id
}

/// `<T>(value: T) => { value: T }`
fn boxing_function(arena: &mut TypeArena) -> (TypeId, TypeId) {
    let scope = arena.new_scope(TypeScopeId::ROOT);
    let t = type_param(arena, "T", scope);
    let mut properties = IndexMap::new();
    properties.insert("value".to_string(), PropertyInfo::new(t));
    let boxed = arena.object(ObjectShape::with_properties(properties), scope);
    let mut shape = FunctionShape::new(vec![ParamInfo::new("value", t)], boxed);
    shape.type_params = vec![t];
    (arena.function(shape, scope), t)
}

#[test]
fn test_substitution_from_args() {
    let mut arena = TypeArena::new();
    let scope = arena.new_scope(TypeScopeId::ROOT);
    let t = type_param(&mut arena, "T", scope);
    let u = type_param(&mut arena, "U", scope);
    if let TypeData::Parameter(info) = &mut arena.get_mut(u).data {
        info.default = Some(TypeId::BOOLEAN);
    }

    let subst = TypeSubstitution::from_args(&arena, &[t, u], &[TypeId::STRING]);
    assert_eq!(subst.len(), 2);
    assert_eq!(subst.get(t), Some(TypeId::STRING));
    assert_eq!(subst.get(u), Some(TypeId::BOOLEAN));
}

#[test]
fn test_instantiate_function_replaces_parameters() {
    let mut arena = TypeArena::new();
    let (function, _) = boxing_function(&mut arena);
    let call_site = arena.new_scope(TypeScopeId::ROOT);

    let specialized = instantiate_function(&mut arena, function, &[TypeId::NUMBER], call_site);
    assert_ne!(specialized, function);
    assert_eq!(arena.name(specialized), "(number) => { value: number }");
    let shape = arena.get(specialized).as_function().unwrap();
    assert!(shape.type_params.is_empty());
    assert_eq!(arena.get(specialized).parent, call_site);
}

#[test]
fn test_instantiations_do_not_interfere() {
    let mut arena = TypeArena::new();
    let (function, _) = boxing_function(&mut arena);
    let original_name = arena.name(function).to_string();

    let first = instantiate_function(&mut arena, function, &[TypeId::NUMBER], TypeScopeId::ROOT);
    let second = instantiate_function(&mut arena, function, &[TypeId::STRING], TypeScopeId::ROOT);
    let first_result = arena.get(first).as_function().unwrap().return_type;
    let second_result = arena.get(second).as_function().unwrap().return_type;
    assert_ne!(first_result, second_result);

    // Mutating one instantiation leaves the other and the generic untouched.
    if let TypeData::Object(shape) = &mut arena.get_mut(first_result).data {
        shape
            .properties
            .insert("extra".to_string(), PropertyInfo::new(TypeId::BOOLEAN));
    }
    assert!(find_property(&mut arena, first_result, "extra").is_some());
    assert!(find_property(&mut arena, second_result, "extra").is_none());
    assert_eq!(
        find_property(&mut arena, second_result, "value").map(|p| p.ty),
        Some(TypeId::STRING)
    );
    assert_eq!(arena.name(function), original_name);
}

#[test]
fn test_same_arguments_still_produce_fresh_roots() {
    let mut arena = TypeArena::new();
    let (function, _) = boxing_function(&mut arena);
    let first = instantiate_function(&mut arena, function, &[TypeId::NUMBER], TypeScopeId::ROOT);
    let second = instantiate_function(&mut arena, function, &[TypeId::NUMBER], TypeScopeId::ROOT);
    assert_ne!(first, second);
    assert_eq!(arena.name(first), arena.name(second));
}

#[test]
fn test_subtrees_without_parameters_are_shared() {
    let mut arena = TypeArena::new();
    let scope = arena.new_scope(TypeScopeId::ROOT);
    let t = type_param(&mut arena, "T", scope);
    let fixed = arena.object(ObjectShape::default(), scope);
    let mut properties = IndexMap::new();
    properties.insert("fixed".to_string(), PropertyInfo::new(fixed));
    properties.insert("item".to_string(), PropertyInfo::new(t));
    let body = arena.object(ObjectShape::with_properties(properties), scope);

    let mut subst = TypeSubstitution::new();
    subst.insert(t, TypeId::NUMBER);
    let result = instantiate_type(&mut arena, body, &subst, TypeScopeId::ROOT);
    assert_eq!(find_property(&mut arena, result, "fixed").map(|p| p.ty), Some(fixed));
    assert_eq!(
        find_property(&mut arena, result, "item").map(|p| p.ty),
        Some(TypeId::NUMBER)
    );
}

#[test]
fn test_recursive_alias_expands_lazily() {
    let mut arena = TypeArena::new();
    let scope = arena.new_scope(TypeScopeId::ROOT);
    let params_scope = arena.new_scope(scope);
    // type List<T> = { head: T, tail: ?List<T> }
    let list = arena.add_named(
        "List",
        TypeData::Generic(GenericShape {
            params: Vec::new(),
            body: TypeId::ERROR,
        }),
        scope,
    );
    let t = type_param(&mut arena, "T", params_scope);
    let tail_app = arena.application(list, vec![t], params_scope);
    let tail = arena.nullable(tail_app, params_scope);
    let mut properties = IndexMap::new();
    properties.insert("head".to_string(), PropertyInfo::new(t));
    properties.insert("tail".to_string(), PropertyInfo::new(tail));
    let body = arena.add_named(
        "List",
        TypeData::Object(ObjectShape::with_properties(properties)),
        params_scope,
    );
    arena.get_mut(list).data = TypeData::Generic(GenericShape {
        params: vec![t],
        body,
    });

    let numbers = arena.application(list, vec![TypeId::NUMBER], scope);
    assert_eq!(arena.name(numbers), "List<number>");
    let expanded = expand_application(&mut arena, numbers);
    assert_eq!(arena.name(expanded), "List<number>");
    assert_eq!(expand_application(&mut arena, numbers), expanded);
    assert_eq!(
        find_property(&mut arena, expanded, "head").map(|p| p.ty),
        Some(TypeId::NUMBER)
    );
    let tail = find_property(&mut arena, expanded, "tail").unwrap().ty;
    assert_eq!(arena.name(tail), "List<number> | null | undefined");
}

#[test]
fn test_expansions_stay_visible_from_sibling_scopes() {
    let mut arena = TypeArena::new();
    let scope = arena.new_scope(TypeScopeId::ROOT);
    let params_scope = arena.new_scope(scope);
    // type Box<T> = { value: T }
    let t = type_param(&mut arena, "T", params_scope);
    let mut properties = IndexMap::new();
    properties.insert("value".to_string(), PropertyInfo::new(t));
    let body = arena.add_named(
        "Box",
        TypeData::Object(ObjectShape::with_properties(properties)),
        params_scope,
    );
    let boxed = arena.add_named(
        "Box",
        TypeData::Generic(GenericShape {
            params: vec![t],
            body,
        }),
        scope,
    );

    let first = arena.new_scope(scope);
    let second = arena.new_scope(scope);
    let in_first = arena.application(boxed, vec![TypeId::NUMBER], first);
    let in_second = arena.application(boxed, vec![TypeId::NUMBER], second);
    let expanded_first = expand_application(&mut arena, in_first);
    let expanded_second = expand_application(&mut arena, in_second);

    assert_ne!(expanded_first, expanded_second);
    assert!(arena.is_visible_from(expanded_first, first));
    assert!(arena.is_visible_from(expanded_second, second));
    assert!(!arena.is_visible_from(expanded_first, second));
    assert_eq!(expand_application(&mut arena, in_second), expanded_second);
}

#[test]
fn test_infer_binds_parameters_structurally() {
    let mut arena = TypeArena::new();
    let (function, t) = boxing_function(&mut arena);
    let params = arena.get(function).as_function().unwrap().params.clone();
    let five = arena.literal_number(5.0);
    let inferred = infer_type_arguments(&mut arena, &[t], &params, &[five]);
    assert_eq!(inferred, vec![TypeId::NUMBER]);

    let unbound = infer_type_arguments(&mut arena, &[t], &params, &[]);
    assert_eq!(unbound, vec![TypeId::UNKNOWN]);
}

#[test]
fn test_infer_through_nullable_union() {
    let mut arena = TypeArena::new();
    let scope = arena.new_scope(TypeScopeId::ROOT);
    let t = type_param(&mut arena, "T", scope);
    let maybe_t = arena.union([t, TypeId::NULL], scope);
    let maybe_string = arena.union([TypeId::STRING, TypeId::NULL], scope);
    let params = vec![ParamInfo::new("value", maybe_t)];
    let inferred = infer_type_arguments(&mut arena, &[t], &params, &[maybe_string]);
    assert_eq!(inferred, vec![TypeId::STRING]);
}
