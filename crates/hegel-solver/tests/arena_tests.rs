use super::*;

#[test]
fn test_builtins_have_fixed_ids() {
    let arena = TypeArena::new();
    assert_eq!(arena.find_type(TypeScopeId::ROOT, "number"), Some(TypeId::NUMBER));
    assert_eq!(arena.find_type(TypeScopeId::ROOT, "void"), Some(TypeId::UNDEFINED));
    assert_eq!(arena.find_type(TypeScopeId::ROOT, "mixed"), Some(TypeId::UNKNOWN));
    assert_eq!(arena.name(TypeId::STRING), "string");
    assert_eq!(arena.name(TypeId::TRUE), "true");
    assert!(matches!(
        arena.data(arena.find_type(TypeScopeId::ROOT, "Array").unwrap()),
        TypeData::Generic(_)
    ));
}

#[test]
fn test_literals_are_interned() {
    let mut arena = TypeArena::new();
    let two = arena.literal_number(2.0);
    assert_eq!(arena.literal_number(2.0), two);
    assert_ne!(arena.literal_number(3.0), two);
    assert_eq!(arena.name(two), "2");

    let hello = arena.literal_string("hello");
    assert_eq!(arena.literal_string("hello"), hello);
    assert_eq!(arena.name(hello), "'hello'");
    assert_eq!(arena.get(hello).parent, TypeScopeId::ROOT);
}

#[test]
fn test_union_normalization() {
    let mut arena = TypeArena::new();
    let scope = arena.new_scope(TypeScopeId::ROOT);

    let single = arena.union([TypeId::NUMBER, TypeId::NUMBER], scope);
    assert_eq!(single, TypeId::NUMBER);

    let two = arena.literal_number(2.0);
    let absorbed = arena.union([two, TypeId::NUMBER], scope);
    assert_eq!(absorbed, TypeId::NUMBER);

    let boolean = arena.union([TypeId::TRUE, TypeId::FALSE], scope);
    assert_eq!(boolean, TypeId::BOOLEAN);

    assert_eq!(arena.union([TypeId::NEVER], scope), TypeId::NEVER);
    assert_eq!(
        arena.union([TypeId::STRING, TypeId::UNKNOWN], scope),
        TypeId::UNKNOWN
    );

    let inner = arena.union([TypeId::NUMBER, TypeId::STRING], scope);
    let outer = arena.union([inner, TypeId::NULL, TypeId::STRING], scope);
    match arena.data(outer) {
        TypeData::Union(members) => {
            assert_eq!(members, &vec![TypeId::NUMBER, TypeId::STRING, TypeId::NULL]);
        }
        other => panic!("expected union, got {other:?}"),
    }
    assert_eq!(arena.name(outer), "number | string | null");
}

#[test]
fn test_find_type_prefers_innermost_binding() {
    let mut arena = TypeArena::new();
    let global = arena.new_scope(TypeScopeId::ROOT);
    let block = arena.new_scope(global);
    let sibling = arena.new_scope(global);

    arena.define(global, "Id", TypeId::NUMBER);
    arena.define(block, "Id", TypeId::STRING);

    assert_eq!(arena.find_type(block, "Id"), Some(TypeId::STRING));
    assert_eq!(arena.find_type(global, "Id"), Some(TypeId::NUMBER));
    assert_eq!(arena.find_type(sibling, "Id"), Some(TypeId::NUMBER));
    assert_eq!(arena.find_type(sibling, "Missing"), None);
    assert!(arena.scope(block).priority > arena.scope(global).priority);
}

#[test]
fn test_redefinition_in_same_scope_replaces() {
    let mut arena = TypeArena::new();
    let scope = arena.new_scope(TypeScopeId::ROOT);
    arena.define(scope, "A", TypeId::NUMBER);
    arena.define(scope, "A", TypeId::STRING);
    assert_eq!(arena.find_type(scope, "A"), Some(TypeId::STRING));
    assert_eq!(arena.scope(scope).body.len(), 1);
}

#[test]
fn test_mixed_from_counts_as_ancestor() {
    let mut arena = TypeArena::new();
    let library = arena.new_scope(TypeScopeId::ROOT);
    let global = arena.new_scope(TypeScopeId::ROOT);
    let inner = arena.new_scope(global);

    assert!(!arena.is_ancestor_scope(library, inner));
    arena.scope_mut(global).mixed_from.push(library);
    assert!(arena.is_ancestor_scope(library, inner));
    assert!(arena.is_ancestor_scope(TypeScopeId::ROOT, inner));
    assert!(!arena.is_ancestor_scope(inner, global));
}

#[test]
fn test_released_scopes_free_their_types_for_reuse() {
    let mut arena = TypeArena::new();
    let kept = arena.new_scope(TypeScopeId::ROOT);
    let module = arena.new_scope(TypeScopeId::ROOT);
    let inner = arena.new_scope(module);
    let point = arena.object(ObjectShape::default(), inner);
    let pair = arena.union([TypeId::NUMBER, TypeId::STRING], module);
    arena.define(module, "Pair", pair);
    arena.scope_mut(kept).mixed_from.push(module);
    let live = arena.live_count();
    let scopes = arena.scope_count();

    assert_eq!(arena.release_scopes(&[module]), 2);
    assert_eq!(arena.live_count(), live - 2);
    assert!(arena.scope(kept).mixed_from.is_empty());
    assert_eq!(arena.release_scopes(&[module, TypeScopeId::ROOT]), 0);

    let reused = arena.new_scope(kept);
    assert!(reused == module || reused == inner);
    assert_eq!(arena.scope_count(), scopes);
    assert_eq!(arena.find_type(reused, "Pair"), None);
    let mark = arena.allocation_mark();
    assert!(!arena.allocated_since(TypeId::NUMBER, mark));
    let again = arena.object(ObjectShape::default(), reused);
    assert!(again == point || again == pair);
    assert!(arena.allocated_since(again, mark));
    assert_eq!(arena.live_count(), live - 1);
    assert_eq!(arena.find_type(TypeScopeId::ROOT, "number"), Some(TypeId::NUMBER));
}

#[test]
fn test_widen_through_union() {
    let mut arena = TypeArena::new();
    let one = arena.literal_number(1.0);
    let text = arena.literal_string("a");
    let union = arena.union([one, text], TypeScopeId::ROOT);
    let widened = arena.widen(union);
    assert_eq!(arena.name(widened), "number | string");
}

#[test]
fn test_function_and_object_names() {
    let mut arena = TypeArena::new();
    let mut properties = indexmap::IndexMap::new();
    properties.insert("a".to_string(), PropertyInfo::new(TypeId::NUMBER));
    properties.insert(
        "b".to_string(),
        PropertyInfo {
            ty: TypeId::STRING,
            optional: true,
        },
    );
    let object = arena.object(ObjectShape::with_properties(properties), TypeScopeId::ROOT);
    assert_eq!(arena.name(object), "{ a: number, b?: string }");

    let function = arena.function(
        FunctionShape::new(vec![ParamInfo::new("x", TypeId::NUMBER)], object),
        TypeScopeId::ROOT,
    );
    assert_eq!(arena.name(function), "(number) => { a: number, b?: string }");
}
