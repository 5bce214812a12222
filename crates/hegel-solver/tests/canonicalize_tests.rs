use super::*;
use hegel_ast::Statement;
use hegel_common::DiagnosticBag;

/// Define every alias of `source` in a fresh scope; returns the scope.
fn define_aliases(
    arena: &mut TypeArena,
    diagnostics: &mut DiagnosticBag,
    source: &str,
) -> TypeScopeId {
    let program = hegel_parser::parse(source).expect("test source parses");
    let scope = arena.new_scope(TypeScopeId::ROOT);
    let mut lowering = TypeLowering::new(arena, diagnostics, "test.js");
    for statement in &program.body {
        if let Statement::TypeAlias(alias) = statement {
            lowering.define_alias(alias, scope);
        }
    }
    scope
}

#[test]
fn test_alias_object_takes_alias_name() {
    let mut arena = TypeArena::new();
    let mut diagnostics = DiagnosticBag::new();
    let scope = define_aliases(
        &mut arena,
        &mut diagnostics,
        "type User = { name: string, age?: number };",
    );
    assert!(diagnostics.is_empty());
    let user = arena.find_type(scope, "User").unwrap();
    assert_eq!(arena.name(user), "User");
    let age = find_property(&mut arena, user, "age").unwrap();
    assert!(age.optional);
    assert_eq!(age.ty, TypeId::NUMBER);
}

#[test]
fn test_generic_alias_application() {
    let mut arena = TypeArena::new();
    let mut diagnostics = DiagnosticBag::new();
    let scope = define_aliases(
        &mut arena,
        &mut diagnostics,
        "type Box<T> = { value: T };\ntype NumberBox = Box<number>;",
    );
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.as_slice());
    let boxed = arena.find_type(scope, "NumberBox").unwrap();
    assert_eq!(arena.name(boxed), "Box<number>");
    assert_eq!(
        find_property(&mut arena, boxed, "value").map(|p| p.ty),
        Some(TypeId::NUMBER)
    );
}

#[test]
fn test_recursive_alias() {
    let mut arena = TypeArena::new();
    let mut diagnostics = DiagnosticBag::new();
    let scope = define_aliases(
        &mut arena,
        &mut diagnostics,
        "type Node = { value: number, next: ?Node };",
    );
    assert!(diagnostics.is_empty());
    let node = arena.find_type(scope, "Node").unwrap();
    let next = find_property(&mut arena, node, "next").unwrap().ty;
    assert_eq!(arena.name(next), "Node | null | undefined");
    assert!(arena.union_members(next).contains(&node));
}

#[test]
fn test_unknown_type_is_reported() {
    let mut arena = TypeArena::new();
    let mut diagnostics = DiagnosticBag::new();
    let scope = define_aliases(&mut arena, &mut diagnostics, "type A = Missing;");
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics.as_slice()[0];
    assert_eq!(diagnostic.message, "Type \"Missing\" is not defined");
    assert_eq!(diagnostic.loc.start.column, 9);
    assert_eq!(diagnostic.source, "test.js");
    assert_eq!(arena.find_type(scope, "A"), Some(TypeId::ERROR));
}

#[test]
fn test_generic_arity_and_constraints() {
    let mut arena = TypeArena::new();
    let mut diagnostics = DiagnosticBag::new();
    define_aliases(
        &mut arena,
        &mut diagnostics,
        "type Pair<A, B = string> = { first: A, second: B };\n\
         type One = Pair<number>;\n\
         type Three = Pair<number, number, number>;\n\
         type Num<T: number> = { n: T };\n\
         type Bad = Num<string>;\n\
         type Plain = { a: number };\n\
         type NotGeneric = Plain<string>;",
    );
    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Generic \"Pair\" expects 2 type arguments. But 3 given",
            "Type \"string\" does not satisfy the constraint \"number\" of type parameter \"T\"",
            "Type \"Plain\" is not generic",
        ]
    );
}

#[test]
fn test_shorthand_forms() {
    let mut arena = TypeArena::new();
    let mut diagnostics = DiagnosticBag::new();
    let scope = define_aliases(
        &mut arena,
        &mut diagnostics,
        "type Numbers = number[];\ntype Maybe = ?string;\ntype Pair = [number, string];\n\
         type Callback = (error: ?Error, value: number) => void;",
    );
    let numbers = arena.find_type(scope, "Numbers").unwrap();
    assert_eq!(arena.name(numbers), "Array<number>");
    let maybe = arena.find_type(scope, "Maybe").unwrap();
    assert_eq!(arena.name(maybe), "string | null | undefined");
    let pair = arena.find_type(scope, "Pair").unwrap();
    assert_eq!(arena.name(pair), "Array<number | string>");
    // `Error` is not defined without a library.
    assert_eq!(diagnostics.len(), 1);
    let callback = arena.find_type(scope, "Callback").unwrap();
    assert_eq!(arena.name(callback), "Callback");
    assert_eq!(arena.get(callback).as_function().unwrap().params.len(), 2);
}
