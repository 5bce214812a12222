use super::*;
use crate::scope::{Graph, ModuleId};
use crate::state::build_module;
use hegel_common::DiagnosticBag;
use rustc_hash::FxHashMap;

fn build(source: &str) -> (Graph, ModuleId, DiagnosticBag) {
    let program = hegel_parser::parse(source).expect("test source parses");
    let mut graph = Graph::new();
    let mut diagnostics = DiagnosticBag::new();
    let global = graph.global;
    let module = build_module(
        &mut graph,
        "expressions.js",
        &program,
        Some(global),
        &FxHashMap::default(),
        &mut diagnostics,
    )
    .expect("well-formed tree");
    (graph, module, diagnostics)
}

fn top<'g>(graph: &'g Graph, module: ModuleId, name: &str) -> &'g str {
    let scope = graph.module(module).scope;
    graph.type_name(graph.scope(scope).body[name])
}

fn messages(diagnostics: &DiagnosticBag) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

// =============================================================================
// Objects and arrays
// =============================================================================

#[test]
fn test_object_literal_properties_are_widened() {
    let (graph, module, diagnostics) = build("const o = { a: 1 }; const x = o.a; o.b;");
    assert_eq!(top(&graph, module, "o"), "{ a: number }");
    assert_eq!(top(&graph, module, "x"), "number");
    assert_eq!(
        messages(&diagnostics),
        ["Property \"b\" does not exist in \"{ a: number }\""]
    );
}

#[test]
fn test_object_literal_gets_its_own_scope() {
    let (graph, module, _) = build("const point = { x: 1, y: \"y\" };");
    let object_scope = graph
        .module(module)
        .scopes
        .iter()
        .copied()
        .find(|&scope| graph.scope(scope).kind == ScopeKind::Object)
        .expect("object scope");
    let body = &graph.scope(object_scope).body;
    assert_eq!(body.keys().collect::<Vec<_>>(), ["x", "y"]);
    assert_eq!(graph.type_name(body["y"]), "string");
}

#[test]
fn test_object_method_sees_this() {
    let (graph, module, diagnostics) = build(
        "const counter = { count: 1, read() { return this.count; } };
         const current = counter.read();",
    );
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "current"), "number");
}

#[test]
fn test_array_literal_and_index_access() {
    let (graph, module, diagnostics) = build("const list = [1, 2]; const first = list[0];");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "list"), "Array<number>");
    assert_eq!(top(&graph, module, "first"), "number");
}

#[test]
fn test_mixed_array_element_union() {
    let (graph, module, _) = build("const mixed = [1, \"a\"];");
    assert_eq!(top(&graph, module, "mixed"), "Array<number | string>");
}

#[test]
fn test_optional_member_admits_undefined() {
    let (graph, module, diagnostics) =
        build("function read(o: { a: number } | null) { return o?.a; }");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(
        top(&graph, module, "read"),
        "({ a: number } | null) => number | undefined"
    );
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn test_generic_call_sites_do_not_interfere() {
    let (graph, module, diagnostics) = build(
        "function id<T>(x: T): T { return x; }
         let a = id(1);
         let b = id(\"s\");",
    );
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "id"), "<T>(T) => T");
    assert_eq!(top(&graph, module, "a"), "number");
    assert_eq!(top(&graph, module, "b"), "string");
}

#[test]
fn test_explicit_type_arguments_are_checked() {
    let (_, _, diagnostics) = build(
        "function id<T>(x: T): T { return x; }
         id<string>(1);",
    );
    assert_eq!(
        messages(&diagnostics),
        ["Type \"1\" is incompatible with type \"string\""]
    );
}

#[test]
fn test_too_many_type_arguments() {
    let (_, _, diagnostics) = build(
        "function id<T>(x: T): T { return x; }
         id<number, string>(1);",
    );
    assert_eq!(
        messages(&diagnostics),
        ["Generic \"<T>(T) => T\" expects 1 type arguments. But 2 given"]
    );
}

#[test]
fn test_generic_callback_parameter_is_contextually_typed() {
    let (graph, module, diagnostics) = build(
        "function map<T, U>(value: T, f: (item: T) => U): U { return f(value); }
         let mapped = map(1, function (item) { return item + 1; });",
    );
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "mapped"), "number");
}

#[test]
fn test_contextual_function_type() {
    let (_, _, diagnostics) =
        build("const inc: (x: number) => number = function (x) { return x + 1; };");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_not_callable_and_not_constructable() {
    let (_, _, diagnostics) = build("const n = 1; n(); new n();");
    assert_eq!(
        messages(&diagnostics),
        ["\"1\" is not a function", "\"1\" is not a class"]
    );
}

#[test]
fn test_optional_and_rest_parameters() {
    let (graph, module, diagnostics) = build(
        "function f(a: number, b?: string) { return a; }
         f(1);
         f(1, \"x\");
         function g(...rest: Array<number>) { return rest; }
         g();
         g(1, 2, 3);
         g(1, \"no\");",
    );
    assert_eq!(
        messages(&diagnostics),
        ["Type \"'no'\" is incompatible with type \"number\""]
    );
    assert_eq!(top(&graph, module, "g"), "(...Array<number>) => Array<number>");
}

#[test]
fn test_async_function_wraps_in_promise() {
    let (graph, module, diagnostics) = build(
        "class Promise<T> {}
         async function one() { return 1; }
         async function two() { const value = await one(); return value; }",
    );
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "one"), "() => Promise<number>");
    assert_eq!(top(&graph, module, "two"), "() => Promise<number>");
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_arithmetic_and_concatenation() {
    let (graph, module, diagnostics) = build(
        "let s = \"a\" + 1;
         let m = 2 * 3;
         let c = 1 < 2;
         let t = typeof m;",
    );
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "s"), "string");
    assert_eq!(top(&graph, module, "m"), "number");
    assert_eq!(top(&graph, module, "c"), "boolean");
    assert_eq!(top(&graph, module, "t"), "string");
}

#[test]
fn test_invalid_operands() {
    let (_, _, diagnostics) = build("const bad = {} - 1; let s = \"a\"; s++;");
    assert_eq!(
        messages(&diagnostics),
        [
            "Operator \"-\" cannot be applied to type \"{}\"",
            "Operator \"++\" cannot be applied to type \"string\"",
        ]
    );
}

#[test]
fn test_unknown_operands_are_lenient() {
    let (graph, module, diagnostics) = build("function f(a, b) { return a * b; }");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "f"), "(unknown, unknown) => number");
}

#[test]
fn test_logical_operators() {
    let (graph, module, diagnostics) = build(
        "function f(a: number | null) {
           const fallback = a || 0;
           const coalesced = a ?? \"none\";
           return fallback;
         }",
    );
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert_eq!(top(&graph, module, "f"), "(number | null) => number");
    let names: Vec<_> = graph
        .module(module)
        .scopes
        .iter()
        .filter_map(|&scope| graph.scope(scope).body.get("coalesced"))
        .map(|&variable| graph.type_name(variable))
        .collect();
    assert_eq!(names, ["number | 'none'"]);
}

#[test]
fn test_conditional_unions_branches() {
    let (graph, module, _) = build("let pick = true ? 1 : \"one\";");
    assert_eq!(top(&graph, module, "pick"), "number | string");
}

#[test]
fn test_update_of_constant() {
    let (_, _, diagnostics) = build("const i = 0; i++;");
    assert_eq!(
        messages(&diagnostics),
        ["Cannot assign to \"i\" because it is a constant"]
    );
}

#[test]
fn test_compound_assignment() {
    let (_, _, diagnostics) = build("let total = 0; total += 2; total += \"x\";");
    assert_eq!(
        messages(&diagnostics),
        ["Type \"string\" is incompatible with type \"number\""]
    );
}

#[test]
fn test_compound_assignment_records_one_reference() {
    let (graph, module, diagnostics) = build("let total = 0;\ntotal += 2;");
    assert!(diagnostics.is_empty());
    let references = &graph.module(module).references;
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].name, "total");
    assert_eq!(references[0].loc.start.line, 2);
}

#[test]
fn test_member_assignment_is_checked() {
    let (_, _, diagnostics) = build("const o = { a: 1 }; o.a = 2; o.a = \"s\";");
    assert_eq!(
        messages(&diagnostics),
        ["Type \"'s'\" is incompatible with type \"number\""]
    );
}

#[test]
fn test_this_outside_class() {
    let (_, _, diagnostics) = build("const self = this;");
    assert_eq!(
        messages(&diagnostics),
        ["\"this\" cannot be used outside of a class or object"]
    );
}

#[test]
fn test_type_cast() {
    let (graph, module, diagnostics) = build("const n = (1: number); const bad = (\"s\": number);");
    assert_eq!(top(&graph, module, "n"), "number");
    assert_eq!(
        messages(&diagnostics),
        ["Type \"'s'\" is incompatible with type \"number\""]
    );
}
