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
        "refinement.js",
        &program,
        Some(global),
        &FxHashMap::default(),
        &mut diagnostics,
    )
    .expect("well-formed tree");
    (graph, module, diagnostics)
}

/// Type names of every binding called `name` in the module.
fn types_of<'g>(graph: &'g Graph, module: ModuleId, name: &str) -> Vec<&'g str> {
    graph
        .module(module)
        .scopes
        .iter()
        .filter_map(|&scope| graph.scope(scope).body.get(name))
        .map(|&variable| graph.type_name(variable))
        .collect()
}

#[test]
fn test_typeof_narrows_both_branches() {
    let (graph, module, diagnostics) = build(
        "function f(x: number | string) {
           if (typeof x === \"number\") { const n = x; } else { const s = x; }
         }",
    );
    assert!(diagnostics.is_empty());
    assert_eq!(types_of(&graph, module, "n"), ["number"]);
    assert_eq!(types_of(&graph, module, "s"), ["string"]);
    assert_eq!(
        types_of(&graph, module, "x"),
        ["number | string", "number", "string"]
    );
}

#[test]
fn test_typeof_on_the_right_and_negated() {
    let (graph, module, _) = build(
        "function f(x: number | string) {
           if (\"string\" !== typeof x) { const n = x; }
         }",
    );
    assert_eq!(types_of(&graph, module, "n"), ["number"]);
}

#[test]
fn test_typeof_narrows_unknown() {
    let (graph, module, _) = build(
        "function f(x) {
           if (typeof x === \"string\") { const u = x; }
         }",
    );
    assert_eq!(types_of(&graph, module, "u"), ["string"]);
}

#[test]
fn test_null_comparisons() {
    let (graph, module, diagnostics) = build(
        "function g(x: number | null | undefined) {
           if (x !== null) { const a = x; }
           if (x === undefined) { const b = x; }
           if (x != null) { const c = x; }
         }",
    );
    assert!(diagnostics.is_empty());
    assert_eq!(types_of(&graph, module, "a"), ["number | undefined"]);
    assert_eq!(types_of(&graph, module, "b"), ["undefined"]);
    assert_eq!(types_of(&graph, module, "c"), ["number"]);
}

#[test]
fn test_truthiness() {
    let (graph, module, _) = build(
        "function h(x: string | undefined, flag: boolean) {
           if (x) { const t = x; } else { const e = x; }
           if (flag) { const yes = flag; } else { const no = flag; }
         }",
    );
    assert_eq!(types_of(&graph, module, "t"), ["string"]);
    assert_eq!(types_of(&graph, module, "e"), ["string | undefined"]);
    assert_eq!(types_of(&graph, module, "yes"), ["true"]);
    assert_eq!(types_of(&graph, module, "no"), ["false"]);
}

#[test]
fn test_conjunction_and_negation() {
    let (graph, module, diagnostics) = build(
        "function m(a: number | null, b: string | null) {
           if (a !== null && b !== null) { const both = a; const other = b; }
           if (!(a === null)) { const kept = a; }
         }",
    );
    assert!(diagnostics.is_empty());
    assert_eq!(types_of(&graph, module, "both"), ["number"]);
    assert_eq!(types_of(&graph, module, "other"), ["string"]);
    assert_eq!(types_of(&graph, module, "kept"), ["number"]);
}

#[test]
fn test_disjunction_refines_only_when_false() {
    let (graph, module, _) = build(
        "function d(a: number | null) {
           if (a === null || typeof a === \"number\") { const inside = a; }
           else { const outside = a; }
         }",
    );
    assert_eq!(types_of(&graph, module, "inside"), ["number | null"]);
    assert_eq!(types_of(&graph, module, "outside"), ["never"]);
}

#[test]
fn test_refinement_guards_operands() {
    let (_, _, diagnostics) = build(
        "function n(x: number | null) { return x !== null && x + 1; }
         function o(x: number | null) { return x + 1; }",
    );
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        ["Operator \"+\" cannot be applied to type \"number | null\""]
    );
}

#[test]
fn test_refined_binding_is_marked_and_scoped() {
    let (graph, module, _) = build(
        "function f(x: number | null) {
           if (x !== null) { const inner = x; }
           const after = x;
         }",
    );
    assert_eq!(types_of(&graph, module, "after"), ["number | null"]);
    let refined: Vec<bool> = graph
        .module(module)
        .scopes
        .iter()
        .filter_map(|&scope| graph.scope(scope).body.get("x"))
        .map(|&variable| graph.variable(variable).meta.changed)
        .collect();
    assert_eq!(refined, [false, true]);
}

#[test]
fn test_assignment_through_refined_binding_checks_declared_type() {
    let (_, _, diagnostics) = build(
        "function f(x: number | null) {
           if (x !== null) { x = null; x = \"s\"; }
         }",
    );
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        ["Type \"'s'\" is incompatible with type \"number | null\""]
    );
}
