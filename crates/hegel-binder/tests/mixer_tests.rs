use super::*;
use crate::state::build_module;
use hegel_common::DiagnosticBag;
use hegel_solver::TypeId;
use rustc_hash::FxHashMap;

const STANDARD: &str = "
declare var Infinity: number;
declare function parseInt(text: string): number;
type Numeric = number;
";

fn build(graph: &mut Graph, path: &str, source: &str, parent: Option<ModuleId>) -> ModuleId {
    let program = hegel_parser::parse(source).expect("test source parses");
    let mut diagnostics = DiagnosticBag::new();
    let module = build_module(
        graph,
        path,
        &program,
        parent,
        &FxHashMap::default(),
        &mut diagnostics,
    )
    .expect("well-formed tree");
    assert!(diagnostics.is_empty(), "{path}: {diagnostics:?}");
    module
}

#[test]
fn test_mixing_copies_bindings_and_types() {
    let mut graph = Graph::new();
    let standard = build(&mut graph, "standard.d.ts", STANDARD, None);
    let global = graph.global;
    assert_eq!(mix_library(&mut graph, standard, global), 2);

    let global_scope = graph.global_scope();
    let copy = graph.scope(global_scope).body["Infinity"];
    let original = graph.scope(graph.module(standard).scope).body["Infinity"];
    assert_eq!(graph.variable(copy).mixed_from, Some(original));
    assert_eq!(graph.variable(copy).ty, graph.variable(original).ty);
    assert_eq!(graph.variable(copy).parent, global_scope);
    assert!(graph.find_type(global_scope, "Numeric").is_some());
}

#[test]
fn test_mixing_twice_is_a_no_op() {
    let mut graph = Graph::new();
    let standard = build(&mut graph, "standard.d.ts", STANDARD, None);
    let global = graph.global;
    mix_library(&mut graph, standard, global);
    let variables = graph.variable_count();
    assert_eq!(mix_library(&mut graph, standard, global), 0);
    assert_eq!(graph.variable_count(), variables);
    let mixed = &graph.types.scope(graph.module(global).type_scope).mixed_from;
    assert_eq!(mixed.len(), 1);
}

#[test]
fn test_user_code_sees_mixed_library() {
    let mut graph = Graph::new();
    let standard = build(&mut graph, "standard.d.ts", STANDARD, None);
    let global = graph.global;
    mix_library(&mut graph, standard, global);
    let main = build(
        &mut graph,
        "main.js",
        "const n = parseInt(\"1\"); const i: Numeric = Infinity;",
        Some(global),
    );
    let scope = graph.module(main).scope;
    assert_eq!(graph.type_name(graph.scope(scope).body["n"]), "number");
    assert_eq!(graph.module(main).references.len(), 2);
}

#[test]
fn test_library_built_without_parent_does_not_see_user_code() {
    let mut graph = Graph::new();
    let global_scope = graph.global_scope();
    let marker = VariableInfo::new("marker", TypeId::NUMBER, global_scope, Default::default());
    graph.declare(global_scope, marker);
    let standard = build(&mut graph, "standard.d.ts", STANDARD, None);
    let scope = graph.module(standard).scope;
    assert_eq!(graph.scope(scope).parent, None);
    assert!(graph.find_variable(scope, "marker").is_none());
    assert!(graph.find_variable(global_scope, "marker").is_some());
}

#[test]
fn test_later_library_replaces_earlier_binding() {
    let mut graph = Graph::new();
    let global = graph.global;
    let standard = build(&mut graph, "standard.d.ts", STANDARD, None);
    mix_library(&mut graph, standard, global);
    let browser = build(
        &mut graph,
        "browser.d.ts",
        "declare var Infinity: string;",
        Some(global),
    );
    assert_eq!(mix_library(&mut graph, browser, global), 1);
    let global_scope = graph.global_scope();
    let infinity = graph.scope(global_scope).body["Infinity"];
    assert_eq!(graph.type_name(infinity), "string");
}
