use super::*;
use hegel_common::DiagnosticKind;

fn user_module(graph: &mut Graph, source: &str) -> ModuleId {
    let program = hegel_parser::parse(source).expect("test source parses");
    let global = graph.global;
    let mut diagnostics = DiagnosticBag::new();
    let module = build_module(
        graph,
        "main.js",
        &program,
        Some(global),
        &FxHashMap::default(),
        &mut diagnostics,
    )
    .expect("well-formed tree");
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.clone()).collect();
    assert!(messages.is_empty(), "{messages:?}");
    module
}

fn top<'g>(graph: &'g Graph, module: ModuleId, name: &str) -> &'g str {
    let scope = graph.module(module).scope;
    graph.type_name(graph.scope(scope).body[name])
}

#[test]
fn test_all_libraries_load_cleanly() {
    let mut graph = Graph::new();
    let libraries = load_environment(&mut graph, &[Environment::Browser, Environment::NodeJs])
        .expect("shipped libraries type-check");
    assert_eq!(libraries.platforms.len(), 2);
    for name in ["fs", "path", "os"] {
        assert!(graph.ambient_modules.contains_key(name), "{name}");
    }
    let global = graph.global_scope();
    for name in ["console", "parseInt", "Array", "Promise", "document", "process"] {
        assert!(graph.scope(global).body.contains_key(name), "{name}");
    }
    assert!(graph.find_type(global, "Map").is_some());
}

#[test]
fn test_repeated_environment_loads_once() {
    let mut graph = Graph::new();
    let libraries =
        load_environment(&mut graph, &[Environment::NodeJs, Environment::NodeJs]).unwrap();
    assert_eq!(libraries.platforms.len(), 1);
}

#[test]
fn test_platform_globals_need_their_environment() {
    let mut graph = Graph::new();
    load_environment(&mut graph, &[]).unwrap();
    let global = graph.global_scope();
    assert!(graph.scope(global).body.contains_key("console"));
    assert!(!graph.scope(global).body.contains_key("document"));
    assert!(graph.ambient_modules.is_empty());
}

#[test]
fn test_user_code_sees_standard_members() {
    let mut graph = Graph::new();
    load_environment(&mut graph, &[]).unwrap();
    let module = user_module(
        &mut graph,
        "const count = [1, 2].length;
         const upper = \"a\".toUpperCase();
         const parts = \"a,b\".split(\",\");
         const floor = Math.floor(1.5);
         const fixed = (2).toFixed(1);",
    );
    assert_eq!(top(&graph, module, "count"), "number");
    assert_eq!(top(&graph, module, "upper"), "string");
    assert_eq!(top(&graph, module, "parts"), "Array<string>");
    assert_eq!(top(&graph, module, "floor"), "number");
    assert_eq!(top(&graph, module, "fixed"), "string");
}

#[test]
fn test_library_type_errors_are_environment_errors() {
    let mut graph = Graph::new();
    let error = load_library(&mut graph, "broken.d.ts", "declare var x: Missing;", None)
        .expect_err("unknown type");
    let EnvironmentError::Diagnostics {
        library,
        diagnostics,
    } = &error
    else {
        panic!("expected diagnostics, got {error}");
    };
    assert_eq!(library, "broken.d.ts");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Type);
    assert_eq!(error.diagnostics().len(), 1);
}

#[test]
fn test_library_parse_failure() {
    let mut graph = Graph::new();
    let error = load_library(&mut graph, "broken.d.ts", "declare var = ;", None)
        .expect_err("syntax error");
    assert!(matches!(error, EnvironmentError::Parse { .. }));
    assert_eq!(error.diagnostics()[0].kind, DiagnosticKind::Parse);
}

#[test]
fn test_environment_names() {
    assert_eq!("browser".parse::<Environment>(), Ok(Environment::Browser));
    assert_eq!("NodeJS".parse::<Environment>(), Ok(Environment::NodeJs));
    assert!("deno".parse::<Environment>().is_err());
    let parsed: Vec<Environment> = serde_json::from_str("[\"nodejs\", \"browser\"]").unwrap();
    assert_eq!(parsed, [Environment::NodeJs, Environment::Browser]);
    assert_eq!(Environment::NodeJs.to_string(), "nodejs");
}
