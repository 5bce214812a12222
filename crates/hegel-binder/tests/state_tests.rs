use super::*;
use hegel_common::{DiagnosticBag, DiagnosticKind};
use hegel_solver::TypeData;

struct Built {
    graph: Graph,
    module: ModuleId,
    diagnostics: DiagnosticBag,
}

fn build(source: &str) -> Built {
    let program = hegel_parser::parse(source).expect("test source parses");
    let mut graph = Graph::new();
    let mut diagnostics = DiagnosticBag::new();
    let global = graph.global;
    let module = build_module(
        &mut graph,
        "test.js",
        &program,
        Some(global),
        &FxHashMap::default(),
        &mut diagnostics,
    )
    .expect("well-formed tree");
    Built {
        graph,
        module,
        diagnostics,
    }
}

impl Built {
    /// Type name of a top-level binding.
    fn top(&self, name: &str) -> &str {
        let scope = self.graph.module(self.module).scope;
        let variable = self.graph.scope(scope).body[name];
        self.graph.type_name(variable)
    }

    /// Type names of every binding called `name`, in scope creation order.
    fn everywhere(&self, name: &str) -> Vec<&str> {
        self.graph
            .module(self.module)
            .scopes
            .iter()
            .filter_map(|&scope| self.graph.scope(scope).body.get(name))
            .map(|&variable| self.graph.type_name(variable))
            .collect()
    }

    fn messages(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.as_str())
            .collect()
    }
}

#[test]
fn test_nested_blocks_shadow_without_touching_outer_bindings() {
    let built = build(
        "const b: number = 2;
         {
           const b: string = \"s\";
           { const b: number = 5; }
           { const b: number = 6; }
         }",
    );
    assert!(built.diagnostics.is_empty(), "{:?}", built.messages());
    assert_eq!(built.top("b"), "number");
    assert_eq!(built.everywhere("b"), ["number", "string", "number", "number"]);

    let scopes = &built.graph.module(built.module).scopes;
    let outer_block = scopes[1];
    let found = built.graph.find_variable(outer_block, "b").unwrap();
    assert_eq!(built.graph.type_name(found), "string");
    assert_eq!(built.graph.scope(outer_block).kind, ScopeKind::Block);
    assert_eq!(built.graph.scope(scopes[2]).parent, Some(outer_block));
    assert_eq!(built.graph.scope(scopes[3]).parent, Some(outer_block));
}

#[test]
fn test_redeclaration_in_same_scope_replaces() {
    let built = build("var a = 1; var a = \"text\";");
    let scope = built.graph.module(built.module).scope;
    assert_eq!(built.graph.scope(scope).body.len(), 1);
    assert_eq!(built.top("a"), "string");
}

#[test]
fn test_const_keeps_literal_and_let_widens() {
    let built = build("const one = 1; let two = 2; let nothing;");
    assert_eq!(built.top("one"), "1");
    assert_eq!(built.top("two"), "number");
    assert_eq!(built.top("nothing"), "unknown");
}

#[test]
fn test_undefined_variable_reports_once_and_continues() {
    let built = build("const a = missing + 1; const b: number = 2;");
    assert_eq!(built.messages(), ["\"missing\" is not defined"]);
    assert_eq!(built.top("a"), "?");
    assert_eq!(built.top("b"), "number");
}

#[test]
fn test_incompatible_initializer() {
    let built = build("const a: number = \"x\";");
    assert_eq!(
        built.messages(),
        ["Type \"'x'\" is incompatible with type \"number\""]
    );
    let diagnostic = built.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::Type);
    assert_eq!(diagnostic.source, "test.js");
    assert_eq!(diagnostic.loc.start.line, 1);
    assert_eq!(diagnostic.loc.start.column, 18);
}

#[test]
fn test_call_arity_and_argument_types() {
    let built = build(
        "function add(a: number, b: number): number { return a + b; }
         add(1);
         add(\"s\", 2);
         add(1, 2, 3);
         const sum = add(1, 2);",
    );
    assert_eq!(
        built.messages(),
        [
            "2 arguments are expected. But 1 given",
            "Type \"'s'\" is incompatible with type \"number\"",
            "2 arguments are expected. But 3 given",
        ]
    );
    assert_eq!(built.top("add"), "(number, number) => number");
    assert_eq!(built.top("sum"), "number");
}

#[test]
fn test_return_type_is_widened_union_of_returns() {
    let built = build(
        "function pick(flag: boolean) {
           if (flag) { return 1; }
           return \"none\";
         }
         function nothing() {}",
    );
    assert_eq!(built.top("pick"), "(boolean) => number | string");
    assert_eq!(built.top("nothing"), "() => undefined");
}

#[test]
fn test_declared_return_type_is_checked() {
    let built = build("function f(): string { return 1; }");
    assert_eq!(
        built.messages(),
        ["Type \"1\" is incompatible with type \"string\""]
    );
}

#[test]
fn test_hoisted_function_is_analysed_on_first_use() {
    let built = build("const r = later(); function later() { return 1; }");
    assert!(built.diagnostics.is_empty(), "{:?}", built.messages());
    assert_eq!(built.top("r"), "number");
    assert_eq!(built.top("later"), "() => number");
}

#[test]
fn test_recursive_function_without_annotation_terminates() {
    let built = build(
        "function spin(n: number) { return spin(n); }
         function ping(n: number) { return pong(n); }
         function pong(n: number) { return ping(n); }",
    );
    assert!(built.diagnostics.is_empty(), "{:?}", built.messages());
    assert_eq!(built.top("spin"), "(number) => unknown");
    let ping = built.graph.module(built.module).scope;
    let ping = built.graph.scope(ping).body["ping"];
    assert!(built.graph.types.get(built.graph.variable(ping).ty).is_function());
}

#[test]
fn test_unannotated_parameters_are_unknown() {
    let built = build("function id(x) { return x; }");
    assert_eq!(built.top("id"), "(unknown) => unknown");
}

#[test]
fn test_thrown_types_reach_function_and_catch() {
    let built = build(
        "function fail() { throw \"bad\"; }
         try {
           fail();
         } catch (e) {
           const caught = e;
         }",
    );
    assert!(built.diagnostics.is_empty(), "{:?}", built.messages());
    let scope = built.graph.module(built.module).scope;
    let fail = built.graph.variable(built.graph.scope(scope).body["fail"]).ty;
    let shape = built.graph.types.get(fail).as_function().unwrap();
    assert_eq!(shape.throws, Some(TypeId::STRING));
    assert_eq!(built.everywhere("e"), ["string"]);
    assert_eq!(built.everywhere("caught"), ["string"]);
}

#[test]
fn test_catch_without_known_throws_is_unknown() {
    let built = build("try { const a = 1; } catch (error) {}");
    assert_eq!(built.everywhere("error"), ["unknown"]);
}

#[test]
fn test_constant_reassignment() {
    let built = build("const a = 1; a = 2; let b = 1; b = \"s\";");
    assert_eq!(
        built.messages(),
        [
            "Cannot assign to \"a\" because it is a constant",
            "Type \"'s'\" is incompatible with type \"number\"",
        ]
    );
}

#[test]
fn test_unknown_node_becomes_diagnostic() {
    let built = build("switch (x) { case 1: break; } const after = true;");
    assert_eq!(built.messages(), ["Syntax \"SwitchStatement\" is not supported"]);
    assert_eq!(built.top("after"), "true");
}

#[test]
fn test_references_are_recorded() {
    let built = build("const a = 1;\nconst b = a;");
    let references = &built.graph.module(built.module).references;
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].name, "a");
    assert_eq!(references[0].loc.start.line, 2);
    let scope = built.graph.module(built.module).scope;
    assert_eq!(references[0].variable, built.graph.scope(scope).body["a"]);
}

#[test]
fn test_type_alias_is_registered_in_module_type_scope() {
    let built = build("type Point = { x: number, y: number }; const p: Point = { x: 1, y: 2 };");
    assert!(built.diagnostics.is_empty(), "{:?}", built.messages());
    assert_eq!(built.top("p"), "Point");
    let scope = built.graph.module(built.module).scope;
    let point = built.graph.find_type(scope, "Point").unwrap();
    assert!(matches!(built.graph.types.data(point), TypeData::Object(_)));
}

#[test]
fn test_nested_module_declaration_is_malformed() {
    let program = hegel_parser::parse("{ declare module \"inner\" {} }").unwrap();
    let mut graph = Graph::new();
    let mut diagnostics = DiagnosticBag::new();
    let global = graph.global;
    let result = build_module(
        &mut graph,
        "test.js",
        &program,
        Some(global),
        &FxHashMap::default(),
        &mut diagnostics,
    );
    assert!(matches!(
        result,
        Err(MalformedTree::NestedModuleDeclaration { .. })
    ));
}
