use super::*;
use crate::host::MemoryHost;
use crate::session::SessionConfig;
use hegel_common::DiagnosticKind;
use std::path::Path;
use std::rc::Rc;

fn session(files: &[(&str, &str)]) -> Rc<Session> {
    let host = MemoryHost::new();
    for (path, text) in files {
        host.insert(format!("/project/{path}"), *text);
    }
    let config = SessionConfig {
        root: PathBuf::from("/project"),
        ..SessionConfig::default()
    };
    Session::new(config, Rc::new(host)).expect("libraries load")
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn summary(result: &CheckResult) -> Vec<(String, String)> {
    result
        .diagnostics
        .iter()
        .map(|d| (d.source.clone(), d.message.clone()))
        .collect()
}

#[tokio::test]
async fn test_diagnostics_follow_input_order_then_dependencies() {
    let session = session(&[
        ("a.js", "const a: number = \"x\";"),
        ("b.js", "import { c } from \"./c\";\nconst copy: string = c;"),
        ("c.js", "export const c: string = 1;"),
    ]);
    let result = check(&session, &paths(&["a.js", "b.js"])).await;
    assert!(result.modules.iter().all(Option::is_some));
    assert_eq!(
        summary(&result),
        [
            (
                "/project/a.js".to_string(),
                "Type \"'x'\" is incompatible with type \"number\"".to_string()
            ),
            (
                "/project/c.js".to_string(),
                "Type \"1\" is incompatible with type \"string\"".to_string()
            ),
        ]
    );
    assert_eq!(result.global_scope, session.graph().global_scope());
}

#[tokio::test]
async fn test_listed_and_imported_module_reports_once() {
    let session = session(&[
        ("main.js", "import { util } from \"./util\";"),
        ("util.js", "export const util: number = true;"),
    ]);
    let result = check(&session, &paths(&["main.js", "util.js", "main.js"])).await;
    assert_eq!(result.modules.len(), 3);
    assert_eq!(result.modules[0], result.modules[2]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].source, "/project/util.js");
}

#[tokio::test]
async fn test_parse_failure_stops_only_that_file() {
    let session = session(&[("broken.js", "const = 1;"), ("fine.js", "const ok = 1;")]);
    let result = check(&session, &paths(&["broken.js", "fine.js"])).await;
    assert_eq!(result.modules[0], None);
    assert!(result.modules[1].is_some());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Parse);
    assert_eq!(result.diagnostics[0].source, "/project/broken.js");
    assert!(!result.is_clean());
}

#[tokio::test]
async fn test_unresolved_import_in_batch() {
    let session = session(&[(
        "main.js",
        "import { gone } from \"./gone\";\nconst kept = 1;\nconst sum = kept + 1;",
    )]);
    let result = check(&session, &paths(&["main.js"])).await;
    assert_eq!(
        summary(&result),
        [(
            "/project/main.js".to_string(),
            "Path \"./gone\" cannot be resolved".to_string()
        )]
    );
    let graph = session.graph();
    let module = result.modules[0].expect("main builds");
    let scope = graph.module(module).scope;
    assert_eq!(graph.type_name(graph.scope(scope).body["sum"]), "number");
}

#[tokio::test]
async fn test_missing_input_file() {
    let session = session(&[]);
    let result = check(&session, &[Path::new("nope.js").to_path_buf()]).await;
    assert_eq!(result.modules, [None]);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Resolution);
}

#[tokio::test]
async fn test_clean_project() {
    let session = session(&[("main.js", "const list = [1, 2];\nconst total = list.length;")]);
    let result = check(&session, &paths(&["main.js"])).await;
    assert!(result.is_clean(), "{:?}", summary(&result));
}
