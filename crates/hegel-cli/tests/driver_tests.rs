use crate::args::CliArgs;
use crate::driver::{FATAL_STATUS, MAX_DIAGNOSTIC_STATUS, exit_status, run};
use clap::Parser;
use std::path::Path;

struct Run {
    status: u8,
    out: String,
    err: String,
}

fn run_in(root: &Path, argv: &[&str]) -> Run {
    let args = CliArgs::try_parse_from(std::iter::once("hegel").chain(argv.iter().copied()))
        .expect("valid arguments");
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = run(&args, root, false, &mut out, &mut err).expect("run completes");
    Run {
        status,
        out: String::from_utf8(out).unwrap(),
        err: String::from_utf8(err).unwrap(),
    }
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

#[test]
fn test_clean_project_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "index.js", "import { twice } from \"./math\";\nconst four = twice(2);\n");
    write(dir.path(), "math.js", "export function twice(x: number) { return x * 2; }\n");
    let run = run_in(dir.path(), &[]);
    assert_eq!(run.status, 0, "{}", run.out);
    assert!(run.out.ends_with("No errors found.\n"));
    assert!(run.err.is_empty());
}

#[test]
fn test_status_counts_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/a.js",
        "const a: number = \"s\";\nconst b: string = 1;\n",
    );
    let run = run_in(dir.path(), &[]);
    assert_eq!(run.status, 2);
    assert!(
        run.out
            .contains("src/a.js:1:19 - error: Type \"'s'\" is incompatible with type \"number\""),
        "{}",
        run.out
    );
    assert!(run.out.contains("src/a.js:2:19 - error:"), "{}", run.out);
    assert!(run.out.ends_with("Found 2 errors.\n"));
}

#[test]
fn test_explicit_files_override_globs() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.js", "const ok = 1;\n");
    write(dir.path(), "bad.js", "const a: number = \"s\";\n");
    let run = run_in(dir.path(), &["good.js"]);
    assert_eq!(run.status, 0, "{}", run.out);
}

#[test]
fn test_environment_flag_enables_ambient_modules() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "index.js",
        "import { join } from \"path\";\nconst joined = join(\"a\", \"b\");\n",
    );
    let without = run_in(dir.path(), &[]);
    assert_eq!(without.status, 1);
    assert!(without.out.contains("Path \"path\" cannot be resolved"), "{}", without.out);

    let with = run_in(dir.path(), &["--env", "nodejs"]);
    assert_eq!(with.status, 0, "{}", with.out);
}

#[test]
fn test_config_file_selects_environment_and_files() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        ".hegelrc.json",
        r#"{ "include": ["./src/**/*.js"], "environment": ["browser"] }"#,
    );
    write(dir.path(), "src/app.js", "const title = document;\n");
    write(dir.path(), "scripts/bad.js", "const a: number = \"s\";\n");
    let run = run_in(dir.path(), &[]);
    assert_eq!(run.status, 0, "{}", run.out);
}

#[test]
fn test_print_types() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.js", "const n = 1;\nlet s = \"x\";\n");
    let run = run_in(dir.path(), &["--print-types", "a.js"]);
    assert_eq!(run.status, 0);
    assert!(run.out.contains("a.js\n  n: 1\n  s: string\n"), "{}", run.out);
}

#[test]
fn test_parse_error_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.js", "const = 1;\n");
    let run = run_in(dir.path(), &["a.js"]);
    assert_eq!(run.status, 1);
    assert!(run.out.starts_with("a.js:1:"), "{}", run.out);
}

#[test]
fn test_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let args = CliArgs::try_parse_from(["hegel", "--config", "nope.json"]).unwrap();
    let error = run(&args, dir.path(), false, &mut Vec::new(), &mut Vec::new()).unwrap_err();
    assert!(format!("{error:#}").contains("nope.json"));
}

#[test]
fn test_exit_status_is_capped() {
    assert_eq!(exit_status(0), 0);
    assert_eq!(exit_status(3), 3);
    assert_eq!(exit_status(254), 254);
    assert_eq!(exit_status(255), MAX_DIAGNOSTIC_STATUS);
    assert_eq!(exit_status(1000), MAX_DIAGNOSTIC_STATUS);
    assert_ne!(exit_status(usize::MAX), FATAL_STATUS);
}
