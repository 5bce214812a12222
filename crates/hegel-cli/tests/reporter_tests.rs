use crate::reporter::Reporter;
use hegel_common::{Diagnostic, DiagnosticKind, SourceLocation};

fn diagnostic(source: &str, loc: SourceLocation, message: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::Type, message, loc, source)
}

#[test]
fn test_location_is_relative_and_one_based() {
    let mut reporter = Reporter::new(false, "/project");
    reporter.add_source("/project/src/a.js", "let x = 1;\nconst a: number = \"s\";\n");
    let text = reporter.format_diagnostic(&diagnostic(
        "/project/src/a.js",
        SourceLocation::from_coords((2, 18), (2, 21)),
        "Type \"'s'\" is incompatible with type \"number\"",
    ));
    let expected = [
        "src/a.js:2:19 - error: Type \"'s'\" is incompatible with type \"number\"",
        "    2   const a: number = \"s\";",
        "                          ~~~",
    ]
    .join("\n");
    assert_eq!(text, expected);
}

#[test]
fn test_multiline_range_underlines_to_end_of_line() {
    let mut reporter = Reporter::new(false, "/project");
    reporter.add_source("/project/a.js", "call(a,\n  b);");
    let text = reporter.format_diagnostic(&diagnostic(
        "/project/a.js",
        SourceLocation::from_coords((1, 5), (2, 3)),
        "message",
    ));
    assert!(text.ends_with("\n             ~~"), "{text}");
}

#[test]
fn test_unreadable_source_has_no_frame() {
    let mut reporter = Reporter::new(false, "/project");
    let text = reporter.format_diagnostic(&diagnostic(
        "/project/missing/file.js",
        SourceLocation::from_coords((1, 0), (1, 0)),
        "Module cannot be read",
    ));
    assert_eq!(text, "missing/file.js:1:1 - error: Module cannot be read");
}

#[test]
fn test_diagnostic_without_source() {
    let mut reporter = Reporter::new(false, "/project");
    let text = reporter.format_diagnostic(&diagnostic(
        "",
        SourceLocation::default(),
        "Path \"x\" cannot be resolved",
    ));
    assert_eq!(text, "<unknown> - error: Path \"x\" cannot be resolved");
}

#[test]
fn test_render_separates_diagnostics() {
    let mut reporter = Reporter::new(false, "/project");
    let loc = SourceLocation::default();
    let text = reporter.render(&[
        diagnostic("", loc, "first"),
        diagnostic("", loc, "second"),
    ]);
    assert_eq!(text, "<unknown> - error: first\n\n<unknown> - error: second");
}

#[test]
fn test_summary() {
    let reporter = Reporter::new(false, "/project");
    assert_eq!(reporter.format_summary(0), "No errors found.");
    assert_eq!(reporter.format_summary(1), "Found 1 error.");
    assert_eq!(reporter.format_summary(3), "Found 3 errors.");
}
