use super::*;
use crate::position::SourceLocation;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message(messages::INCOMPATIBLE_TYPES, &["string", "number"]);
    assert_eq!(text, "Type \"string\" is incompatible with type \"number\"");
}

#[test]
fn test_bag_preserves_insertion_order() {
    let mut bag = DiagnosticBag::new();
    let loc = SourceLocation::from_coords((1, 0), (1, 4));
    bag.report(DiagnosticKind::Type, "first", loc, "/a.js");
    bag.report(DiagnosticKind::Resolution, "second", loc, "/a.js");
    bag.report(DiagnosticKind::Type, "third", loc, "/b.js");

    let messages: Vec<_> = bag.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, ["first", "second", "third"]);
    assert_eq!(bag.count_of(DiagnosticKind::Type), 2);
    assert_eq!(bag.count_of(DiagnosticKind::Parse), 0);
}

#[test]
fn test_display_uses_one_based_columns() {
    let diagnostic = Diagnostic::type_error(
        "boom",
        SourceLocation::from_coords((3, 0), (3, 2)),
        "/src/index.js",
    );
    assert_eq!(diagnostic.to_string(), "/src/index.js:3:1 - type error: boom");
}

#[test]
fn test_diagnostic_serializes_kind_and_location() {
    let diagnostic = Diagnostic::new(
        DiagnosticKind::Resolution,
        "missing",
        SourceLocation::from_coords((1, 2), (1, 9)),
        "/a.js",
    );
    let json = serde_json::to_value(&diagnostic).unwrap();
    assert_eq!(json["kind"], "Resolution");
    assert_eq!(json["loc"]["start"]["column"], 2);
    assert_eq!(json["source"], "/a.js");
}
