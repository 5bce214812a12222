//! Diagnostic types and the append-only Error Collector.
//!
//! Analysis never aborts on semantic problems: the builder records a
//! `Diagnostic`, substitutes the error sentinel type and keeps going. Only
//! parse-level failures stop a module, and those travel as `Parse` kind
//! diagnostics inside the module error.

use crate::position::SourceLocation;
use serde::Serialize;
use std::fmt;

/// Diagnostic taxonomy visible to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Malformed source; aborts the module that contains it.
    Parse,
    /// An import specifier could not be mapped to a module.
    Resolution,
    /// Incompatibility, missing property, arity mismatch and friends.
    Type,
}

impl DiagnosticKind {
    pub const fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Parse => "parse error",
            DiagnosticKind::Resolution => "resolution error",
            DiagnosticKind::Type => "type error",
        }
    }
}

/// A located analysis error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub loc: SourceLocation,
    /// Path of the module the diagnostic originates from.
    pub source: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        kind: DiagnosticKind,
        message: impl Into<String>,
        loc: SourceLocation,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            loc,
            source: source.into(),
        }
    }

    #[must_use]
    pub fn type_error(message: impl Into<String>, loc: SourceLocation, source: &str) -> Self {
        Self::new(DiagnosticKind::Type, message, loc, source)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} - {}: {}",
            self.source,
            self.loc.start.line,
            self.loc.start.column + 1,
            self.kind.label(),
            self.message
        )
    }
}

/// Ordered, append-only sequence of diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        loc: SourceLocation,
        source: &str,
    ) {
        self.push(Diagnostic::new(kind, message, loc, source));
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(other);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticBag {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Message templates. Placeholders are filled with [`format_message`].
pub mod messages {
    pub const PATH_CANNOT_BE_RESOLVED: &str = "Path \"{0}\" cannot be resolved";
    pub const CYCLIC_IMPORT: &str = "Cyclic import of \"{0}\" cannot be resolved";
    pub const UNREADABLE_MODULE: &str = "Module \"{0}\" cannot be read: {1}";
    pub const MISSING_EXPORT: &str = "Module \"{0}\" has no exported member \"{1}\"";
    pub const UNDEFINED_VARIABLE: &str = "\"{0}\" is not defined";
    pub const UNDEFINED_TYPE: &str = "Type \"{0}\" is not defined";
    pub const INCOMPATIBLE_TYPES: &str = "Type \"{0}\" is incompatible with type \"{1}\"";
    pub const MISSING_PROPERTY: &str = "Property \"{0}\" does not exist in \"{1}\"";
    pub const ARITY_MISMATCH: &str = "{0} arguments are expected. But {1} given";
    pub const NOT_CALLABLE: &str = "\"{0}\" is not a function";
    pub const NOT_CONSTRUCTABLE: &str = "\"{0}\" is not a class";
    pub const CONSTANT_REASSIGNMENT: &str = "Cannot assign to \"{0}\" because it is a constant";
    pub const CONSTRAINT_VIOLATION: &str =
        "Type \"{0}\" does not satisfy the constraint \"{1}\" of type parameter \"{2}\"";
    pub const GENERIC_ARITY: &str = "Generic \"{0}\" expects {1} type arguments. But {2} given";
    pub const NOT_GENERIC: &str = "Type \"{0}\" is not generic";
    pub const UNSUPPORTED_SYNTAX: &str = "Syntax \"{0}\" is not supported";
    pub const INSTANTIATION_TOO_DEEP: &str = "Type instantiation of \"{0}\" is excessively deep";
    pub const EXPRESSION_TOO_DEEP: &str = "Expression is nested too deeply to be analysed";
    pub const INVALID_OPERAND: &str = "Operator \"{0}\" cannot be applied to type \"{1}\"";
    pub const THIS_OUTSIDE_CLASS: &str = "\"this\" cannot be used outside of a class or object";
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
