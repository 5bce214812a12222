//! Import pre-scan.
//!
//! Module dependencies are resolved before a module's graph is built, so the
//! driver needs every import specifier up front.

use crate::node::{Program, Statement};
use hegel_common::SourceLocation;

/// One `import ... from "specifier"` or `export ... from "specifier"` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub specifier: String,
    pub loc: SourceLocation,
}

/// Collect the import specifiers of a program in source order, de-duplicated
/// by specifier (first occurrence wins).
pub fn import_requests(program: &Program) -> Vec<ImportRequest> {
    let mut requests: Vec<ImportRequest> = Vec::new();
    for statement in &program.body {
        let source = match statement {
            Statement::Import(import) => Some(&import.source),
            Statement::ExportNamed(export) => export.source.as_ref(),
            _ => None,
        };
        if let Some(source) = source
            && !requests
                .iter()
                .any(|request| request.specifier == source.value)
        {
            requests.push(ImportRequest {
                specifier: source.value.clone(),
                loc: source.loc,
            });
        }
    }
    requests
}
