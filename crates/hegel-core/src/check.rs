//! Batch checking of a file list.

use crate::session::Session;
use futures::future::join_all;
use hegel_binder::{ModuleId, ScopeId};
use hegel_common::Diagnostic;
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CheckResult {
    /// One entry per input file, `None` where the build failed.
    pub modules: Vec<Option<ModuleId>>,
    /// Diagnostics of the input files in input order, followed by those of
    /// modules they imported.
    pub diagnostics: Vec<Diagnostic>,
    pub global_scope: ScopeId,
}

impl CheckResult {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Build every file of `files` and gather their diagnostics.
///
/// A file that fails to load or parse yields one diagnostic describing the
/// failure. Each module's diagnostics appear once even when it is listed
/// and also imported.
#[tracing::instrument(level = "info", skip_all, fields(files = files.len()))]
pub async fn check(session: &Session, files: &[PathBuf]) -> CheckResult {
    let mark = session.completed_len();
    let results = join_all(files.iter().map(|file| session.build_file(file))).await;

    let mut reported: FxHashSet<PathBuf> = FxHashSet::default();
    let mut modules = Vec::with_capacity(files.len());
    let mut diagnostics = Vec::new();
    for result in results {
        match result {
            Ok(built) => {
                modules.push(Some(built.module));
                if reported.insert(built.path) {
                    diagnostics.extend(built.diagnostics.iter().cloned());
                }
            }
            Err(error) => {
                modules.push(None);
                let first = error
                    .path()
                    .is_none_or(|path| reported.insert(path.to_path_buf()));
                if first {
                    diagnostics.push(error.to_diagnostic());
                }
            }
        }
    }
    for (path, recorded) in session.completed_since(mark) {
        if reported.insert(path) {
            diagnostics.extend(recorded.iter().cloned());
        }
    }

    info!(diagnostics = diagnostics.len(), "check finished");
    CheckResult {
        modules,
        diagnostics,
        global_scope: session.graph().global_scope(),
    }
}

#[cfg(test)]
#[path = "../tests/check_tests.rs"]
mod check_tests;
