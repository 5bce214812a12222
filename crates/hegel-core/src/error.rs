//! Failures that stop a module build or the whole session.

use hegel_binder::MalformedTree;
use hegel_common::diagnostics::messages;
use hegel_common::{Diagnostic, DiagnosticKind, SourceLocation, format_message};
use hegel_parser::ParseError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Location used for problems that concern a whole file.
const FILE_START: SourceLocation = SourceLocation::from_coords((1, 0), (1, 0));

/// A module build that did not produce a scope.
///
/// Cloned into every request that shares the failed build.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
    #[error("failed to parse {}: {error}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        error: ParseError,
    },
    #[error("malformed syntax tree in {}: {error}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        error: MalformedTree,
    },
    #[error("path \"{specifier}\" cannot be resolved")]
    Unresolved { specifier: String },
    #[error("session dropped before the module was built")]
    SessionClosed,
}

impl ModuleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModuleError::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// The module the failure belongs to, if it concerns a file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ModuleError::Io { path, .. }
            | ModuleError::Parse { path, .. }
            | ModuleError::Malformed { path, .. } => Some(path),
            ModuleError::Unresolved { .. } | ModuleError::SessionClosed => None,
        }
    }

    /// The user-facing form of this failure.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ModuleError::Io { path, source } => {
                let path = path.display().to_string();
                Diagnostic::new(
                    DiagnosticKind::Resolution,
                    format_message(messages::UNREADABLE_MODULE, &[&path, &source.to_string()]),
                    FILE_START,
                    path,
                )
            }
            ModuleError::Parse { path, error } => Diagnostic::new(
                DiagnosticKind::Parse,
                error.message.clone(),
                error.loc,
                path.display().to_string(),
            ),
            ModuleError::Malformed { path, error } => {
                let loc = match error {
                    MalformedTree::InvalidExportDeclaration { loc }
                    | MalformedTree::NestedModuleDeclaration { loc } => *loc,
                };
                Diagnostic::new(
                    DiagnosticKind::Parse,
                    error.to_string(),
                    loc,
                    path.display().to_string(),
                )
            }
            ModuleError::Unresolved { specifier } => Diagnostic::new(
                DiagnosticKind::Resolution,
                format_message(messages::PATH_CANNOT_BE_RESOLVED, &[specifier]),
                FILE_START,
                String::new(),
            ),
            ModuleError::SessionClosed => Diagnostic::new(
                DiagnosticKind::Resolution,
                self.to_string(),
                FILE_START,
                String::new(),
            ),
        }
    }
}

/// An ambient library failed to load.
///
/// Libraries ship with the analyser, so this means the installation is
/// broken. It is never mixed into user diagnostics.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("library {library} failed to parse: {error}")]
    Parse {
        library: String,
        #[source]
        error: ParseError,
    },
    #[error("library {library} is malformed: {error}")]
    Malformed {
        library: String,
        #[source]
        error: MalformedTree,
    },
    #[error("library {library} has {} type errors", diagnostics.len())]
    Diagnostics {
        library: String,
        diagnostics: Vec<Diagnostic>,
    },
}

impl EnvironmentError {
    /// Diagnostics that describe the failure, for reporting.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            EnvironmentError::Parse { library, error } => vec![Diagnostic::new(
                DiagnosticKind::Parse,
                error.message.clone(),
                error.loc,
                library.clone(),
            )],
            EnvironmentError::Malformed { library, error } => vec![Diagnostic::new(
                DiagnosticKind::Parse,
                error.to_string(),
                FILE_START,
                library.clone(),
            )],
            EnvironmentError::Diagnostics { diagnostics, .. } => diagnostics.clone(),
        }
    }
}
