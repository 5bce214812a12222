//! Import specifier resolution.
//!
//! Relative specifiers resolve next to the importing file, preferring a
//! sibling type declaration over the script itself. Bare specifiers are
//! looked up in the typings directories in order. Anything else is left to
//! the ambient `declare module` blocks of the enabled environments.

use crate::host::ModuleHost;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A module file. `library` is set for files found in a typings
    /// directory.
    File { path: PathBuf, library: bool },
    /// No file matches; only an ambient module can still satisfy it.
    Unresolved,
}

pub fn resolve_specifier(
    host: &dyn ModuleHost,
    from_file: &Path,
    specifier: &str,
    typings: &[PathBuf],
) -> Resolution {
    let specifier = specifier.trim().replace('\\', "/");
    if specifier.is_empty() {
        return Resolution::Unresolved;
    }

    if specifier.starts_with('.') || Path::new(&specifier).is_absolute() {
        let from_dir = from_file.parent().unwrap_or(Path::new(""));
        let base = normalize_path(&from_dir.join(&specifier));
        return first_existing(host, module_path_candidates(&base), false);
    }

    for root in typings {
        let base = normalize_path(&root.join(&specifier));
        let candidates = vec![
            with_suffix(&base, ".d.ts"),
            base.join("index.d.ts"),
        ];
        if let found @ Resolution::File { .. } = first_existing(host, candidates, true) {
            return found;
        }
    }
    Resolution::Unresolved
}

fn first_existing(host: &dyn ModuleHost, candidates: Vec<PathBuf>, library: bool) -> Resolution {
    for candidate in candidates {
        trace!(candidate = %candidate.display(), "probing");
        if host.exists(&candidate) {
            return Resolution::File {
                path: candidate,
                library,
            };
        }
    }
    Resolution::Unresolved
}

/// Files a relative import of `base` may refer to, best first.
fn module_path_candidates(base: &Path) -> Vec<PathBuf> {
    let text = base.to_string_lossy();
    if let Some(stem) = text.strip_suffix(".js") {
        return vec![PathBuf::from(format!("{stem}.d.ts")), base.to_path_buf()];
    }
    if KNOWN_EXTENSIONS.iter().any(|ext| text.ends_with(ext)) {
        return vec![base.to_path_buf()];
    }
    vec![
        with_suffix(base, ".d.ts"),
        with_suffix(base, ".js"),
        base.join("index.d.ts"),
        base.join("index.js"),
    ]
}

/// `base` with `suffix` appended to its file name. Unlike
/// `Path::with_extension` this keeps dotted names such as `jquery.min`.
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    base.with_file_name(name)
}

/// Lexically remove `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::RootDir | Component::Normal(_) | Component::Prefix(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }
    normalized
}

const KNOWN_EXTENSIONS: [&str; 4] = [".d.ts", ".mjs", ".cjs", ".json"];

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod resolver_tests;
