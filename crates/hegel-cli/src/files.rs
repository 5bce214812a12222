//! Selection of the files to check.

use crate::config::HegelConfig;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Compile config globs. Patterns are relative to the project root; a
/// leading `./` is dropped.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
        let glob = Glob::new(pattern).with_context(|| format!("invalid glob: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("failed to build glob set")
}

/// Files under `root` matched by `include` and not by `exclude`, relative
/// to `root` and sorted.
pub fn select_files(root: &Path, config: &HegelConfig) -> Result<Vec<PathBuf>> {
    let include = build_globset(&config.include)?;
    let exclude = build_globset(&config.exclude)?;
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if include.is_match(relative) && !exclude.is_match(relative) {
            files.push(relative.to_path_buf());
        }
    }
    files.sort();
    debug!(root = %root.display(), files = files.len(), "selected files");
    Ok(files)
}
