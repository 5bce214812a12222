//! Import edges between modules whose builds are in flight.
//!
//! A build that awaits another build records an edge `importer -> imported`
//! for as long as it waits. Awaiting a build that already waits, directly or
//! transitively, on the importer would never finish, so such requests are
//! refused as cyclic imports.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

#[derive(Default, Debug)]
pub struct ImportWaits {
    /// importer -> modules it is currently waiting on
    waiting_on: FxHashMap<PathBuf, FxHashSet<PathBuf>>,
}

impl ImportWaits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, importer: &Path, imported: &Path) {
        self.waiting_on
            .entry(importer.to_path_buf())
            .or_default()
            .insert(imported.to_path_buf());
    }

    pub fn remove(&mut self, importer: &Path, imported: &Path) {
        if let Some(targets) = self.waiting_on.get_mut(importer) {
            targets.remove(imported);
            if targets.is_empty() {
                self.waiting_on.remove(importer);
            }
        }
    }

    /// Whether `from` is, or transitively waits on, `to`.
    pub fn reaches(&self, from: &Path, to: &Path) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(targets) = self.waiting_on.get(current) {
                stack.extend(targets.iter().map(PathBuf::as_path));
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.waiting_on.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/waits_tests.rs"]
mod waits_tests;
