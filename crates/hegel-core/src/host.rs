//! Access to module sources.
//!
//! The session never touches the file system directly: it asks a
//! [`ModuleHost`] whether a candidate path exists and for the parsed tree of
//! a resolved path.

use crate::error::ModuleError;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use hegel_ast::Program;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::trace;

pub trait ModuleHost {
    /// Whether `path` names a loadable module.
    fn exists(&self, path: &Path) -> bool;

    /// Read and parse the module at `path`.
    fn load(&self, path: &Path) -> LocalBoxFuture<'static, Result<Program, ModuleError>>;
}

fn parse(path: PathBuf, text: &str) -> Result<Program, ModuleError> {
    hegel_parser::parse(text).map_err(|error| ModuleError::Parse { path, error })
}

/// Modules on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsHost;

impl ModuleHost for FsHost {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> LocalBoxFuture<'static, Result<Program, ModuleError>> {
        let path = path.to_path_buf();
        async move {
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|error| ModuleError::io(&path, error))?;
            trace!(path = %path.display(), len = text.len(), "read module");
            parse(path, &text)
        }
        .boxed_local()
    }
}

/// Modules held in memory, for editors with unsaved buffers and for tests.
///
/// Clones share the same files. Every load yields to the executor once
/// before parsing, as a disk read would.
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    files: Rc<RefCell<FxHashMap<PathBuf, Rc<str>>>>,
    loads: Rc<Cell<usize>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the file at `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<Rc<str>>) {
        self.files.borrow_mut().insert(path.into(), text.into());
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.files.borrow_mut().remove(path).is_some()
    }

    /// Number of `load` calls so far.
    pub fn loads(&self) -> usize {
        self.loads.get()
    }
}

impl ModuleHost for MemoryHost {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn load(&self, path: &Path) -> LocalBoxFuture<'static, Result<Program, ModuleError>> {
        self.loads.set(self.loads.get() + 1);
        let path = path.to_path_buf();
        let text = self.files.borrow().get(&path).cloned();
        async move {
            tokio::task::yield_now().await;
            match text {
                Some(text) => parse(path, &text),
                None => Err(ModuleError::io(
                    path,
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                )),
            }
        }
        .boxed_local()
    }
}

#[cfg(test)]
#[path = "../tests/host_tests.rs"]
mod host_tests;
