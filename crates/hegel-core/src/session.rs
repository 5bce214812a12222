//! Check sessions.
//!
//! A [`Session`] owns everything that outlives a single module build: the
//! scope graph with the ambient libraries mixed into its global module, the
//! module cache and the bookkeeping for in-flight imports. The CLI creates
//! one per process, an editor one per workspace.
//!
//! Every resolved path is built at most once at a time. The first request
//! stores a shared future in the cache and later requests await that same
//! future, so a module imported from several places is parsed and bound
//! once. Library modules stay cached for the life of the session; user
//! modules are evicted after their build unless `cache_user_modules` is set.
//! A cached build is dropped again by [`Session::invalidate`] when its file
//! changes, together with every cached module importing it.

use crate::error::{EnvironmentError, ModuleError};
use crate::host::ModuleHost;
use crate::libraries::{Environment, Libraries, load_environment};
use crate::resolver::{Resolution, normalize_path, resolve_specifier};
use crate::waits::ImportWaits;
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use hegel_ast::{Program, import_requests};
use hegel_binder::{Graph, ImportTarget, ModuleId, build_module};
use hegel_common::diagnostics::messages;
use hegel_common::{Diagnostic, DiagnosticBag, DiagnosticKind, format_message};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Ref, RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory relative paths are resolved against.
    pub root: PathBuf,
    pub environments: Vec<Environment>,
    /// Directories searched for bare import specifiers, in order.
    pub typings: Vec<PathBuf>,
    /// Keep user modules in the cache after their build completes.
    pub cache_user_modules: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            root: PathBuf::from("."),
            environments: Vec::new(),
            typings: vec![PathBuf::from("@types"), PathBuf::from("node_modules/@types")],
            cache_user_modules: true,
        }
    }
}

/// A successfully built module.
#[derive(Debug, Clone)]
pub struct BuiltModule {
    pub path: PathBuf,
    pub module: ModuleId,
    /// Diagnostics of this module alone.
    pub diagnostics: Rc<[Diagnostic]>,
}

pub type BuildResult = Result<BuiltModule, ModuleError>;
type SharedBuild = Shared<LocalBoxFuture<'static, BuildResult>>;

pub struct Session {
    config: SessionConfig,
    /// `config.typings` resolved against the root.
    typings: Vec<PathBuf>,
    host: Rc<dyn ModuleHost>,
    graph: RefCell<Graph>,
    libraries: Libraries,
    cache: RefCell<FxHashMap<PathBuf, SharedBuild>>,
    waits: RefCell<ImportWaits>,
    /// Resolved imports of each module's latest build: (target, library).
    imports: RefCell<FxHashMap<PathBuf, Vec<(PathBuf, bool)>>>,
    /// Every finished build in completion order.
    completed: RefCell<Vec<(PathBuf, Rc<[Diagnostic]>)>>,
    this: Weak<Session>,
}

impl Session {
    /// Create a session and load the ambient libraries of
    /// `config.environments`.
    pub fn new(
        config: SessionConfig,
        host: Rc<dyn ModuleHost>,
    ) -> Result<Rc<Session>, EnvironmentError> {
        let mut graph = Graph::new();
        let libraries = load_environment(&mut graph, &config.environments)?;
        let typings = config
            .typings
            .iter()
            .map(|dir| normalize_path(&config.root.join(dir)))
            .collect();
        Ok(Rc::new_cyclic(|this| Session {
            config,
            typings,
            host,
            graph: RefCell::new(graph),
            libraries,
            cache: RefCell::new(FxHashMap::default()),
            waits: RefCell::new(ImportWaits::new()),
            imports: RefCell::new(FxHashMap::default()),
            completed: RefCell::new(Vec::new()),
            this: this.clone(),
        }))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn libraries(&self) -> &Libraries {
        &self.libraries
    }

    /// The shared scope graph. Do not hold the borrow across an await.
    pub fn graph(&self) -> Ref<'_, Graph> {
        self.graph.borrow()
    }

    /// Mutable access for queries that expand types lazily. Do not hold the
    /// borrow across an await.
    pub fn graph_mut(&self) -> RefMut<'_, Graph> {
        self.graph.borrow_mut()
    }

    /// `path` made absolute against the session root and normalized.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        normalize_path(&self.config.root.join(path))
    }

    /// Whether a build of `path` is cached or in flight.
    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache.borrow().contains_key(&self.absolute(path))
    }

    /// Resolve `specifier` as imported from `from` and build the module it
    /// names.
    pub async fn resolve(&self, specifier: &str, from: &Path) -> BuildResult {
        let from = self.absolute(from);
        match resolve_specifier(self.host.as_ref(), &from, specifier, &self.typings) {
            Resolution::File { path, library } => self.request(&path, library).await,
            Resolution::Unresolved => {
                let graph = self.graph.borrow();
                match graph.ambient_modules.get(specifier) {
                    Some(&module) => Ok(BuiltModule {
                        path: PathBuf::from(specifier),
                        module,
                        diagnostics: Rc::from([]),
                    }),
                    None => Err(ModuleError::Unresolved {
                        specifier: specifier.to_string(),
                    }),
                }
            }
        }
    }

    /// Build the user module at `path`, joining an in-flight or cached build.
    pub async fn build_file(&self, path: &Path) -> BuildResult {
        let path = self.absolute(path);
        self.request(&path, false).await
    }

    /// Build `text` as the module at `path` without consulting or filling
    /// the cache. Editors use this for unsaved buffers.
    pub async fn build_source(&self, path: &Path, text: &str) -> BuildResult {
        let path = self.absolute(path);
        let program = hegel_parser::parse(text).map_err(|error| ModuleError::Parse {
            path: path.clone(),
            error,
        })?;
        self.build_program(&path, &program).await
    }

    /// Drop the finished build of `path` and of every cached module that
    /// imports it, directly or not, so that the next request loads them
    /// from the host again. Builds still in flight are kept. Returns the
    /// dropped paths.
    pub fn invalidate(&self, path: &Path) -> Vec<PathBuf> {
        let mut pending = vec![self.absolute(path)];
        let mut seen = FxHashSet::default();
        let mut dropped = Vec::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            let finished = self
                .cache
                .borrow()
                .get(&current)
                .is_some_and(|build| build.peek().is_some());
            if finished {
                self.cache.borrow_mut().remove(&current);
                dropped.push(current.clone());
            }
            pending.extend(
                self.imports
                    .borrow()
                    .iter()
                    .filter(|(_, targets)| targets.iter().any(|(target, _)| *target == current))
                    .map(|(importer, _)| importer.clone()),
            );
        }
        if !dropped.is_empty() {
            debug!(path = %path.display(), dropped = dropped.len(), "invalidated cached builds");
        }
        dropped
    }

    /// Invalidate the user modules the latest build of `path` imported,
    /// directly or through other user modules, so that the next build of
    /// `path` sees their current content. Library imports stay cached.
    pub fn refresh_dependencies(&self, path: &Path) -> Vec<PathBuf> {
        let mut pending = vec![self.absolute(path)];
        let mut seen = FxHashSet::default();
        let mut targets = Vec::new();
        while let Some(current) = pending.pop() {
            let imports = self.imports.borrow();
            for (target, library) in imports.get(&current).into_iter().flatten() {
                if !library && seen.insert(target.clone()) {
                    targets.push(target.clone());
                    pending.push(target.clone());
                }
            }
        }
        targets
            .iter()
            .flat_map(|target| self.invalidate(target))
            .collect()
    }

    fn request(&self, path: &Path, library: bool) -> SharedBuild {
        if let Some(existing) = self.cache.borrow().get(path) {
            trace!(path = %path.display(), "joining cached build");
            return existing.clone();
        }
        let session = self.this.clone();
        let key = path.to_path_buf();
        let evict = !library && !self.config.cache_user_modules;
        let build = async move {
            let session = session.upgrade().ok_or(ModuleError::SessionClosed)?;
            let result = session.load_and_build(&key).await;
            session.record(&key, &result);
            if evict {
                session.cache.borrow_mut().remove(&key);
            }
            result
        }
        .boxed_local()
        .shared();
        self.cache
            .borrow_mut()
            .insert(path.to_path_buf(), build.clone());
        build
    }

    async fn load_and_build(&self, path: &Path) -> BuildResult {
        let program = self.host.load(path).await?;
        self.build_program(path, &program).await
    }

    /// Await every import of `program`, then bind it.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    async fn build_program(&self, path: &Path, program: &Program) -> BuildResult {
        let source = path.display().to_string();
        let mut diagnostics = DiagnosticBag::new();
        let mut imports = FxHashMap::default();
        self.imports.borrow_mut().insert(path.to_path_buf(), Vec::new());

        for request in import_requests(program) {
            let (target, library) =
                match resolve_specifier(self.host.as_ref(), path, &request.specifier, &self.typings)
                {
                    Resolution::File { path, library } => (path, library),
                    // Left to ambient modules, or reported by the binder.
                    Resolution::Unresolved => continue,
                };
            if let Some(edges) = self.imports.borrow_mut().get_mut(path) {
                edges.push((target.clone(), library));
            }
            if self.would_cycle(path, &target) {
                diagnostics.report(
                    DiagnosticKind::Resolution,
                    format_message(messages::CYCLIC_IMPORT, &[&request.specifier]),
                    request.loc,
                    &source,
                );
                imports.insert(request.specifier, ImportTarget::Failed);
                continue;
            }

            self.waits.borrow_mut().add(path, &target);
            let result = self.request(&target, library).await;
            self.waits.borrow_mut().remove(path, &target);

            let target = match result {
                Ok(built) => ImportTarget::Module(built.module),
                Err(error) => {
                    debug!(%error, specifier = %request.specifier, "import failed");
                    ImportTarget::Failed
                }
            };
            imports.insert(request.specifier, target);
        }

        let mut graph = self.graph.borrow_mut();
        let global = graph.global;
        let module = build_module(
            &mut graph,
            &source,
            program,
            Some(global),
            &imports,
            &mut diagnostics,
        )
        .map_err(|error| ModuleError::Malformed {
            path: path.to_path_buf(),
            error,
        })?;
        Ok(BuiltModule {
            path: path.to_path_buf(),
            module,
            diagnostics: diagnostics.into_vec().into(),
        })
    }

    /// Whether awaiting `target` from `importer` could never finish: the
    /// target is still being built and waits on the importer.
    fn would_cycle(&self, importer: &Path, target: &Path) -> bool {
        let in_flight = self
            .cache
            .borrow()
            .get(target)
            .is_some_and(|build| build.peek().is_none());
        in_flight && self.waits.borrow().reaches(target, importer)
    }

    fn record(&self, path: &Path, result: &BuildResult) {
        let diagnostics: Rc<[Diagnostic]> = match result {
            Ok(built) => built.diagnostics.clone(),
            Err(error) => Rc::from([error.to_diagnostic()]),
        };
        debug!(
            path = %path.display(),
            diagnostics = diagnostics.len(),
            ok = result.is_ok(),
            "module build finished"
        );
        self.completed
            .borrow_mut()
            .push((path.to_path_buf(), diagnostics));
    }

    pub(crate) fn completed_len(&self) -> usize {
        self.completed.borrow().len()
    }

    pub(crate) fn completed_since(&self, mark: usize) -> Vec<(PathBuf, Rc<[Diagnostic]>)> {
        self.completed.borrow().iter().skip(mark).cloned().collect()
    }
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod session_tests;
