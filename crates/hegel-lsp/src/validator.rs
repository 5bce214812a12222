//! Re-validation of edited documents.
//!
//! Every edit starts a new generation for its document. Generations come
//! from one counter shared by all documents and only ever grow. A validation
//! publishes its snapshot only while its generation is still the latest for
//! the document, so a slow build that finishes after a newer edit is dropped
//! instead of replacing the newer snapshot.
//!
//! Each document keeps one live module in the session graph: the module of
//! its latest successful build. Replaced, superseded and closed modules are
//! released so that the graph does not grow with the number of edits.

use crate::completions::CompletionItem;
use crate::hover::HoverInfo;
use crate::position::PositionedModuleScope;
use hegel_binder::{Graph, ModuleId};
use hegel_common::{Diagnostic, Position};
use hegel_core::Session;
use rustc_hash::FxHashMap;
use std::cell::{Cell, OnceCell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, trace};

/// Handle of one validation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    uri: String,
    generation: u64,
}

impl Ticket {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of one validation of a document.
#[derive(Debug)]
pub struct Snapshot {
    pub generation: u64,
    /// `None` when the build failed; position queries then use the index of
    /// the last successful build.
    pub module: Option<ModuleId>,
    pub diagnostics: Vec<Diagnostic>,
    index: OnceCell<Rc<PositionedModuleScope>>,
}

impl Snapshot {
    pub fn new(generation: u64, module: ModuleId, diagnostics: Vec<Diagnostic>) -> Self {
        Snapshot {
            generation,
            module: Some(module),
            diagnostics,
            index: OnceCell::new(),
        }
    }

    /// A snapshot for a failed build that keeps serving `previous`.
    pub fn failed(
        generation: u64,
        diagnostics: Vec<Diagnostic>,
        previous: Option<Rc<PositionedModuleScope>>,
    ) -> Self {
        let index = OnceCell::new();
        if let Some(previous) = previous {
            let _ = index.set(previous);
        }
        Snapshot {
            generation,
            module: None,
            diagnostics,
            index,
        }
    }

    /// The position index, built on first use.
    pub fn index(&self, graph: &Graph) -> Option<Rc<PositionedModuleScope>> {
        if let Some(index) = self.index.get() {
            return Some(index.clone());
        }
        let module = self.module?;
        Some(
            self.index
                .get_or_init(|| Rc::new(PositionedModuleScope::new(graph, module)))
                .clone(),
        )
    }
}

pub struct Validator {
    session: Rc<Session>,
    next_generation: Cell<u64>,
    /// Latest generation started per document.
    generations: RefCell<FxHashMap<String, u64>>,
    published: RefCell<FxHashMap<String, Rc<Snapshot>>>,
    /// Module backing each document's position index.
    live: RefCell<FxHashMap<String, ModuleId>>,
}

impl Validator {
    pub fn new(session: Rc<Session>) -> Self {
        Validator {
            session,
            next_generation: Cell::new(0),
            generations: RefCell::new(FxHashMap::default()),
            published: RefCell::new(FxHashMap::default()),
            live: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    /// Start a validation of `uri`, superseding every earlier one.
    pub fn begin(&self, uri: &str) -> Ticket {
        let generation = self.next_generation.get() + 1;
        self.next_generation.set(generation);
        self.generations
            .borrow_mut()
            .insert(uri.to_string(), generation);
        trace!(uri, generation, "validation started");
        Ticket {
            uri: uri.to_string(),
            generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generations.borrow().get(&ticket.uri) == Some(&ticket.generation)
    }

    /// Publish `snapshot` as the state of the ticket's document. Returns
    /// `None` and drops the snapshot when a newer validation has started.
    pub fn publish(&self, ticket: &Ticket, snapshot: Snapshot) -> Option<Rc<Snapshot>> {
        if !self.is_current(ticket) {
            debug!(
                uri = %ticket.uri,
                generation = ticket.generation,
                "dropping superseded snapshot"
            );
            return None;
        }
        if let Some(module) = snapshot.module {
            let previous = self.live.borrow_mut().insert(ticket.uri.clone(), module);
            if let Some(previous) = previous.filter(|&previous| previous != module) {
                self.release(previous);
            }
        }
        let snapshot = Rc::new(snapshot);
        self.published
            .borrow_mut()
            .insert(ticket.uri.clone(), snapshot.clone());
        Some(snapshot)
    }

    /// The last published snapshot of `uri`.
    pub fn snapshot(&self, uri: &str) -> Option<Rc<Snapshot>> {
        self.published.borrow().get(uri).cloned()
    }

    /// Forget `uri`. Validations still in flight for it are dropped.
    pub fn close(&self, uri: &str) {
        self.generations.borrow_mut().remove(uri);
        self.published.borrow_mut().remove(uri);
        let live = self.live.borrow_mut().remove(uri);
        if let Some(module) = live {
            self.release(module);
        }
    }

    /// A file changed on disk: cached builds of it and of its importers
    /// are rebuilt on their next request.
    pub fn file_changed(&self, uri: &str) -> Vec<PathBuf> {
        self.session.invalidate(&uri_to_path(uri))
    }

    fn release(&self, module: ModuleId) {
        if !self.session.graph_mut().release_module(module) {
            trace!(?module, "module kept in the graph");
        }
    }

    /// Build `text` as the new content of `uri` and publish the result.
    /// Returns `None` when a newer edit superseded this one meanwhile.
    pub async fn validate(&self, uri: &str, text: &str) -> Option<Rc<Snapshot>> {
        let ticket = self.begin(uri);
        let path = uri_to_path(uri);
        // Importers of the document and its edited dependencies build anew.
        self.session.invalidate(&path);
        self.session.refresh_dependencies(&path);
        let result = self.session.build_source(&path, text).await;
        if !self.is_current(&ticket) {
            debug!(uri, generation = ticket.generation, "validation superseded");
            if let Ok(built) = result {
                self.release(built.module);
            }
            return None;
        }
        let snapshot = match result {
            Ok(built) => Snapshot::new(ticket.generation, built.module, built.diagnostics.to_vec()),
            Err(error) => {
                let previous = self
                    .snapshot(uri)
                    .and_then(|previous| previous.index(&self.session.graph()));
                Snapshot::failed(ticket.generation, vec![error.to_diagnostic()], previous)
            }
        };
        debug!(
            uri,
            generation = ticket.generation,
            diagnostics = snapshot.diagnostics.len(),
            "validation finished"
        );
        self.publish(&ticket, snapshot)
    }

    pub fn hover(&self, uri: &str, position: Position) -> Option<HoverInfo> {
        let snapshot = self.snapshot(uri)?;
        let graph = self.session.graph();
        snapshot.index(&graph)?.hover(&graph, position)
    }

    pub fn completions(&self, uri: &str, position: Position) -> Vec<CompletionItem> {
        let Some(snapshot) = self.snapshot(uri) else {
            return Vec::new();
        };
        let graph = self.session.graph();
        snapshot
            .index(&graph)
            .map(|index| index.completions(&graph, position))
            .unwrap_or_default()
    }

    pub fn member_completions(
        &self,
        uri: &str,
        position: Position,
        object_name: &str,
    ) -> Vec<CompletionItem> {
        let Some(snapshot) = self.snapshot(uri) else {
            return Vec::new();
        };
        let Some(index) = snapshot.index(&self.session.graph()) else {
            return Vec::new();
        };
        let mut graph = self.session.graph_mut();
        index.member_completions(&mut graph, position, object_name)
    }
}

/// File path named by a `file://` URI; other strings are taken as paths.
pub fn uri_to_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

#[cfg(test)]
#[path = "../tests/validator_tests.rs"]
mod validator_tests;
