//! Syntax tree for the typed JavaScript dialect analysed by hegel.
//!
//! The tree is produced by a parser collaborator (see `hegel-parser` for the
//! reference front-end) and consumed read-only by the scope graph builder.
//! Every node carries a [`SourceLocation`]. Constructs a front-end does not
//! model are represented as `Unknown` nodes so that the builder can report
//! them as diagnostics instead of failing.
//!
//! The whole tree is serde-serializable, tagged by `"type"`, so a
//! collaborator may also hand it over as JSON.

pub mod node;
pub mod types;
pub mod imports;

pub use node::*;
pub use types::*;
pub use imports::{ImportRequest, import_requests};

#[cfg(test)]
#[path = "../tests/node_tests.rs"]
mod node_tests;
