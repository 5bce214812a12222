//! Editor-facing queries for the hegel analyser.
//!
//! This crate provides:
//! - The position index over a built module (`PositionedModuleScope`)
//! - Hover information
//! - Completions, for identifiers in scope and for members after a dot
//! - Re-validation of edited documents, keyed by request generation

pub mod completions;
pub mod hover;
pub mod position;
pub mod validator;

pub use completions::{CompletionItem, CompletionItemKind, binding_kind, sort_priority};
pub use hover::HoverInfo;
pub use position::{Binding, BindingTarget, PositionedModuleScope, members_of};
pub use validator::{Snapshot, Ticket, Validator, uri_to_path};
