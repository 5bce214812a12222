//! Common types and utilities for the hegel type analyser.
//!
//! This crate provides foundational types used across all hegel crates:
//! - Line/column source locations (`Position`, `SourceLocation`)
//! - Diagnostics and the append-only collector (`Diagnostic`, `DiagnosticBag`)
//! - Analysis limits and thresholds

// Position/Range types for line/column source locations
pub mod position;
pub use position::{Position, SourceLocation};

// Diagnostics: typed, located, non-fatal errors
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticKind, format_message};

// Centralized limits and thresholds
pub mod limits;
