//! Reference front-end for the hegel analyser.
//!
//! Parses the typed JavaScript dialect (ES modules with Flow/TypeScript style
//! annotations) into a [`hegel_ast::Program`]. Constructs outside the dialect
//! that the analyser does not model become `Unknown` nodes; malformed input is
//! a [`ParseError`].

pub mod scanner;
mod state;
mod state_expressions;
mod state_statements;
mod state_types;

use hegel_ast::Program;
use hegel_common::SourceLocation;

pub use scanner::{Scanner, ScannerState, SyntaxKind, Token};

/// A syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} ({loc})")]
pub struct ParseError {
    pub message: String,
    pub loc: SourceLocation,
}

impl ParseError {
    pub fn new(message: impl Into<String>, loc: SourceLocation) -> Self {
        ParseError {
            message: message.into(),
            loc,
        }
    }
}

/// Parse a whole module.
#[tracing::instrument(level = "debug", skip(text), fields(len = text.len()))]
pub fn parse(text: &str) -> Result<Program, ParseError> {
    let mut state = state::ParserState::new(text)?;
    let program = state.parse_program()?;
    tracing::debug!(statements = program.body.len(), "parsed module");
    Ok(program)
}

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod scanner_tests;

#[cfg(test)]
#[path = "../tests/parser_tests.rs"]
mod parser_tests;
