//! Centralized limits and thresholds for the analyser.
//!
//! Recursion in the parser, the builder and the solver is bounded so that
//! pathological input produces a diagnostic instead of a stack overflow.

/// Maximum nesting depth the parser descends into before reporting a parse error.
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 1_000;

/// Maximum depth for expression type inference.
///
/// ```js
/// const x = (((((((((1 + 2) + 3) + 4) /* ... 500 levels ... */)))));
/// ```
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum depth for generic type instantiation.
///
/// Returns the error sentinel when exceeded.
///
/// ```js
/// type Foo<T> = { value: Foo<Foo<T>> };
/// ```
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum depth of a compatibility check between two types.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum number of nested on-demand function analyses (hoisted functions
/// analysed at their first call site).
pub const MAX_CALL_DEPTH: u32 = 20;

/// Maximum length of a `parent` chain walk. Scope chains are acyclic; this
/// only guards against a corrupted arena.
pub const MAX_SCOPE_CHAIN_DEPTH: u32 = 10_000;

/// Maximum number of union members listed in a diagnostic before eliding.
pub const UNION_MEMBER_DISPLAY_LIMIT: usize = 8;
