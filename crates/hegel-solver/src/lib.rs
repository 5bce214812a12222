//! Type model and type registry for the hegel analyser.
//!
//! - **Arena**: every type and type scope lives in a [`TypeArena`] and is
//!   addressed by index, so parent links never form reference cycles
//! - **Registry**: type scopes bind names with priority-based shadowing
//! - **Instantiation**: generics are specialized into fresh types, never
//!   mutated in place
//! - **Compatibility**: structural assignability with coinductive handling of
//!   recursive types

pub mod arena;
pub mod canonicalize;
pub mod compat;
pub mod format;
pub mod infer;
pub mod instantiate;
pub mod objects;
pub mod recursion;
pub mod types;

pub use arena::TypeArena;
pub use canonicalize::{TypeLowering, keyword_type};
pub use compat::{CompatChecker, is_assignable};
pub use infer::infer_type_arguments;
pub use instantiate::{
    Instantiator, TypeSubstitution, expand_application, instantiate_function, instantiate_type,
    resolve_application,
};
pub use objects::{collect_properties, find_property, wrapper_class_name};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use types::*;

#[cfg(test)]
#[path = "../tests/arena_tests.rs"]
mod arena_tests;

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod instantiate_tests;

#[cfg(test)]
#[path = "../tests/compat_tests.rs"]
mod compat_tests;

#[cfg(test)]
#[path = "../tests/canonicalize_tests.rs"]
mod canonicalize_tests;
