//! Module resolution and check sessions for hegel.
//!
//! A [`Session`] loads the ambient libraries once, resolves import
//! specifiers to files through a [`ModuleHost`], builds every module at most
//! once at a time and shares the results through one scope graph. [`check`]
//! runs a batch of files through a session.

pub mod check;
pub mod error;
pub mod host;
pub mod libraries;
pub mod resolver;
pub mod session;
mod waits;

pub use check::{CheckResult, check};
pub use error::{EnvironmentError, ModuleError};
pub use host::{FsHost, MemoryHost, ModuleHost};
pub use libraries::{Environment, Libraries, load_environment, load_library};
pub use resolver::{Resolution, normalize_path, resolve_specifier};
pub use session::{BuildResult, BuiltModule, Session, SessionConfig};
