//! Ambient libraries.
//!
//! The standard library is built without a parent module and mixed into the
//! global module. Platform libraries are built under the global module, so
//! they can use the standard types, and mixed in after it. Their
//! `declare module` blocks register ambient modules on the graph.

use crate::error::EnvironmentError;
use hegel_binder::{Graph, ModuleId, build_module, mix_library};
use hegel_common::DiagnosticBag;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const STANDARD: &str = include_str!("../lib/standard.d.ts");
const BROWSER: &str = include_str!("../lib/browser.d.ts");
const NODEJS: &str = include_str!("../lib/nodejs.d.ts");

/// A target platform whose globals and built-in modules are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Browser,
    NodeJs,
}

impl Environment {
    pub const fn library_name(self) -> &'static str {
        match self {
            Environment::Browser => "browser.d.ts",
            Environment::NodeJs => "nodejs.d.ts",
        }
    }

    const fn source(self) -> &'static str {
        match self {
            Environment::Browser => BROWSER,
            Environment::NodeJs => NODEJS,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Browser => "browser",
            Environment::NodeJs => "nodejs",
        })
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Environment::Browser),
            "nodejs" | "node" => Ok(Environment::NodeJs),
            other => Err(format!(
                "unknown environment \"{other}\" (expected browser or nodejs)"
            )),
        }
    }
}

/// Modules of the loaded ambient libraries.
#[derive(Debug, Clone)]
pub struct Libraries {
    pub standard: ModuleId,
    pub platforms: Vec<(Environment, ModuleId)>,
}

/// Build the standard library and the `environments` platform libraries
/// and mix them into the global module.
pub fn load_environment(
    graph: &mut Graph,
    environments: &[Environment],
) -> Result<Libraries, EnvironmentError> {
    let global = graph.global;
    let standard = load_library(graph, "standard.d.ts", STANDARD, None)?;
    mix_library(graph, standard, global);

    let mut platforms: Vec<(Environment, ModuleId)> = Vec::new();
    for &environment in environments {
        if platforms.iter().any(|&(loaded, _)| loaded == environment) {
            continue;
        }
        let module = load_library(
            graph,
            environment.library_name(),
            environment.source(),
            Some(global),
        )?;
        mix_library(graph, module, global);
        platforms.push((environment, module));
    }
    debug!(
        platforms = platforms.len(),
        ambient_modules = graph.ambient_modules.len(),
        "environment loaded"
    );
    Ok(Libraries {
        standard,
        platforms,
    })
}

/// Build one library module. Any diagnostic is a defect in the library.
#[tracing::instrument(level = "debug", skip(graph, source))]
pub fn load_library(
    graph: &mut Graph,
    name: &str,
    source: &str,
    parent: Option<ModuleId>,
) -> Result<ModuleId, EnvironmentError> {
    let program = hegel_parser::parse(source).map_err(|error| EnvironmentError::Parse {
        library: name.to_string(),
        error,
    })?;
    let mut diagnostics = DiagnosticBag::new();
    let module = build_module(
        graph,
        name,
        &program,
        parent,
        &FxHashMap::default(),
        &mut diagnostics,
    )
    .map_err(|error| EnvironmentError::Malformed {
        library: name.to_string(),
        error,
    })?;
    if !diagnostics.is_empty() {
        return Err(EnvironmentError::Diagnostics {
            library: name.to_string(),
            diagnostics: diagnostics.into_vec(),
        });
    }
    Ok(module)
}

#[cfg(test)]
#[path = "../tests/libraries_tests.rs"]
mod libraries_tests;
