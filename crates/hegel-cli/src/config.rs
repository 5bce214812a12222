//! `.hegelrc.json` loading.

use crate::args::CliArgs;
use anyhow::{Context, Result};
use hegel_core::{Environment, SessionConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".hegelrc.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HegelConfig {
    /// Globs of files to check, relative to the project root.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub environment: Vec<Environment>,
    /// Directories searched for typings of bare imports, in order.
    pub typings: Vec<PathBuf>,
    pub cache_user_modules: bool,
}

impl Default for HegelConfig {
    fn default() -> Self {
        HegelConfig {
            include: vec!["./**/*.js".to_string()],
            exclude: vec!["./node_modules/**".to_string()],
            environment: Vec::new(),
            typings: vec![
                PathBuf::from("./@types"),
                PathBuf::from("./node_modules/@types"),
            ],
            cache_user_modules: true,
        }
    }
}

impl HegelConfig {
    /// Let command-line flags override the file settings.
    pub fn apply_args(&mut self, args: &CliArgs) {
        if let Some(environments) = &args.environments {
            self.environment = environments.clone();
        }
    }

    pub fn session_config(&self, root: &Path) -> SessionConfig {
        SessionConfig {
            root: root.to_path_buf(),
            environments: self.environment.clone(),
            typings: self.typings.clone(),
            cache_user_modules: self.cache_user_modules,
        }
    }
}

pub fn parse_config(source: &str) -> Result<HegelConfig> {
    serde_json::from_str(source).context("failed to parse hegel config JSON")
}

pub fn load_config(path: &Path) -> Result<HegelConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read hegel config: {}", path.display()))?;
    parse_config(&source)
        .with_context(|| format!("failed to parse hegel config: {}", path.display()))
}

/// The config named on the command line, else `.hegelrc.json` in `root`
/// when present, else the defaults.
pub fn find_config(root: &Path, explicit: Option<&Path>) -> Result<HegelConfig> {
    if let Some(path) = explicit {
        return load_config(&root.join(path));
    }
    let default = root.join(CONFIG_FILE);
    if default.is_file() {
        load_config(&default)
    } else {
        Ok(HegelConfig::default())
    }
}
