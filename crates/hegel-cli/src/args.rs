use clap::Parser;
use hegel_core::Environment;
use std::path::PathBuf;

/// CLI arguments for the hegel binary.
#[derive(Parser, Debug)]
#[command(
    name = "hegel",
    version,
    about = "Static type analyser for typed JavaScript"
)]
pub struct CliArgs {
    /// Path to the configuration file. Defaults to `.hegelrc.json` in the
    /// working directory when it exists.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Platforms whose globals and built-in modules are available
    /// (comma separated: browser, nodejs).
    #[arg(long = "env", value_delimiter = ',')]
    pub environments: Option<Vec<Environment>>,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print the type of every top-level binding of the checked files.
    #[arg(long = "print-types")]
    pub print_types: bool,

    /// Files to check. When empty, the config's include/exclude globs
    /// select the files.
    pub files: Vec<PathBuf>,
}
