//! One run of the `hegel` binary: configuration, file selection, checking
//! and reporting.

use crate::args::CliArgs;
use crate::config::find_config;
use crate::files::select_files;
use crate::reporter::Reporter;
use anyhow::{Context, Result};
use hegel_core::{FsHost, Session, check};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use tracing::info;

/// Exit status when the analysis could not run at all.
pub const FATAL_STATUS: u8 = 255;

/// Highest diagnostic count reported as such; stays below [`FATAL_STATUS`].
pub const MAX_DIAGNOSTIC_STATUS: u8 = FATAL_STATUS - 1;

/// Check the project at `root` and write the report to `out`. Returns the
/// exit status: the number of diagnostics, capped at [`MAX_DIAGNOSTIC_STATUS`].
pub fn run(
    args: &CliArgs,
    root: &Path,
    color: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<u8> {
    let mut config = find_config(root, args.config.as_deref())?;
    config.apply_args(args);
    let files = if args.files.is_empty() {
        select_files(root, &config)?
    } else {
        args.files.clone()
    };
    info!(files = files.len(), environments = ?config.environment, "checking");

    let mut reporter = Reporter::new(color, root);
    let session = match Session::new(config.session_config(root), Rc::new(FsHost)) {
        Ok(session) => session,
        Err(error) => {
            writeln!(err, "broken environment: {error}")?;
            writeln!(err, "{}", reporter.render(&error.diagnostics()))?;
            return Ok(FATAL_STATUS);
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let result = runtime.block_on(check(&session, &files));

    if !result.diagnostics.is_empty() {
        writeln!(out, "{}\n", reporter.render(&result.diagnostics))?;
    }
    if args.print_types {
        let graph = session.graph();
        for &module in result.modules.iter().flatten() {
            writeln!(out, "{}\n", reporter.format_types(&graph, module))?;
        }
    }
    writeln!(out, "{}", reporter.format_summary(result.diagnostics.len()))?;
    Ok(exit_status(result.diagnostics.len()))
}

pub fn exit_status(diagnostics: usize) -> u8 {
    u8::try_from(diagnostics)
        .unwrap_or(MAX_DIAGNOSTIC_STATUS)
        .min(MAX_DIAGNOSTIC_STATUS)
}
