use anyhow::Context;
use clap::Parser;
use hegel_cli::args::CliArgs;
use hegel_cli::driver::{FATAL_STATUS, run};
use std::io::{IsTerminal, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    hegel_cli::tracing_config::init_tracing();
    let args = CliArgs::parse();
    let color = !args.no_color && std::io::stdout().is_terminal();

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    let result = std::env::current_dir()
        .context("failed to read the working directory")
        .and_then(|root| run(&args, &root, color, &mut stdout, &mut stderr));
    match result {
        Ok(status) => ExitCode::from(status),
        Err(error) => {
            let _ = writeln!(stderr, "error: {error:#}");
            ExitCode::from(FATAL_STATUS)
        }
    }
}
