//! Binary entry point for the dualforge CLI.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use dualforge::cli::{Cli, Commands};
use dualforge::commands::run_compile;
use dualforge_core::error::CompilationException;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(target: "dualforge::cli", error = %err, "compilation failed");
            ExitCode::from(err.exit_code().code())
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<(), CompilationException> {
    match cli.command {
        Commands::Compile {
            inputs,
            dest,
            preferred,
            secondary,
        } => run_compile(&inputs, &dest, preferred.into(), secondary.into()),
    }
}
