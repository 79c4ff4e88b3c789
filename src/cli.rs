//! CLI argument parsing with clap derive (spec.md §6 "CLI" boundary).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// dualforge - lowers an embedded image/array DSL into RenderScript and
/// native back-ends.
#[derive(Parser)]
#[command(name = "dualforge")]
#[command(version = VERSION)]
#[command(about = "Source-to-source compiler for the user-library DSL")]
pub struct Cli {
    /// Increase output verbosity (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which back-end a wrapper's runtime selector prefers or falls back to.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliBackEnd {
    Renderscript,
    Native,
}

impl From<CliBackEnd> for dualforge_core::naming::BackEnd {
    fn from(value: CliBackEnd) -> Self {
        match value {
            CliBackEnd::Renderscript => dualforge_core::naming::BackEnd::RenderScript,
            CliBackEnd::Native => dualforge_core::naming::BackEnd::Native,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile one or more parsed-input documents into generated artifacts.
    ///
    /// Each input is a JSON document produced by the external parser
    /// collaborator (spec.md §1): the original file name, its source text,
    /// a token stream, and a parse tree. Parsing host-language source
    /// itself is out of scope for dualforge.
    Compile {
        /// Parsed-input JSON documents, one per source file.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Destination directory for generated artifacts.
        #[arg(short, long, default_value = "generated")]
        dest: PathBuf,

        /// Back-end the runtime selector prefers.
        #[arg(long, value_enum, default_value_t = CliBackEnd::Renderscript)]
        preferred: CliBackEnd,

        /// Back-end the runtime selector falls back to.
        #[arg(long, value_enum, default_value_t = CliBackEnd::Native)]
        secondary: CliBackEnd,
    },
}

impl std::fmt::Display for CliBackEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CliBackEnd::Renderscript => "renderscript",
            CliBackEnd::Native => "native",
        };
        write!(f, "{s}")
    }
}
