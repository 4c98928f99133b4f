//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse, check and index ORCA quantum chemistry input files.
#[derive(Debug, Parser)]
#[command(name = "orca-input")]
#[command(about = "Parse, check and index ORCA input files")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the syntax tree of a file
    Parse {
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = TreeFormat::Sexp)]
        format: TreeFormat,
    },
    /// Print the highlight captures of a file
    Highlight {
        file: PathBuf,
        /// Emit one JSON object per capture
        #[arg(long)]
        json: bool,
    },
    /// Report syntax errors; exits non-zero when any file has one
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Index every input under a directory
    Index {
        root: PathBuf,
        /// Output directory (defaults to `<root>/.orca-index`)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// Named nodes as an S-expression
    Sexp,
    /// Full tree as JSON
    Json,
    /// Every node on its own line with byte ranges
    Dump,
}
