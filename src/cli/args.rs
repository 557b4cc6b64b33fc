//! CLI argument definitions using clap
//!
//! Commands:
//! - faram validate --schema <path> --value <path> [--config <path>]
//! - faram values --schema <path> --value <path>
//! - faram conditions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Faram - schema-driven form validation
#[derive(Parser, Debug)]
#[command(name = "faram")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a value against a schema and print both value variants
    Validate {
        /// Path to the schema document
        #[arg(long)]
        schema: PathBuf,

        /// Path to the value document
        #[arg(long)]
        value: PathBuf,

        /// Path to a form configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print both accumulated value variants without validating
    Values {
        /// Path to the schema document
        #[arg(long)]
        schema: PathBuf,

        /// Path to the value document
        #[arg(long)]
        value: PathBuf,
    },

    /// List the condition names a schema document may use
    Conditions,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
