//! CLI module for Faram
//!
//! Provides command-line interface for:
//! - validate: detached submit of a value file against a schema file
//! - values: both accumulated value variants, unvalidated
//! - conditions: condition names known to the schema loader

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{conditions, run, run_command, validate, values};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_json_file, write_blocked, write_error, write_response};
