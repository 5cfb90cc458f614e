//! CLI module for ruleview
//!
//! Provides command-line interface for:
//! - validate: Load and check a dataset
//! - report: One-shot derived view
//! - session: Line-oriented command session over stdin/stdout

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ThresholdArgs};
pub use commands::{report, run, run_command, session, validate, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_response};
