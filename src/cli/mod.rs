//! CLI module for paramgrid
//!
//! Provides command-line interface for:
//! - check: Load a schema and summarize it
//! - query: Print records matching label filters
//! - adjust: Apply an adjustment file
//! - grid: Print a parameter as a dense grid

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Inputs};
pub use commands::{adjust, check, grid, query, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, read_json_file, response, write_error, write_response};
