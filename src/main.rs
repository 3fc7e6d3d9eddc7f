//! paramgrid CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Installs the log subscriber
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Exits with non-zero on failure
//!
//! The error envelope is already on stdout when `run` fails; stderr gets the
//! one-line form.

use paramgrid::{cli, observability};

fn main() {
    observability::init_logging();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
