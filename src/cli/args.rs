//! CLI argument definitions using clap
//!
//! Commands:
//! - paramgrid check --schema <path>
//! - paramgrid query --schema <path> [--filter label=value]...
//! - paramgrid adjust --schema <path> --adjust <path>
//! - paramgrid grid --schema <path> --param <name>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// paramgrid - validate, extend, adjust and project labeled parameters
#[derive(Parser, Debug)]
#[command(name = "paramgrid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Files every command reads
#[derive(Args, Debug, Clone)]
pub struct Inputs {
    /// Path to the schema file
    #[arg(long)]
    pub schema: PathBuf,

    /// Path to an engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to an adjustment file applied after loading
    #[arg(long)]
    pub adjust: Option<PathBuf>,

    /// State selections as JSON, e.g. '{"year": 2017}'
    #[arg(long)]
    pub state: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the schema and report what it declares
    Check {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Print stored records matching label filters
    Query {
        #[command(flatten)]
        inputs: Inputs,

        /// Label filter as label=value, repeatable
        #[arg(long = "filter", value_name = "LABEL=VALUE")]
        filters: Vec<String>,

        /// Only these parameters, repeatable
        #[arg(long = "param", value_name = "NAME")]
        params: Vec<String>,

        /// Ignore the active state
        #[arg(long)]
        no_state: bool,

        /// Keep parameters without matching records
        #[arg(long)]
        include_empty: bool,
    },

    /// Apply the adjustment file and report the outcome
    Adjust {
        #[command(flatten)]
        inputs: Inputs,

        /// Do not refill the extend label after writing
        #[arg(long)]
        no_extend: bool,

        /// Apply values that only fail warn-level validators
        #[arg(long)]
        ignore_warnings: bool,

        /// Report errors without failing
        #[arg(long)]
        keep_going: bool,
    },

    /// Print a parameter as a dense grid
    Grid {
        #[command(flatten)]
        inputs: Inputs,

        /// Parameter to project
        #[arg(long)]
        param: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_filters() {
        let cli = Cli::try_parse_from([
            "paramgrid",
            "query",
            "--schema",
            "s.json",
            "--filter",
            "year=2017",
            "--filter",
            "marital_status=single",
            "--no-state",
        ])
        .unwrap();

        match cli.command {
            Command::Query {
                inputs,
                filters,
                no_state,
                ..
            } => {
                assert_eq!(inputs.schema, PathBuf::from("s.json"));
                assert!(inputs.config.is_none());
                assert_eq!(filters, vec!["year=2017", "marital_status=single"]);
                assert!(no_state);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_schema_is_required() {
        assert!(Cli::try_parse_from(["paramgrid", "check"]).is_err());
        assert!(Cli::try_parse_from(["paramgrid", "grid", "--schema", "s.json"]).is_err());
    }
}
