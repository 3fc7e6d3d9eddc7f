//! CLI command implementations
//!
//! Every command loads the schema, the optional config, the optional state
//! and the optional adjustment file in that order, then does its one job and
//! returns the `data` part of the response.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::adjust::{parse_adjustments, AdjustOptions};
use crate::config::EngineConfig;
use crate::parameters::Parameters;
use crate::query::QuerySpec;
use crate::schema::SchemaRegistry;
use crate::state::selections_from_json;

use super::args::{Command, Inputs};
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_error, write_response};

/// Parse arguments, run the command and print the response
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(&e)?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Check { inputs } => check(&inputs),
        Command::Query {
            inputs,
            filters,
            params,
            no_state,
            include_empty,
        } => query(&inputs, &filters, &params, !no_state, include_empty),
        Command::Adjust {
            inputs,
            no_extend,
            ignore_warnings,
            keep_going,
        } => adjust(
            &inputs,
            &AdjustOptions {
                raise_errors: !keep_going,
                extend_adjustment: !no_extend,
                ignore_warnings,
            },
        ),
        Command::Grid { inputs, param } => grid(&inputs, &param),
    }
}

/// Report labels, parameter metadata and record counts
pub fn check(inputs: &Inputs) -> CliResult<Value> {
    let params = load(inputs, true)?;
    let registry = params.registry();

    let labels: Map<String, Value> = registry
        .labels()
        .map(|label| {
            (
                label.name().to_string(),
                json!({
                    "type": label.value_type().type_name(),
                    "values": label.len(),
                    "extend": label.is_extend(),
                }),
            )
        })
        .collect();
    let parameters: Map<String, Value> = registry
        .params()
        .map(|param| {
            (
                param.name().to_string(),
                json!({
                    "title": param.title(),
                    "description": param.description(),
                    "notes": param.notes(),
                    "type": param.value_type().type_name(),
                    "number_dims": param.number_dims(),
                    "labels": param.labels(),
                    "indexed": param.is_indexed(),
                    "attributes": param.attributes(),
                }),
            )
        })
        .collect();
    let records: usize = params
        .keys()
        .filter_map(|name| params.records(name))
        .map(|records| records.len())
        .sum();

    Ok(json!({
        "labels": labels,
        "parameters": parameters,
        "records": records,
        "label_to_extend": registry.operators().label_to_extend,
        "uses_extend_func": registry.operators().uses_extend_func,
    }))
}

/// Print records matching `label=value` filters
pub fn query(
    inputs: &Inputs,
    filters: &[String],
    only: &[String],
    use_state: bool,
    include_empty: bool,
) -> CliResult<Value> {
    let params = load(inputs, true)?;

    let raw = parse_filters(filters)?;
    let selections = selections_from_json(params.registry(), &raw)?;
    let mut spec = QuerySpec::new()
        .with_filters(selections)
        .use_state(use_state)
        .include_empty(include_empty);
    if !only.is_empty() {
        spec = spec.params(only.iter().cloned());
    }

    let result = params.query(&spec)?;
    Ok(serde_json::to_value(result)?)
}

/// Apply the adjustment file with `options`
pub fn adjust(inputs: &Inputs, options: &AdjustOptions) -> CliResult<Value> {
    let path = inputs
        .adjust
        .as_ref()
        .ok_or_else(|| CliError::invalid_argument("adjust needs --adjust <path>"))?;
    let mut params = load(inputs, false)?;

    let adjustments = parse_adjustments(&read_json_file(path)?)?;
    let report = params.adjust(&adjustments, options)?;

    Ok(json!({
        "written": report.written,
        "extended": report.extended,
        "errors": report.errors,
        "warnings": report.warnings,
    }))
}

/// Print one parameter as a grid
pub fn grid(inputs: &Inputs, param: &str) -> CliResult<Value> {
    let params = load(inputs, true)?;
    let grid = params.to_grid(param)?;
    Ok(serde_json::to_value(grid)?)
}

fn load(inputs: &Inputs, apply_adjustment: bool) -> CliResult<Parameters> {
    let registry = SchemaRegistry::from_path(&inputs.schema)?;
    let mut params = match &inputs.config {
        Some(path) => Parameters::with_config(registry, &EngineConfig::load(path)?)?,
        None => Parameters::new(registry),
    };

    if let Some(state) = &inputs.state {
        let raw: Value = serde_json::from_str(state)
            .map_err(|e| CliError::invalid_argument(format!("Invalid --state JSON: {}", e)))?;
        params.set_state_json(&raw)?;
    }

    if apply_adjustment {
        if let Some(path) = &inputs.adjust {
            params.adjust_json(&read_json_file(path)?, &AdjustOptions::default())?;
        }
    }
    Ok(params)
}

/// Turns `["year=2017", "year=2018"]` into `{"year": [2017, 2018]}`.
///
/// Values are read as JSON when they parse, as text otherwise.
fn parse_filters(filters: &[String]) -> CliResult<Value> {
    let mut grouped: IndexMap<String, Vec<Value>> = IndexMap::new();
    for filter in filters {
        let (label, value) = filter.split_once('=').ok_or_else(|| {
            CliError::invalid_argument(format!("filter {} is not label=value", filter))
        })?;
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        grouped.entry(label.trim().to_string()).or_default().push(value);
    }
    Ok(Value::Object(
        grouped
            .into_iter()
            .map(|(label, values)| (label, Value::Array(values)))
            .collect(),
    ))
}
