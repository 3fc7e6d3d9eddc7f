//! CLI Command Tests
//!
//! Commands run against files in a temp directory; each returns the `data`
//! part of its JSON response or a coded error.

mod fixtures;

use clap::Parser;
use fixtures::*;
use paramgrid::cli::{error_response, run_command, Cli, CliErrorCode, CliResult};
use serde_json::{json, Value};
use tempfile::TempDir;

fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_json(tmp.path(), "schema.json", &schema());
    tmp
}

fn run(tmp: &TempDir, args: &[&str]) -> CliResult<Value> {
    let schema = tmp.path().join("schema.json");
    let mut argv = vec!["paramgrid".to_string()];
    argv.push(args[0].to_string());
    argv.push("--schema".to_string());
    argv.push(schema.display().to_string());
    argv.extend(args[1..].iter().map(|s| s.to_string()));
    let cli = Cli::try_parse_from(argv).unwrap();
    run_command(cli.command)
}

/// check summarizes labels and parameters.
#[test]
fn test_check() {
    let tmp = setup();
    let data = run(&tmp, &["check"]).unwrap();

    assert_eq!(data["records"], json!(63));
    assert_eq!(data["labels"]["year"]["values"], json!(15));
    assert_eq!(data["labels"]["year"]["extend"], json!(true));
    assert_eq!(data["label_to_extend"], json!("year"));

    let sd = &data["parameters"]["standard_deduction"];
    assert_eq!(sd["title"], json!("Standard deduction amount"));
    assert_eq!(sd["labels"], json!(["year", "marital_status"]));
    assert_eq!(sd["indexed"], json!(true));
    assert_eq!(sd["attributes"], json!({"section_1": "Deductions"}));
    assert_eq!(data["parameters"]["credit_rate"]["notes"], Value::Null);
    assert_eq!(data["parameters"]["brackets"]["number_dims"], json!(1));
}

/// query filters by label values.
#[test]
fn test_query() {
    let tmp = setup();
    let data = run(
        &tmp,
        &[
            "query",
            "--filter",
            "year=2026",
            "--filter",
            "marital_status=joint",
            "--param",
            "standard_deduction",
        ],
    )
    .unwrap();

    assert_eq!(
        data,
        json!({"standard_deduction": [{"year": 2026, "marital_status": "joint", "value": 15369.0}]})
    );
}

/// query reports unknown labels with a coded error.
#[test]
fn test_query_unknown_label() {
    let tmp = setup();
    let err = run(&tmp, &["query", "--filter", "region=north"]).unwrap_err();
    assert_eq!(err.code(), CliErrorCode::LabelError);
    assert_eq!(error_response(&err)["status"], json!("error"));
}

/// adjust applies the file and reports counts.
#[test]
fn test_adjust() {
    let tmp = setup();
    let adjust = write_json(
        tmp.path(),
        "adjust.json",
        &json!({"standard_deduction": [{"year": 2017, "marital_status": "single", "value": 10000}]}),
    );
    let adjust = adjust.display().to_string();

    let data = run(&tmp, &["adjust", "--adjust", adjust.as_str()]).unwrap();
    assert_eq!(data["written"], json!(1));
    assert_eq!(data["extended"], json!(10));
    assert_eq!(data["errors"], json!({}));

    let data = run(&tmp, &["adjust", "--adjust", adjust.as_str(), "--no-extend"]).unwrap();
    assert_eq!(data["extended"], json!(0));
}

/// adjust fails on invalid values unless told to keep going.
#[test]
fn test_adjust_errors() {
    let tmp = setup();
    let adjust = write_json(tmp.path(), "adjust.json", &json!({"credit_rate": 3}));
    let adjust = adjust.display().to_string();

    let err = run(&tmp, &["adjust", "--adjust", adjust.as_str()]).unwrap_err();
    assert_eq!(err.code(), CliErrorCode::AdjustFailed);
    assert!(err.message().contains("credit_rate"));

    let data = run(&tmp, &["adjust", "--adjust", adjust.as_str(), "--keep-going"]).unwrap();
    assert_eq!(data["written"], json!(0));
    assert_eq!(data["errors"]["credit_rate"][0]["kind"], json!("RANGE_VIOLATION"));

    let err = run(&tmp, &["adjust"]).unwrap_err();
    assert_eq!(err.code(), CliErrorCode::InvalidArgument);
}

/// grid prints axes and data, after state and adjustments.
#[test]
fn test_grid() {
    let tmp = setup();
    let adjust = write_json(tmp.path(), "adjust.json", &json!({"personal_exemption": 1000}));
    let adjust = adjust.display().to_string();

    let data = run(
        &tmp,
        &[
            "grid",
            "--param",
            "personal_exemption",
            "--state",
            r#"{"year": [2017, 2018]}"#,
            "--adjust",
            adjust.as_str(),
        ],
    )
    .unwrap();

    assert_eq!(
        data,
        json!({
            "axes": [{"label": "year", "values": [2017, 2018]}],
            "data": [1000.0, 1000.0]
        })
    );
}

/// Missing files and bad config surface coded errors.
#[test]
fn test_file_errors() {
    let tmp = setup();
    let missing = tmp.path().join("missing.json").display().to_string();
    let err = run(&tmp, &["check", "--config", missing.as_str()]).unwrap_err();
    assert_eq!(err.code(), CliErrorCode::ConfigError);

    let cli = Cli::try_parse_from(["paramgrid", "check", "--schema", missing.as_str()]).unwrap();
    let err = run_command(cli.command).unwrap_err();
    assert_eq!(err.code(), CliErrorCode::SchemaError);

    let err = run(&tmp, &["check", "--state", "{"]).unwrap_err();
    assert_eq!(err.code(), CliErrorCode::InvalidArgument);
}
