//! Shared fixtures for integration tests
//!
//! The standard deduction schema: `year` (2013-2027) is the extend label,
//! `marital_status` is single/joint. Defaults exist for 2017, 2018 and 2026.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use paramgrid::schema::{Scalar, SchemaRegistry};
use paramgrid::Parameters;
use serde_json::{json, Value};

pub const FIRST_YEAR: i64 = 2013;
pub const LAST_YEAR: i64 = 2027;

pub fn schema() -> Value {
    json!({
        "labels": {
            "year": {
                "type": "int",
                "validators": {"range": {"min": FIRST_YEAR, "max": LAST_YEAR}},
                "extend": true
            },
            "marital_status": {
                "type": "str",
                "validators": {"choice": {"choices": ["single", "joint"]}}
            }
        },
        "operators": {"label_to_extend": "year", "uses_extend_func": false},
        "parameters": {
            "standard_deduction": {
                "title": "Standard deduction amount",
                "description": "Amount filing unit can use as a standard deduction.",
                "type": "float",
                "indexed": true,
                "section_1": "Deductions",
                "value": [
                    {"year": 2017, "marital_status": "single", "value": 6350},
                    {"year": 2017, "marital_status": "joint", "value": 12700},
                    {"year": 2018, "marital_status": "single", "value": 12000},
                    {"year": 2018, "marital_status": "joint", "value": 24000},
                    {"year": 2026, "marital_status": "single", "value": 7685},
                    {"year": 2026, "marital_status": "joint", "value": 15369}
                ],
                "validators": {"range": {"min": 0, "max": 9e99}}
            },
            "personal_exemption": {
                "title": "Personal exemption",
                "type": "float",
                "value": [
                    {"year": 2017, "value": 4050},
                    {"year": 2018, "value": 0}
                ],
                "validators": {"range": {"min": 0, "max": 9e99}}
            },
            "credit_rate": {
                "title": "Credit rate",
                "type": "float",
                "value": 0.25,
                "validators": {"range": {"min": 0, "max": 1}}
            },
            "brackets": {
                "title": "Bracket thresholds",
                "type": "int",
                "number_dims": 1,
                "value": [{"year": 2017, "value": [9325, 37950, 91900]}],
                "validators": {"range": {"min": 0, "max": 9e99}}
            },
            "filer_label": {
                "type": "str",
                "value": [{"marital_status": "single", "value": "S"}, {"marital_status": "joint", "value": "J"}]
            }
        }
    })
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::from_json(&schema()).unwrap()
}

pub fn parameters() -> Parameters {
    Parameters::new(registry())
}

/// Stored value of a year/marital_status parameter, ignoring the state
pub fn value_at(params: &Parameters, param: &str, year: i64, status: &str) -> Option<f64> {
    params
        .records(param)?
        .into_iter()
        .find(|record| {
            record.label("year") == Some(&Scalar::Int(year))
                && record.label("marital_status") == Some(&Scalar::from(status))
        })
        .and_then(|record| record.value.as_scalar().and_then(Scalar::as_f64))
}

/// Index rates for every year but the last
pub fn flat_rates(rate: f64) -> Value {
    let rates: serde_json::Map<String, Value> = (FIRST_YEAR..LAST_YEAR)
        .map(|year| (year.to_string(), json!(rate)))
        .collect();
    Value::Object(rates)
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}
