//! Grid Projection Tests
//!
//! - Axes follow label declaration order, restricted to the state
//! - Vectors add a trailing axis
//! - from_grid is the exact inverse of to_grid
//! - Grids written back through adjust land in the store

mod fixtures;

use fixtures::*;
use paramgrid::adjust::AdjustOptions;
use paramgrid::projector::{Axis, Grid, ProjectionError};
use paramgrid::schema::Scalar;
use serde_json::json;

/// Full grid of a two-label parameter.
#[test]
fn test_grid_shape_and_cells() {
    let params = parameters();
    let grid = params.to_grid("standard_deduction").unwrap();

    assert_eq!(grid.shape(), vec![15, 2]);
    assert_eq!(grid.axes()[0].label.as_deref(), Some("year"));
    assert_eq!(grid.axes()[1].label.as_deref(), Some("marital_status"));
    // 2017 is the fifth year; joint is the second status
    assert_eq!(grid.get(&[4, 1]), Some(12700.0));
    assert_eq!(grid.get(&[14, 0]), Some(7685.0));
}

/// The state narrows every axis.
#[test]
fn test_grid_follows_state() {
    let mut params = parameters();
    params
        .set_state_json(&json!({"year": [2018, 2017], "marital_status": "joint"}))
        .unwrap();

    let grid = params.to_grid("standard_deduction").unwrap();
    assert_eq!(grid.shape(), vec![2, 1]);
    assert_eq!(grid.data(), &[12700.0, 24000.0]);
    assert_eq!(grid.axes()[0].values, vec![Scalar::Int(2017), Scalar::Int(2018)]);

    // personal_exemption does not vary over marital_status
    assert_eq!(params.to_grid("personal_exemption").unwrap().shape(), vec![2]);
}

/// Vectors get a trailing unlabeled axis.
#[test]
fn test_vector_grid() {
    let mut params = parameters();
    params.set_state_json(&json!({"year": 2020})).unwrap();

    let grid = params.to_grid("brackets").unwrap();
    assert_eq!(grid.shape(), vec![1, 3]);
    assert_eq!(grid.axes()[1].label, None);
    assert_eq!(grid.data(), &[9325.0, 37950.0, 91900.0]);
}

/// Unlabeled parameters project to a zero-dimensional grid.
#[test]
fn test_scalar_grid() {
    let params = parameters();
    let grid = params.to_grid("credit_rate").unwrap();
    assert!(grid.shape().is_empty());
    assert_eq!(grid.data(), &[0.25]);
}

/// Projecting back yields the stored records in grid order.
#[test]
fn test_round_trip() {
    let params = parameters();
    for name in ["standard_deduction", "personal_exemption", "brackets", "credit_rate"] {
        let grid = params.to_grid(name).unwrap();
        let records = params.from_grid(name, &grid).unwrap();
        assert_eq!(records, params.records(name).unwrap(), "{}", name);
    }
}

/// An edited grid written back through adjust updates the store.
#[test]
fn test_edited_grid_adjusts_store() {
    let mut params = parameters();
    params
        .set_state_json(&json!({"year": [2020, 2021]}))
        .unwrap();

    let mut grid = params.to_grid("standard_deduction").unwrap();
    for cell in grid.data_mut() {
        *cell *= 2.0;
    }
    let records = params.from_grid("standard_deduction", &grid).unwrap();
    params
        .adjust_json(
            &json!({"standard_deduction": serde_json::to_value(&records).unwrap()}),
            &AdjustOptions::default(),
        )
        .unwrap();

    assert_eq!(value_at(&params, "standard_deduction", 2020, "single"), Some(24000.0));
    assert_eq!(value_at(&params, "standard_deduction", 2021, "joint"), Some(48000.0));
    assert_eq!(value_at(&params, "standard_deduction", 2022, "joint"), Some(24000.0));
}

/// Text parameters have no grid.
#[test]
fn test_non_numeric_parameter() {
    let params = parameters();
    assert!(matches!(
        params.to_grid("filer_label").unwrap_err(),
        ProjectionError::NonNumeric { .. }
    ));
    assert!(matches!(
        params.to_grid("nope").unwrap_err(),
        ProjectionError::UnknownParameter(_)
    ));
}

/// Grids of the wrong shape are rejected.
#[test]
fn test_shape_mismatch() {
    let params = parameters();
    let grid = Grid::new(
        vec![Axis {
            label: Some("year".into()),
            values: vec![Scalar::Int(2017)],
        }],
        vec![1.0],
    )
    .unwrap();

    assert!(matches!(
        params.from_grid("standard_deduction", &grid).unwrap_err(),
        ProjectionError::ShapeMismatch { .. }
    ));
}
