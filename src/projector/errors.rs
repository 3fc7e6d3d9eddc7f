//! Grid projection errors

use thiserror::Error;

/// Result type for grid projection
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Grid projection errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("{0} is not a valid parameter.")]
    UnknownParameter(String),

    /// `str` and `date` values have no numeric form
    #[error("{param} has {type_name} values and cannot be projected onto a numeric grid")]
    NonNumeric { param: String, type_name: &'static str },

    #[error("{param} has vectors of different lengths ({expected} and {found})")]
    RaggedVector {
        param: String,
        expected: usize,
        found: usize,
    },

    /// The store does not cover the active state for this parameter
    #[error("{param} has no value for {}", .missing.join(", "))]
    IncompleteProjection { param: String, missing: Vec<String> },

    #[error("Grid for {param} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        param: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("{param}: cell {index} holds {value}, which is not a valid integer")]
    TypeCoercion { param: String, index: usize, value: f64 },
}
