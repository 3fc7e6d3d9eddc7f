//! Label errors for state selections and filters

use thiserror::Error;

/// Result type for label lookups
pub type LabelResult<T> = Result<T, LabelError>;

/// A label name or value that is not part of the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("{0} is not a valid label.")]
    UnknownLabel(String),

    #[error("{value} is not a valid value of label {label}.")]
    UnknownLabelValue { label: String, value: String },

    /// Selections must be an object of label names
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}
