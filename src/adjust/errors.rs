//! Adjustment validation errors
//!
//! Validation problems are collected for a whole adjustment call and grouped
//! by parameter. [`AdjustError::Validation`] carries the aggregate.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::schema::Level;

/// Result type for adjustment calls
pub type AdjustResult<T> = Result<T, AdjustError>;

/// What went wrong with one adjustment entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    /// Value does not fit the parameter's type
    TypeCoercion,
    /// Value falls outside a range validator
    RangeViolation,
    /// Value is not one of a choice validator's values
    ChoiceViolation,
    /// Entry names a label the parameter does not vary over
    UnknownLabel,
    /// Entry names a value outside a label's domain
    UnknownLabelValue,
    /// Adjustment names a parameter that is not declared
    UnknownParameter,
    /// Entry does not have the shape of a record
    Malformed,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::TypeCoercion => "TYPE_COERCION",
            ValidationErrorKind::RangeViolation => "RANGE_VIOLATION",
            ValidationErrorKind::ChoiceViolation => "CHOICE_VIOLATION",
            ValidationErrorKind::UnknownLabel => "UNKNOWN_LABEL",
            ValidationErrorKind::UnknownLabelValue => "UNKNOWN_LABEL_VALUE",
            ValidationErrorKind::UnknownParameter => "UNKNOWN_PARAMETER",
            ValidationErrorKind::Malformed => "MALFORMED",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rejected (or warned about) adjustment entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub level: Level,
    pub param: String,
    /// Labels of the offending record, as given
    pub labels: IndexMap<String, Value>,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        param: impl Into<String>,
        labels: IndexMap<String, Value>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            level: Level::Error,
            param: param.into(),
            labels,
            message: message.into(),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validation errors grouped by parameter, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    by_param: IndexMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.by_param.entry(error.param.clone()).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.by_param.is_empty()
    }

    /// Number of errors across all parameters
    pub fn len(&self) -> usize {
        self.by_param.values().map(Vec::len).sum()
    }

    pub fn get(&self, param: &str) -> &[ValidationError] {
        self.by_param.get(param).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.by_param.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.by_param.values().flatten()
    }

    /// Messages grouped by parameter
    pub fn messages(&self) -> IndexMap<String, Vec<String>> {
        self.by_param
            .iter()
            .map(|(param, errors)| {
                (param.clone(), errors.iter().map(|e| e.message.clone()).collect())
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (param, errors) in &self.by_param {
            writeln!(f, "  {}:", param)?;
            for error in errors {
                writeln!(f, "    {}", error.message)?;
            }
        }
        Ok(())
    }
}

/// Adjustment failures
#[derive(Debug, Clone, Error)]
pub enum AdjustError {
    /// Input is not a map of parameter names
    #[error("Invalid adjustment: {0}")]
    Parse(String),

    /// Entries failed validation
    #[error("{}", render(.errors, .warnings))]
    Validation {
        errors: ValidationErrors,
        warnings: ValidationErrors,
    },
}

fn render(errors: &ValidationErrors, warnings: &ValidationErrors) -> String {
    let mut out = format!(
        "Adjustment failed validation ({} errors, {} warnings)",
        errors.len(),
        warnings.len()
    );
    if !errors.is_empty() {
        out.push_str("\nerrors:\n");
        out.push_str(&errors.to_string());
    }
    if !warnings.is_empty() {
        out.push_str("\nwarnings:\n");
        out.push_str(&warnings.to_string());
    }
    out.trim_end().to_string()
}
