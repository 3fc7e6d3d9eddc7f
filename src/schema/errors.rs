//! Schema error types
//!
//! Error codes:
//! - PG_SCHEMA_MALFORMED
//! - PG_SCHEMA_UNKNOWN_TYPE
//! - PG_SCHEMA_UNDEFINED_BOUND
//! - PG_SCHEMA_UNDECLARED_LABEL
//! - PG_SCHEMA_MULTIPLE_EXTEND_LABELS
//! - PG_SCHEMA_INVALID_DOMAIN
//! - PG_SCHEMA_INCONSISTENT_LABELS
//! - PG_SCHEMA_INVALID_DEFAULT
//!
//! Every schema error is fatal: a registry is never built from a declaration
//! that produced one.

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Declaration does not have the expected shape
    PgSchemaMalformed,
    /// Label or parameter type is not recognized
    PgSchemaUnknownType,
    /// Validator bound names something that is not declared
    PgSchemaUndefinedBound,
    /// Parameter record uses a label that is not declared
    PgSchemaUndeclaredLabel,
    /// More than one label is marked as the extend dimension
    PgSchemaMultipleExtendLabels,
    /// Label domain cannot be enumerated
    PgSchemaInvalidDomain,
    /// Default records of one parameter vary over different label sets
    PgSchemaInconsistentLabels,
    /// Default record does not fit its parameter or labels
    PgSchemaInvalidDefault,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::PgSchemaMalformed => "PG_SCHEMA_MALFORMED",
            SchemaErrorCode::PgSchemaUnknownType => "PG_SCHEMA_UNKNOWN_TYPE",
            SchemaErrorCode::PgSchemaUndefinedBound => "PG_SCHEMA_UNDEFINED_BOUND",
            SchemaErrorCode::PgSchemaUndeclaredLabel => "PG_SCHEMA_UNDECLARED_LABEL",
            SchemaErrorCode::PgSchemaMultipleExtendLabels => "PG_SCHEMA_MULTIPLE_EXTEND_LABELS",
            SchemaErrorCode::PgSchemaInvalidDomain => "PG_SCHEMA_INVALID_DOMAIN",
            SchemaErrorCode::PgSchemaInconsistentLabels => "PG_SCHEMA_INCONSISTENT_LABELS",
            SchemaErrorCode::PgSchemaInvalidDefault => "PG_SCHEMA_INVALID_DEFAULT",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Label or parameter the error is about, if any
    subject: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, subject: Option<String>, message: String) -> Self {
        Self {
            code,
            message,
            subject,
        }
    }

    /// Create an error for a declaration with the wrong shape
    pub fn malformed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        let source = source.into();
        Self::new(
            SchemaErrorCode::PgSchemaMalformed,
            Some(source.clone()),
            format!("Malformed declaration '{}': {}", source, reason.into()),
        )
    }

    /// Create an unknown type error
    pub fn unknown_type(subject: impl Into<String>, type_name: &str) -> Self {
        let subject = subject.into();
        Self::new(
            SchemaErrorCode::PgSchemaUnknownType,
            Some(subject.clone()),
            format!(
                "'{}' declares unknown type '{}' (expected one of int, float, bool, str, date)",
                subject, type_name
            ),
        )
    }

    /// Create an undefined bound error
    pub fn undefined_bound(subject: impl Into<String>, bound: impl fmt::Display) -> Self {
        let subject = subject.into();
        Self::new(
            SchemaErrorCode::PgSchemaUndefinedBound,
            Some(subject.clone()),
            format!("Validator of '{}' references undefined bound '{}'", subject, bound),
        )
    }

    /// Create an undeclared label error
    pub fn undeclared_label(param: impl Into<String>, label: &str) -> Self {
        let param = param.into();
        Self::new(
            SchemaErrorCode::PgSchemaUndeclaredLabel,
            Some(param.clone()),
            format!("Parameter '{}' uses undeclared label '{}'", param, label),
        )
    }

    /// Create an error for more than one extend label
    pub fn multiple_extend_labels(names: &[&str]) -> Self {
        Self::new(
            SchemaErrorCode::PgSchemaMultipleExtendLabels,
            None,
            format!(
                "At most one label may be the extend dimension, found: {}",
                names.join(", ")
            ),
        )
    }

    /// Create an invalid domain error
    pub fn invalid_domain(label: impl Into<String>, reason: impl Into<String>) -> Self {
        let label = label.into();
        Self::new(
            SchemaErrorCode::PgSchemaInvalidDomain,
            Some(label.clone()),
            format!("Label '{}' has no usable domain: {}", label, reason.into()),
        )
    }

    /// Create an inconsistent labels error
    pub fn inconsistent_labels(param: impl Into<String>, index: usize) -> Self {
        let param = param.into();
        Self::new(
            SchemaErrorCode::PgSchemaInconsistentLabels,
            Some(param.clone()),
            format!(
                "Default record {} of '{}' does not use the same labels as the first record",
                index, param
            ),
        )
    }

    /// Create an invalid default error
    pub fn invalid_default(param: impl Into<String>, reason: impl Into<String>) -> Self {
        let param = param.into();
        Self::new(
            SchemaErrorCode::PgSchemaInvalidDefault,
            Some(param.clone()),
            format!("Invalid default for '{}': {}", param, reason.into()),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the label or parameter name if applicable
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::PgSchemaMalformed.code(), "PG_SCHEMA_MALFORMED");
        assert_eq!(SchemaErrorCode::PgSchemaUnknownType.code(), "PG_SCHEMA_UNKNOWN_TYPE");
        assert_eq!(
            SchemaErrorCode::PgSchemaUndefinedBound.code(),
            "PG_SCHEMA_UNDEFINED_BOUND"
        );
        assert_eq!(
            SchemaErrorCode::PgSchemaMultipleExtendLabels.code(),
            "PG_SCHEMA_MULTIPLE_EXTEND_LABELS"
        );
    }

    #[test]
    fn test_display_includes_code_and_subject() {
        let err = SchemaError::undeclared_label("standard_deduction", "region");
        let display = format!("{}", err);
        assert!(display.starts_with("PG_SCHEMA_UNDECLARED_LABEL"));
        assert!(display.contains("region"));
        assert_eq!(err.subject(), Some("standard_deduction"));
    }

    #[test]
    fn test_multiple_extend_labels_lists_names() {
        let err = SchemaError::multiple_extend_labels(&["year", "month"]);
        assert!(err.message().contains("year, month"));
        assert!(err.subject().is_none());
    }
}
