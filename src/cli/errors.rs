//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::adjust::AdjustError;
use crate::config::ConfigError;
use crate::projector::ProjectionError;
use crate::schema::SchemaError;
use crate::state::LabelError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Schema file failed to load or register
    SchemaError,
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// A flag value could not be understood
    InvalidArgument,
    /// Unknown label or label value
    LabelError,
    /// Adjustment rejected
    AdjustFailed,
    /// Grid projection failed
    ProjectionFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaError => "PG_CLI_SCHEMA_ERROR",
            Self::ConfigError => "PG_CLI_CONFIG_ERROR",
            Self::IoError => "PG_CLI_IO_ERROR",
            Self::InvalidArgument => "PG_CLI_INVALID_ARGUMENT",
            Self::LabelError => "PG_CLI_LABEL_ERROR",
            Self::AdjustFailed => "PG_CLI_ADJUST_FAILED",
            Self::ProjectionFailed => "PG_CLI_PROJECTION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Schema(e) => e.into(),
            ConfigError::Label(e) => e.into(),
            other => Self::config_error(other.to_string()),
        }
    }
}

impl From<LabelError> for CliError {
    fn from(e: LabelError) -> Self {
        Self::new(CliErrorCode::LabelError, e.to_string())
    }
}

impl From<AdjustError> for CliError {
    fn from(e: AdjustError) -> Self {
        Self::new(CliErrorCode::AdjustFailed, e.to_string())
    }
}

impl From<ProjectionError> for CliError {
    fn from(e: ProjectionError) -> Self {
        Self::new(CliErrorCode::ProjectionFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
