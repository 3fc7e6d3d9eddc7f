//! JSON I/O handling for CLI
//!
//! - Input: JSON files named on the command line
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON document from a file
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::io_error(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Build the success envelope
pub fn response(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

/// Build the error envelope
pub fn error_response(error: &CliError) -> Value {
    serde_json::json!({
        "status": "error",
        "code": error.code_str(),
        "message": error.message()
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&response(data))
}

/// Write an error response to stdout
pub fn write_error(error: &CliError) -> CliResult<()> {
    write_value(&error_response(error))
}

fn write_value(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use serde_json::json;

    #[test]
    fn test_envelopes() {
        assert_eq!(response(json!(1)), json!({"status": "ok", "data": 1}));

        let err = CliError::new(CliErrorCode::AdjustFailed, "nope");
        assert_eq!(
            error_response(&err),
            json!({"status": "error", "code": "PG_CLI_ADJUST_FAILED", "message": "nope"})
        );
    }

    #[test]
    fn test_read_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, "{\"x\": [1, 2]}").unwrap();
        assert_eq!(read_json_file(&path).unwrap(), json!({"x": [1, 2]}));

        fs::write(&path, "{").unwrap();
        assert_eq!(read_json_file(&path).unwrap_err().code(), CliErrorCode::IoError);
    }
}
