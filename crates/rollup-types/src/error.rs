//! Typed stage error model shared across the pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category, mirroring the pipeline's error taxonomy.
///
/// `Input`, `Schema`, and `Integrity` errors abort the run before anything
/// is written; `Output` errors abort it during serialization. Data-quality
/// issues (dropped rows, de-duplication) are not errors and are reported
/// through the stage summaries instead.
#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or malformed input files, missing columns, empty input.
    #[error("input")]
    Input,
    /// A stage received a table whose columns are missing or mistyped.
    #[error("schema")]
    Schema,
    /// A precondition on the data itself is violated (e.g. duplicate
    /// dimension keys).
    #[error("integrity")]
    Integrity,
    /// Output serialization or file-system failure.
    #[error("output")]
    Output,
}

/// Opaque error code following SCREAMING_SNAKE_CASE convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

impl ErrorCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A categorized, coded pipeline stage failure.
///
/// Every stage failure is fatal: it propagates up, terminates the run, and
/// no output file is produced. There is no retry path.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("[{category}] {code}: {message}")]
pub struct StageError {
    pub category: ErrorCategory,
    pub code: ErrorCode,
    pub message: String,
}

impl StageError {
    /// Input error: unreadable or malformed source data.
    pub fn input(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Input,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Schema error: a required column is absent or has the wrong type.
    pub fn schema(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Schema,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Integrity error: a data precondition is violated.
    pub fn integrity(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Integrity,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Output error: serialization or file-system failure while writing.
    pub fn output(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Output,
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_category() {
        let err = StageError::input("EVENTS_READ", "no such file");
        assert_eq!(err.category, ErrorCategory::Input);
        assert_eq!(err.code, ErrorCode::new("EVENTS_READ"));
    }

    #[test]
    fn test_integrity_error_category() {
        let err = StageError::integrity("DUPLICATE_USER_ID", "user_id 'u1' repeats");
        assert_eq!(err.category, ErrorCategory::Integrity);
    }

    #[test]
    fn test_display_format() {
        let err = StageError::schema("MISSING_COLUMN", "column 'user_id' not found");
        let s = format!("{}", err);
        assert!(s.contains("schema"));
        assert!(s.contains("MISSING_COLUMN"));
        assert!(s.contains("column 'user_id' not found"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let err = StageError::output("PARQUET_WRITE", "disk full");
        let json = serde_json::to_string(&err).expect("serialize");
        let back: StageError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(err, back);
        assert!(json.contains("\"category\":\"output\""));
    }

    #[test]
    fn test_error_code_from_string() {
        let code: ErrorCode = String::from("EMPTY_INPUT").into();
        assert_eq!(code.to_string(), "EMPTY_INPUT");
    }
}
