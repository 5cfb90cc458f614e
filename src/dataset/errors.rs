//! Dataset error types
//!
//! Error codes:
//! - RULEVIEW_DATASET_IO (FATAL)
//! - RULEVIEW_DATASET_MALFORMED (FATAL)
//! - RULEVIEW_DATA_INTEGRITY (FATAL)

use std::fmt;

/// Severity levels for dataset errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The dataset was rejected but the caller may offer another one
    Reject,
    /// The session cannot continue with this dataset
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Dataset error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetErrorCode {
    /// Dataset file could not be read
    RuleviewDatasetIo,
    /// Dataset file is not a well-formed dataset document
    RuleviewDatasetMalformed,
    /// Dataset violates a structural invariant
    RuleviewDataIntegrity,
}

impl DatasetErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DatasetErrorCode::RuleviewDatasetIo => "RULEVIEW_DATASET_IO",
            DatasetErrorCode::RuleviewDatasetMalformed => "RULEVIEW_DATASET_MALFORMED",
            DatasetErrorCode::RuleviewDataIntegrity => "RULEVIEW_DATA_INTEGRITY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            DatasetErrorCode::RuleviewDatasetIo => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for DatasetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Dataset error type with full context
#[derive(Debug, Clone)]
pub struct DatasetError {
    /// Error code
    code: DatasetErrorCode,
    /// Human-readable message
    message: String,
    /// Offending field, if known
    field: Option<String>,
}

impl DatasetError {
    /// Create an I/O error
    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            code: DatasetErrorCode::RuleviewDatasetIo,
            message: format!("Failed to read dataset '{}': {}", path, reason.into()),
            field: None,
        }
    }

    /// Create a malformed dataset error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            code: DatasetErrorCode::RuleviewDatasetMalformed,
            message: reason.into(),
            field: None,
        }
    }

    /// Create a data integrity error for the given field
    pub fn integrity(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            code: DatasetErrorCode::RuleviewDataIntegrity,
            message: format!("{}: {}", field, reason.into()),
            field: Some(field),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DatasetErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending field if known
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for DatasetError {}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
