//! CLI-specific error types

use std::fmt;
use std::io;

use crate::dataset::DatasetError;
use crate::engine::EngineError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Dataset could not be loaded
    DatasetError,
    /// A session command failed
    CommandError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RULEVIEW_CLI_CONFIG_ERROR",
            Self::IoError => "RULEVIEW_CLI_IO_ERROR",
            Self::DatasetError => "RULEVIEW_CLI_DATASET_ERROR",
            Self::CommandError => "RULEVIEW_CLI_COMMAND_ERROR",
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

    /// Dataset error
    pub fn dataset_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::DatasetError, msg)
    }

    /// Command error
    pub fn command_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::CommandError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
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

impl From<DatasetError> for CliError {
    fn from(e: DatasetError) -> Self {
        Self::dataset_error(e.to_string())
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Dataset(inner) => Self::from(inner),
            other => Self::command_error(format!("{}: {}", other.code(), other)),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_engine_error() {
        let err: CliError = EngineError::integrity("winner[0]").into();
        assert_eq!(err.code(), &CliErrorCode::CommandError);
        assert!(err.message().contains("RULEVIEW_DATA_INTEGRITY"));

        let err: CliError = EngineError::from(DatasetError::malformed("x")).into();
        assert_eq!(err.code_str(), "RULEVIEW_CLI_DATASET_ERROR");
    }

    #[test]
    fn test_display() {
        let err = CliError::config_error("dataset_path is empty");
        assert_eq!(
            err.to_string(),
            "RULEVIEW_CLI_CONFIG_ERROR: dataset_path is empty"
        );
    }
}
