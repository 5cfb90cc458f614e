//! Engine error types

use thiserror::Error;

use crate::dataset::DatasetError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine errors
///
/// Threshold values are never errors; they are clamped.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A dataset invariant was found violated while deriving
    #[error("Data integrity violated: {0}")]
    DataIntegrity(String),

    /// A selection referenced a token that does not exist
    #[error("Unknown token {token} (dataset has {token_count} tokens)")]
    UnknownToken { token: usize, token_count: usize },

    /// A replacement dataset was rejected
    #[error("Dataset rejected: {0}")]
    Dataset(#[from] DatasetError),
}

impl EngineError {
    /// Create a data integrity error
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity(message.into())
    }

    /// Stable string code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::DataIntegrity(_) => "RULEVIEW_DATA_INTEGRITY",
            EngineError::UnknownToken { .. } => "RULEVIEW_UNKNOWN_TOKEN",
            EngineError::Dataset(e) => e.code().code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            EngineError::integrity("winner[0]").code(),
            "RULEVIEW_DATA_INTEGRITY"
        );
        let err = EngineError::UnknownToken {
            token: 9,
            token_count: 3,
        };
        assert_eq!(err.code(), "RULEVIEW_UNKNOWN_TOKEN");
        assert!(err.to_string().contains("9"));
    }

    #[test]
    fn test_from_dataset_error() {
        let err: EngineError = DatasetError::malformed("bad").into();
        assert_eq!(err.code(), "RULEVIEW_DATASET_MALFORMED");
    }
}
