//! Dataset loader
//!
//! Reads a dataset snapshot from a JSON document and validates it once at
//! the load boundary. A dataset that fails validation is never returned.

use std::fs;
use std::path::Path;

use super::errors::{DatasetError, DatasetResult};
use super::types::Dataset;
use super::validator::DatasetValidator;

/// Loads dataset snapshots from JSON.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Loads and validates a dataset from a JSON file.
    pub fn load_file(path: &Path) -> DatasetResult<Dataset> {
        let content = fs::read_to_string(path)
            .map_err(|e| DatasetError::io(path.display().to_string(), e.to_string()))?;
        Self::load_str(&content)
    }

    /// Loads and validates a dataset from a JSON string.
    pub fn load_str(content: &str) -> DatasetResult<Dataset> {
        let dataset: Dataset = serde_json::from_str(content)
            .map_err(|e| DatasetError::malformed(format!("Invalid dataset JSON: {}", e)))?;
        DatasetValidator::validate(&dataset)?;
        Ok(dataset)
    }

    /// Validates an already materialized dataset.
    pub fn load_value(value: serde_json::Value) -> DatasetResult<Dataset> {
        let dataset: Dataset = serde_json::from_value(value)
            .map_err(|e| DatasetError::malformed(format!("Invalid dataset document: {}", e)))?;
        DatasetValidator::validate(&dataset)?;
        Ok(dataset)
    }
}
