//! Scorer configuration

use brisque_common::{QualityError, Result};
use brisque_features::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a directory with the reference data files
pub const DATA_DIR_ENV: &str = "BRISQUE_DATA_DIR";

/// File name of the reference model inside the data directory
pub const DEFAULT_MODEL_FILE: &str = "brisque_allmodel.dat";

/// File name of the reference range table inside the data directory
pub const DEFAULT_RANGE_FILE: &str = "brisque_allrange.dat";

/// Configuration for [`crate::BrisqueScorer`]
///
/// ```yaml
/// model_path: models/brisque_allmodel.dat
/// range_path: models/brisque_allrange.dat
/// extractor:
///   parallel: true
///   degenerate_policy: propagate
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrisqueConfig {
    /// libsvm model file; falls back to `$BRISQUE_DATA_DIR/brisque_allmodel.dat`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    /// Range file; falls back to the data directory, then to the built-in table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_path: Option<PathBuf>,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl BrisqueConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns `IoError` if the file cannot be read and `ParseError` if it is
    /// not valid configuration YAML.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&contents)
            .map_err(|e| QualityError::ParseError(format!("Failed to parse YAML config: {e}")))
    }

    /// Explicit model path, else the data directory default
    ///
    /// # Errors
    /// Returns `MissingData` when neither is available.
    pub fn resolve_model_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.model_path {
            return Ok(path.clone());
        }
        data_dir_file(DEFAULT_MODEL_FILE).ok_or_else(|| {
            QualityError::MissingData(format!(
                "no model path configured and {DATA_DIR_ENV} is not set"
            ))
        })
    }

    /// Explicit range path, else the data directory default, else `None`
    /// for the built-in reference table
    #[must_use]
    pub fn resolve_range_path(&self) -> Option<PathBuf> {
        self.range_path
            .clone()
            .or_else(|| data_dir_file(DEFAULT_RANGE_FILE))
    }
}

fn data_dir_file(name: &str) -> Option<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(|dir| PathBuf::from(dir).join(name))
}
