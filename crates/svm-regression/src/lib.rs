//! Regression stage for BRISQUE scores
//!
//! Provides the two collaborators that turn a feature vector into a score:
//! - [`RangeTable`]: per-feature (min, max) pairs used to rescale features
//!   to roughly [-1, 1]
//! - [`SvmModel`]: a support vector regression model in libsvm text format,
//!   exposed through the [`QualityRegressor`] trait
//!
//! # Example
//! ```no_run
//! use brisque_svm::{QualityRegressor, RangeTable, SvmModel};
//! # use brisque_common::FeatureVector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let features = FeatureVector::from_array([0.0; 36]);
//! let model = SvmModel::load("brisque_allmodel.dat")?;
//! let ranges = RangeTable::load("brisque_allrange.dat")?;
//!
//! let score = model.predict(&ranges.scale(&features));
//! println!("BRISQUE score: {score:.3}");
//! # Ok(())
//! # }
//! ```

pub mod model;
pub mod range;

use brisque_common::QualityError;
use thiserror::Error;

pub use model::{Kernel, SupportVector, SvmModel, SvmType};
pub use range::RangeTable;

/// Errors raised while loading range tables and models
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unsupported model: {0}")]
    Unsupported(String),
}

impl ModelError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ModelError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<ModelError> for QualityError {
    fn from(err: ModelError) -> Self {
        QualityError::ParseError(err.to_string())
    }
}

/// Maps a rescaled feature vector to a quality score
///
/// Implementations must be pure: the same input always yields the same
/// score.
pub trait QualityRegressor: Send + Sync {
    fn predict(&self, scaled_features: &[f64]) -> f64;
}

impl<R: QualityRegressor + ?Sized> QualityRegressor for Box<R> {
    fn predict(&self, scaled_features: &[f64]) -> f64 {
        (**self).predict(scaled_features)
    }
}
