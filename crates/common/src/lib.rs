//! Common types shared by the BRISQUE feature extractor, the regression stage and the CLI
//!
//! # Classifying errors
//! Problems with the image itself come in two variants:
//! [`QualityError::InvalidInput`] (empty image, bad sample layout) and
//! [`QualityError::ImageTooSmall`] (an image under 7x7 at some scale, with
//! the offending dimensions). Match on [`QualityError::is_invalid_input`] to
//! catch both rather than on a single variant:
//!
//! ```
//! use brisque_common::{QualityError, Result};
//!
//! fn outcome(result: Result<f64>) -> &'static str {
//!     match result {
//!         Ok(_) => "scored",
//!         Err(e) if e.is_invalid_input() => "rejected image",
//!         Err(_) => "failed",
//!     }
//! }
//!
//! let too_small = QualityError::ImageTooSmall { width: 6, height: 6, scale: 2, min: 7 };
//! assert_eq!(outcome(Err(too_small)), "rejected image");
//! assert_eq!(outcome(Err(QualityError::InvalidInput("empty".into()))), "rejected image");
//! assert_eq!(outcome(Err(QualityError::ParseError("line 3".into()))), "failed");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Number of features produced per image (2 scales x 18)
pub const FEATURE_COUNT: usize = 36;

/// Number of scales in the pyramid
pub const SCALE_COUNT: usize = 2;

/// Features contributed by one scale: 2 for the MSCN field, 4 per orientation
pub const FEATURES_PER_SCALE: usize = FEATURE_COUNT / SCALE_COUNT;

/// Names of the five fitted fields of one scale, in feature order
pub const FIELD_NAMES: [&str; 5] = [
    "mscn",
    "horizontal",
    "vertical",
    "main_diagonal",
    "anti_diagonal",
];

const MSCN_PARAMS: [&str; 2] = ["gamma", "variance"];
const ORIENTATION_PARAMS: [&str; 4] = ["gamma", "mean", "left_variance", "right_variance"];

/// Quality assessment errors
///
/// `InvalidInput` and `ImageTooSmall` are both caller errors about the image;
/// test for them with [`QualityError::is_invalid_input`]. `ParseError` and
/// `MissingData` come from model/range loading and surface before any image
/// is processed. `ImageError` is a file that could not be decoded.
#[derive(Debug, Error)]
pub enum QualityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image too small at scale {scale}: {width}x{height} (minimum {min}x{min})")]
    ImageTooSmall {
        width: usize,
        height: usize,
        scale: usize,
        min: usize,
    },

    #[error("Degenerate coefficient statistics: {0}")]
    DegenerateStatistics(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Required data not found: {0}")]
    MissingData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(String),
}

impl QualityError {
    /// True for errors caused by the image handed in by the caller:
    /// `InvalidInput` and `ImageTooSmall`
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            QualityError::InvalidInput(_) | QualityError::ImageTooSmall { .. }
        )
    }
}

impl From<image::ImageError> for QualityError {
    fn from(err: image::ImageError) -> Self {
        QualityError::ImageError(err.to_string())
    }
}

/// Result type for quality operations
pub type Result<T> = std::result::Result<T, QualityError>;

/// The 36 BRISQUE features of one image, in positional order
///
/// Layout per scale (scale 1 first, then scale 2):
/// `[mscn gamma, mscn variance]` followed by
/// `[gamma, mean, left variance, right variance]` for the horizontal,
/// vertical, main-diagonal and anti-diagonal pairwise products.
/// Regression models index this vector by position, so the length is
/// enforced on every construction path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap a fixed-size array of features
    #[must_use]
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values.to_vec())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with slices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Features paired with their labels (see [`feature_label`])
    pub fn labelled(&self) -> impl Iterator<Item = (String, f64)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, &value)| (feature_label(i), value))
    }

    /// Bitwise equality, treating identical NaN payloads as equal
    #[must_use]
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Number of NaN entries
    #[must_use]
    pub fn nan_count(&self) -> usize {
        self.0.iter().filter(|v| v.is_nan()).count()
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = QualityError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(QualityError::InvalidInput(format!(
                "feature vector must have {} elements, got {}",
                FEATURE_COUNT,
                values.len()
            )));
        }
        Ok(Self(values))
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(features: FeatureVector) -> Self {
        features.0
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{value:.6}")?;
        }
        Ok(())
    }
}

/// Label of the feature at `index`, e.g. `s2_vertical_left_variance`
///
/// # Panics
/// Panics if `index >= FEATURE_COUNT`.
#[must_use]
pub fn feature_label(index: usize) -> String {
    assert!(index < FEATURE_COUNT, "feature index out of range: {index}");

    let scale = index / FEATURES_PER_SCALE + 1;
    let within = index % FEATURES_PER_SCALE;

    if within < MSCN_PARAMS.len() {
        return format!("s{}_{}_{}", scale, FIELD_NAMES[0], MSCN_PARAMS[within]);
    }

    let offset = within - MSCN_PARAMS.len();
    let field = FIELD_NAMES[1 + offset / ORIENTATION_PARAMS.len()];
    let param = ORIENTATION_PARAMS[offset % ORIENTATION_PARAMS.len()];
    format!("s{scale}_{field}_{param}")
}

/// All 36 labels in positional order
#[must_use]
pub fn feature_labels() -> Vec<String> {
    (0..FEATURE_COUNT).map(feature_label).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_rejects_wrong_length() {
        let err = FeatureVector::try_from(vec![0.0; 35]).unwrap_err();
        assert!(err.is_invalid_input());

        assert!(FeatureVector::try_from(vec![0.0; 37]).is_err());
        assert!(FeatureVector::try_from(vec![0.0; FEATURE_COUNT]).is_ok());
    }

    #[test]
    fn test_feature_vector_serialization() {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64 * 0.5;
        }
        let features = FeatureVector::from_array(values);

        let json = serde_json::to_string(&features).unwrap();
        assert!(json.starts_with('['));

        let deserialized: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(features, deserialized);

        let short: std::result::Result<FeatureVector, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(short.is_err());
    }

    #[test]
    fn test_feature_labels_layout() {
        let labels = feature_labels();
        assert_eq!(labels.len(), FEATURE_COUNT);
        assert_eq!(labels[0], "s1_mscn_gamma");
        assert_eq!(labels[1], "s1_mscn_variance");
        assert_eq!(labels[2], "s1_horizontal_gamma");
        assert_eq!(labels[3], "s1_horizontal_mean");
        assert_eq!(labels[6], "s1_vertical_gamma");
        assert_eq!(labels[17], "s1_anti_diagonal_right_variance");
        assert_eq!(labels[18], "s2_mscn_gamma");
        assert_eq!(labels[35], "s2_anti_diagonal_right_variance");
    }

    #[test]
    fn test_bit_eq_treats_nan_as_equal() {
        let mut values = [1.0; FEATURE_COUNT];
        values[1] = f64::NAN;
        let a = FeatureVector::from_array(values);
        let b = a.clone();

        assert_ne!(a, b);
        assert!(a.bit_eq(&b));
        assert_eq!(a.nan_count(), 1);
    }

    #[test]
    fn test_error_classification() {
        let too_small = QualityError::ImageTooSmall {
            width: 4,
            height: 9,
            scale: 1,
            min: 7,
        };
        assert!(too_small.is_invalid_input());
        assert!(!QualityError::ParseError("x".to_string()).is_invalid_input());
        assert!(too_small.to_string().contains("4x9"));
    }
}
