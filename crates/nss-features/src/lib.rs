//! BRISQUE natural-scene-statistics feature extraction
//!
//! Turns an image into the 36-element feature vector consumed by BRISQUE
//! regression models. For each of two scales (full and half resolution) the
//! image is converted to mean-subtracted contrast-normalized (MSCN)
//! coefficients, an asymmetric generalized Gaussian is fitted to them, and
//! four more fits are made to the products of neighbouring coefficients
//! (horizontal, vertical and both diagonals).
//!
//! # Example
//! ```no_run
//! use brisque_features::{ExtractorConfig, FeatureExtractor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("photo.jpg")?;
//! let extractor = FeatureExtractor::new(ExtractorConfig::default());
//! let features = extractor.extract(&img)?;
//!
//! for (label, value) in features.labelled() {
//!     println!("{label}: {value:.6}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggd;
pub mod grayscale;
pub mod mscn;
pub mod orientation;
pub mod pyramid;
pub mod special;

use brisque_common::{
    FeatureVector, QualityError, Result, FEATURES_PER_SCALE, FEATURE_COUNT, SCALE_COUNT,
};
use image::DynamicImage;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use aggd::{fit_aggd, AggdMoments, AggdParams};
pub use orientation::{Orientation, OrientationFeatures};

/// What to do when a fit sees no negative or no positive coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Let NaN scales flow into the feature vector
    #[default]
    Propagate,
    /// Fail with `DegenerateStatistics`
    Reject,
}

/// Configuration for feature extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Compute scales and orientation fits on the rayon pool
    pub parallel: bool,
    /// Handling of single-sided coefficient distributions
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            degenerate_policy: DegeneratePolicy::Propagate,
        }
    }
}

/// Fits for one pyramid level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleFeatures {
    /// 1-based scale index
    pub scale: usize,
    pub width: usize,
    pub height: usize,
    /// Fit of the MSCN coefficients themselves
    pub mscn: AggdParams,
    /// Fits of the pairwise products, in [`Orientation::ALL`] order
    pub orientations: [OrientationFeatures; 4],
}

impl ScaleFeatures {
    /// The 18 features of this scale in positional order
    #[must_use]
    pub fn values(&self) -> [f64; FEATURES_PER_SCALE] {
        let mut values = [0.0; FEATURES_PER_SCALE];
        values[0] = self.mscn.gamma;
        values[1] = (self.mscn.left_variance() + self.mscn.right_variance()) / 2.0;
        for (chunk, orientation) in values[2..].chunks_exact_mut(4).zip(&self.orientations) {
            chunk.copy_from_slice(&orientation.values());
        }
        values
    }

    fn check_degenerate(&self) -> Result<()> {
        if self.mscn.is_degenerate() {
            return Err(QualityError::DegenerateStatistics(format!(
                "scale {} ({}x{}): MSCN coefficients are single-sided",
                self.scale, self.width, self.height
            )));
        }
        if let Some(o) = self.orientations.iter().find(|o| o.params.is_degenerate()) {
            return Err(QualityError::DegenerateStatistics(format!(
                "scale {} ({}x{}): {} pairwise products are single-sided",
                self.scale,
                self.width,
                self.height,
                o.orientation.name()
            )));
        }
        Ok(())
    }
}

/// Multiscale BRISQUE feature extractor
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract features from a decoded image
    ///
    /// # Errors
    /// Returns `InvalidInput`/`ImageTooSmall` for images that are empty or
    /// smaller than 14x14 (7x7 at half resolution), and
    /// `DegenerateStatistics` under [`DegeneratePolicy::Reject`].
    pub fn extract(&self, image: &DynamicImage) -> Result<FeatureVector> {
        pyramid::validate_dimensions(image.width() as usize, image.height() as usize)?;
        let gray = grayscale::normalized_gray(image)?;
        self.extract_gray(gray.view())
    }

    /// Extract features from interleaved 8-bit samples (1-4 channels)
    ///
    /// # Errors
    /// Same as [`FeatureExtractor::extract`], plus `InvalidInput` for a
    /// sample buffer that does not match the dimensions.
    pub fn extract_samples(
        &self,
        samples: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<FeatureVector> {
        pyramid::validate_dimensions(width, height)?;
        let gray = grayscale::gray_from_samples(samples, width, height, channels)?;
        self.extract_gray(gray.view())
    }

    /// Extract features from a grayscale buffer with values in [0, 1]
    ///
    /// # Errors
    /// Same as [`FeatureExtractor::extract`].
    pub fn extract_gray(&self, gray: ArrayView2<'_, f64>) -> Result<FeatureVector> {
        let scales = self.extract_scales(gray)?;

        let mut values = [0.0; FEATURE_COUNT];
        for (chunk, scale) in values.chunks_exact_mut(FEATURES_PER_SCALE).zip(&scales) {
            chunk.copy_from_slice(&scale.values());
        }
        Ok(FeatureVector::from_array(values))
    }

    /// Per-scale fits, scale 1 first
    ///
    /// # Errors
    /// Same as [`FeatureExtractor::extract`].
    pub fn extract_scales(&self, gray: ArrayView2<'_, f64>) -> Result<[ScaleFeatures; SCALE_COUNT]> {
        let (height, width) = gray.dim();
        pyramid::validate_dimensions(width, height)?;
        debug!("Extracting BRISQUE features from {}x{} image", width, height);

        let (full, half) = if self.config.parallel {
            rayon::join(|| self.scale_features(gray, 1), || self.scale_features(gray, 2))
        } else {
            (self.scale_features(gray, 1), self.scale_features(gray, 2))
        };
        let scales = [full?, half?];

        if self.config.degenerate_policy == DegeneratePolicy::Reject {
            for scale in &scales {
                scale.check_degenerate()?;
            }
        }
        Ok(scales)
    }

    fn scale_features(&self, gray: ArrayView2<'_, f64>, scale: usize) -> Result<ScaleFeatures> {
        let scaled = pyramid::scaled_copy(gray, scale)?;
        let (height, width) = scaled.dim();

        let coefficients = mscn::mscn_coefficients(scaled.view());
        let mscn = fit_aggd(coefficients.view());
        let orientations = orientation::fit_orientations(coefficients.view(), self.config.parallel);

        debug!(
            "Scale {} ({}x{}): gamma={:.3}, left={:.4}, right={:.4}",
            scale, width, height, mscn.gamma, mscn.left_scale, mscn.right_scale
        );

        Ok(ScaleFeatures {
            scale,
            width,
            height,
            mscn,
            orientations,
        })
    }
}

/// Extract features with the default configuration
///
/// # Errors
/// Same as [`FeatureExtractor::extract`].
pub fn compute_features(image: &DynamicImage) -> Result<FeatureVector> {
    FeatureExtractor::default().extract(image)
}
