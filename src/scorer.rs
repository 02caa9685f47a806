//! Feature extraction, range scaling and regression combined

use crate::config::BrisqueConfig;
use brisque_common::{FeatureVector, QualityError, Result};
use brisque_features::FeatureExtractor;
use brisque_svm::{QualityRegressor, RangeTable, SvmModel};
use image::DynamicImage;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// BRISQUE scorer
///
/// Holds the shared, read-only model state. A scorer can be used from many
/// threads at once; each call owns its own working buffers.
#[derive(Debug, Clone)]
pub struct BrisqueScorer<R: QualityRegressor = SvmModel> {
    extractor: FeatureExtractor,
    ranges: RangeTable,
    regressor: R,
}

impl<R: QualityRegressor> BrisqueScorer<R> {
    #[must_use]
    pub fn new(extractor: FeatureExtractor, ranges: RangeTable, regressor: R) -> Self {
        Self {
            extractor,
            ranges,
            regressor,
        }
    }

    #[must_use]
    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    #[must_use]
    pub fn regressor(&self) -> &R {
        &self.regressor
    }

    /// Rescale an already extracted feature vector and predict its score
    #[must_use]
    pub fn score_features(&self, features: &FeatureVector) -> f64 {
        let scaled = self.ranges.scale(features);
        self.regressor.predict(&scaled)
    }

    /// Score one image. Lower scores mean better perceived quality.
    ///
    /// # Errors
    /// Returns `InvalidInput`/`ImageTooSmall` for unusable images and
    /// `DegenerateStatistics` when the extractor rejects degenerate fits.
    pub fn score(&self, image: &DynamicImage) -> Result<f64> {
        let features = self.extractor.extract(image)?;
        let score = self.score_features(&features);
        debug!(
            "Scored {}x{} image: {:.4} ({} NaN features)",
            image.width(),
            image.height(),
            score,
            features.nan_count()
        );
        Ok(score)
    }

    /// Mean score over a sequence of frames
    ///
    /// A single frame returns its own score unchanged. Frames are scored in
    /// parallel when the extractor is parallel and summed in input order, so
    /// the result does not depend on scheduling.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty sequence, otherwise the first
    /// error raised by [`BrisqueScorer::score`].
    pub fn score_frames(&self, frames: &[DynamicImage]) -> Result<f64> {
        match frames {
            [] => Err(QualityError::InvalidInput(
                "no frames to score".to_string(),
            )),
            [frame] => self.score(frame),
            _ => {
                let scores = if self.extractor.config().parallel {
                    frames
                        .par_iter()
                        .map(|frame| self.score(frame))
                        .collect::<Result<Vec<f64>>>()?
                } else {
                    frames
                        .iter()
                        .map(|frame| self.score(frame))
                        .collect::<Result<Vec<f64>>>()?
                };
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                debug!("Mean score over {} frames: {:.4}", scores.len(), mean);
                Ok(mean)
            }
        }
    }
}

impl BrisqueScorer<SvmModel> {
    /// Build a scorer from configuration
    ///
    /// The model and ranges are loaded before any image is touched.
    ///
    /// # Errors
    /// Returns `MissingData` when no model path can be resolved and
    /// `ParseError` when the model or range file is unreadable or malformed.
    pub fn from_config(config: &BrisqueConfig) -> Result<Self> {
        let model_path = config.resolve_model_path()?;
        let range_path = config.resolve_range_path();
        let mut scorer = Self::load(&model_path, range_path.as_deref())?;
        scorer.extractor = FeatureExtractor::new(config.extractor.clone());
        Ok(scorer)
    }

    /// Load a libsvm model and an optional range file; without a range file
    /// the built-in reference ranges are used
    ///
    /// # Errors
    /// Returns `ParseError` when either file is unreadable or malformed.
    pub fn load(model_path: &Path, range_path: Option<&Path>) -> Result<Self> {
        let regressor = SvmModel::load(model_path)?;
        let ranges = match range_path {
            Some(path) => RangeTable::load(path)?,
            None => {
                info!("Using built-in BRISQUE range table");
                RangeTable::reference()
            }
        };
        Ok(Self::new(FeatureExtractor::default(), ranges, regressor))
    }
}
