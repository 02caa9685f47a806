//! BRISQUE no-reference image quality scoring
//!
//! BRISQUE (Blind/Referenceless Image Spatial Quality Evaluator) predicts the
//! perceived quality of an image without a pristine reference. Natural-scene
//! statistics are measured on the image at two scales, rescaled by a range
//! table and mapped to a score by a trained support vector regression model.
//! Lower scores indicate better quality.
//!
//! # Crates
//! - [`brisque_common`]: error taxonomy and the 36-element [`FeatureVector`]
//! - [`brisque_features`]: grayscale conversion, scale pyramid, MSCN
//!   transform and AGGD fitting
//! - [`brisque_svm`]: range tables and libsvm regression models
//!
//! # Errors
//! Every fallible call returns [`QualityError`]. Images that cannot be
//! scored (empty, or under 7x7 at half resolution) are reported as either
//! `InvalidInput` or `ImageTooSmall`; use [`QualityError::is_invalid_input`]
//! to test for both.
//!
//! # Example
//! ```no_run
//! use brisque::{BrisqueConfig, BrisqueScorer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BrisqueConfig::from_yaml("brisque.yaml")?;
//! let scorer = BrisqueScorer::from_config(&config)?;
//!
//! let frames = vec![brisque::open_image("frame1.png")?, brisque::open_image("frame2.png")?];
//! println!("Single: {:.3}", scorer.score(&frames[0])?);
//! println!("Mean:   {:.3}", scorer.score_frames(&frames)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod image_io;
pub mod scorer;

pub use brisque_common::{feature_label, FeatureVector, QualityError, Result, FEATURE_COUNT};
pub use brisque_features::{
    compute_features, DegeneratePolicy, ExtractorConfig, FeatureExtractor, ScaleFeatures,
};
pub use brisque_svm::{ModelError, QualityRegressor, RangeTable, SvmModel};
pub use config::BrisqueConfig;
pub use image_io::open_image;
pub use scorer::BrisqueScorer;
