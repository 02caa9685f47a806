//! Asymmetric generalized Gaussian distribution (AGGD) fitting
//!
//! The fit is moment-matching: the one-sided scales come straight from the
//! negative and positive second moments, and the shape parameter is found
//! by scanning `0.2, 0.201, ...` (accumulated in `f32`) until the distance to
//! the normalized moment ratio stops decreasing. The scan returns the first
//! local minimum, not the global one.
//!
//! Fields with no negative or no positive coefficients divide zero by zero:
//! the scales become NaN and the shape scan, seeing only NaN distances, runs
//! to the last candidate below 10. Nothing here special-cases that; callers
//! decide through [`crate::DegeneratePolicy`].

use crate::special::gamma;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// First shape candidate
pub const SHAPE_SEARCH_START: f32 = 0.2;

/// Shape candidate increment
pub const SHAPE_SEARCH_STEP: f32 = 0.001;

/// Exclusive upper bound of the shape scan
pub const SHAPE_SEARCH_END: f32 = 10.0;

const INITIAL_DIFF: f64 = 1e10;

/// Sufficient statistics of a coefficient field, accumulated in row-major order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggdMoments {
    pub neg_count: u64,
    pub pos_count: u64,
    pub neg_sq_sum: f64,
    pub pos_sq_sum: f64,
    /// Sum of absolute values over nonzero coefficients
    pub abs_sum: f64,
    /// Every cell, zeros included
    pub total_count: u64,
}

impl AggdMoments {
    #[must_use]
    pub fn from_field(field: ArrayView2<'_, f64>) -> Self {
        let mut m = Self {
            total_count: field.len() as u64,
            ..Self::default()
        };
        for &v in field.iter() {
            if v > 0.0 {
                m.pos_count += 1;
                m.pos_sq_sum += v * v;
                m.abs_sum += v;
            } else if v < 0.0 {
                m.neg_count += 1;
                m.neg_sq_sum += v * v;
                m.abs_sum -= v;
            }
        }
        m
    }

    /// True when one side of the distribution is empty
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.neg_count == 0 || self.pos_count == 0
    }

    /// NaN when there are no negative coefficients
    #[must_use]
    pub fn left_scale(&self) -> f64 {
        (self.neg_sq_sum / self.neg_count as f64).sqrt()
    }

    /// NaN when there are no positive coefficients
    #[must_use]
    pub fn right_scale(&self) -> f64 {
        (self.pos_sq_sum / self.pos_count as f64).sqrt()
    }

    #[must_use]
    pub fn gamma_hat(&self) -> f64 {
        self.left_scale() / self.right_scale()
    }

    #[must_use]
    pub fn r_hat(&self) -> f64 {
        let total = self.total_count as f64;
        let mean_abs = self.abs_sum / total;
        (mean_abs * mean_abs) / ((self.neg_sq_sum + self.pos_sq_sum) / total)
    }

    /// `r_hat` corrected for the asymmetry `gamma_hat`
    #[must_use]
    pub fn r_hat_norm(&self) -> f64 {
        let g = self.gamma_hat();
        let g2 = g * g;
        self.r_hat() * (g2 * g + 1.0) * (g + 1.0) / ((g2 + 1.0) * (g2 + 1.0))
    }
}

/// Fitted AGGD parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggdParams {
    /// Shape parameter
    pub gamma: f64,
    /// Spread of the negative side
    pub left_scale: f64,
    /// Spread of the positive side
    pub right_scale: f64,
}

impl AggdParams {
    #[must_use]
    pub fn left_variance(&self) -> f64 {
        self.left_scale * self.left_scale
    }

    #[must_use]
    pub fn right_variance(&self) -> f64 {
        self.right_scale * self.right_scale
    }

    /// Mean of the fitted distribution:
    /// `(r - l) * Γ(2/γ)/Γ(1/γ) * sqrt(Γ(1/γ)) / sqrt(Γ(3/γ))`
    #[must_use]
    pub fn mean(&self) -> f64 {
        let g1 = gamma(1.0 / self.gamma);
        let g2 = gamma(2.0 / self.gamma);
        let g3 = gamma(3.0 / self.gamma);
        let constant = g1.sqrt() / g3.sqrt();
        (self.right_scale - self.left_scale) * (g2 / g1) * constant
    }

    /// True when either scale came out of a 0/0 division
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.left_scale.is_nan() || self.right_scale.is_nan()
    }
}

/// `Γ(2/γ)² / (Γ(1/γ) Γ(3/γ))`, the moment ratio of a generalized Gaussian
#[must_use]
pub fn moment_ratio(shape: f64) -> f64 {
    let g2 = gamma(2.0 / shape);
    g2 * g2 / (gamma(1.0 / shape) * gamma(3.0 / shape))
}

/// Scan for the shape whose moment ratio is closest to `r_hat_norm`,
/// stopping at the first increase in distance
#[must_use]
pub fn estimate_shape(r_hat_norm: f64) -> f64 {
    let mut best = 0.0f32;
    let mut prev_diff = INITIAL_DIFF;
    let mut candidate = SHAPE_SEARCH_START;

    while candidate < SHAPE_SEARCH_END {
        let diff = (moment_ratio(f64::from(candidate)) - r_hat_norm).abs();
        if diff > prev_diff {
            break;
        }
        prev_diff = diff;
        best = candidate;
        candidate += SHAPE_SEARCH_STEP;
    }
    f64::from(best)
}

/// Fit an AGGD to precomputed moments
#[must_use]
pub fn fit_moments(moments: &AggdMoments) -> AggdParams {
    AggdParams {
        gamma: estimate_shape(moments.r_hat_norm()),
        left_scale: moments.left_scale(),
        right_scale: moments.right_scale(),
    }
}

/// Fit an AGGD to a coefficient field
#[must_use]
pub fn fit_aggd(field: ArrayView2<'_, f64>) -> AggdParams {
    fit_moments(&AggdMoments::from_field(field))
}
