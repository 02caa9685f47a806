//! Two-level scale pyramid with cubic resampling
//!
//! Scale `s` (1-based) has dimensions `floor(W / 2^(s-1)) x floor(H / 2^(s-1))`.
//! Resampling uses Keys cubic convolution (a = -0.75) with pixel-centre
//! alignment and edge clamping; at scale 1 every tap weight but the centre is
//! zero so the copy is exact. Resampled values are clamped to [0, 1] and
//! snapped to the 8-bit grid the grayscale buffer lives on.

use brisque_common::{QualityError, Result, SCALE_COUNT};
use ndarray::{Array2, ArrayView2};

/// Smallest side length the 7x7 local-contrast window accepts
pub const MIN_DIMENSION: usize = 7;

const CUBIC_A: f64 = -0.75;

/// Dimensions `(width, height)` of the working buffer at 1-based `scale`
#[must_use]
pub fn scale_dimensions(width: usize, height: usize, scale: usize) -> (usize, usize) {
    let shift = scale.saturating_sub(1);
    (width >> shift, height >> shift)
}

/// Check that every pyramid level is large enough for the MSCN window
///
/// # Errors
/// Returns `InvalidInput` for zero-area input and `ImageTooSmall` naming the
/// first scale that falls under [`MIN_DIMENSION`].
pub fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(QualityError::InvalidInput(format!(
            "image has zero area ({width}x{height})"
        )));
    }
    for scale in 1..=SCALE_COUNT {
        let (w, h) = scale_dimensions(width, height, scale);
        if w < MIN_DIMENSION || h < MIN_DIMENSION {
            return Err(QualityError::ImageTooSmall {
                width: w,
                height: h,
                scale,
                min: MIN_DIMENSION,
            });
        }
    }
    Ok(())
}

/// Produce the working buffer for 1-based `scale` from a normalized gray image
///
/// # Errors
/// Returns `ImageTooSmall` if the scaled buffer is under [`MIN_DIMENSION`].
pub fn scaled_copy(gray: ArrayView2<'_, f64>, scale: usize) -> Result<Array2<f64>> {
    let (height, width) = gray.dim();
    let (dst_width, dst_height) = scale_dimensions(width, height, scale);
    if dst_width < MIN_DIMENSION || dst_height < MIN_DIMENSION {
        return Err(QualityError::ImageTooSmall {
            width: dst_width,
            height: dst_height,
            scale,
            min: MIN_DIMENSION,
        });
    }

    let mut resized = resize_cubic(gray, dst_width, dst_height);
    renormalize(&mut resized);
    Ok(resized)
}

/// Resample `src` to `dst_width x dst_height` with separable cubic convolution
#[must_use]
pub fn resize_cubic(src: ArrayView2<'_, f64>, dst_width: usize, dst_height: usize) -> Array2<f64> {
    let (src_height, src_width) = src.dim();
    let col_taps = cubic_taps(src_width, dst_width);
    let row_taps = cubic_taps(src_height, dst_height);

    // Horizontal pass: src_height x dst_width
    let mut tmp = Array2::<f64>::zeros((src_height, dst_width));
    for (src_row, mut tmp_row) in src.rows().into_iter().zip(tmp.rows_mut()) {
        for (out, taps) in tmp_row.iter_mut().zip(&col_taps) {
            *out = taps.apply(|i| src_row[i]);
        }
    }

    // Vertical pass
    let mut dst = Array2::<f64>::zeros((dst_height, dst_width));
    for (y, taps) in row_taps.iter().enumerate() {
        for x in 0..dst_width {
            dst[[y, x]] = taps.apply(|i| tmp[[i, x]]);
        }
    }
    dst
}

/// Clamp to [0, 1] and snap to multiples of 1/255
pub fn renormalize(buffer: &mut Array2<f64>) {
    buffer.mapv_inplace(|v| (v.clamp(0.0, 1.0) * 255.0).round() / 255.0);
}

/// Four source indices and weights contributing to one output sample
#[derive(Debug, Clone, Copy)]
struct CubicTaps {
    index: [usize; 4],
    weight: [f64; 4],
}

impl CubicTaps {
    #[inline]
    fn apply(&self, sample: impl Fn(usize) -> f64) -> f64 {
        let mut acc = 0.0;
        for k in 0..4 {
            acc += self.weight[k] * sample(self.index[k]);
        }
        acc
    }
}

fn cubic_taps(src_len: usize, dst_len: usize) -> Vec<CubicTaps> {
    let ratio = src_len as f64 / dst_len as f64;
    let last = src_len as isize - 1;

    (0..dst_len)
        .map(|d| {
            let pos = (d as f64 + 0.5) * ratio - 0.5;
            let base = pos.floor();
            let weight = cubic_weights(pos - base);
            let base = base as isize;
            let mut index = [0usize; 4];
            for (k, slot) in index.iter_mut().enumerate() {
                *slot = (base - 1 + k as isize).clamp(0, last) as usize;
            }
            CubicTaps { index, weight }
        })
        .collect()
}

/// Keys cubic weights for fractional offset `t` in [0, 1)
fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CUBIC_A;
    let w0 = ((a * (t + 1.0) - 5.0 * a) * (t + 1.0) + 8.0 * a) * (t + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let u = 1.0 - t;
    let w2 = ((a + 2.0) * u - (a + 3.0)) * u * u + 1.0;
    let w3 = 1.0 - w0 - w1 - w2;
    [w0, w1, w2, w3]
}
