//! Mean-subtracted contrast-normalized (MSCN) coefficients

use ndarray::{Array2, ArrayView2, Zip};

/// Side of the square Gaussian window
pub const WINDOW_SIZE: usize = 7;

/// Standard deviation of the Gaussian window
pub const WINDOW_SIGMA: f64 = 1.166;

/// Added to the local standard deviation before dividing
pub const SIGMA_OFFSET: f64 = 1.0 / 255.0;

/// Normalized 1-D Gaussian taps for an odd `size`
#[must_use]
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    let center = (size as f64 - 1.0) * 0.5;
    let scale = -0.5 / (sigma * sigma);

    let mut taps: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();

    let inv_sum = 1.0 / taps.iter().sum::<f64>();
    for t in &mut taps {
        *t *= inv_sum;
    }
    taps
}

/// Reflect an out-of-range index without repeating the edge sample
/// (`-1 -> 1`, `len -> len - 2`)
#[inline]
fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Gaussian-weighted local statistics measured relative to each pixel
///
/// For every pixel `c` with neighbours `I_k` and weights `w_k`, returns
/// `(mean - c, variance)` where `mean - c = sum w_k (I_k - c)` and
/// `variance = sum w_k (I_k - c)^2 - (mean - c)^2`. `kernel` holds the 1-D
/// taps of a separable window and must sum to one. Working in differences
/// from the centre makes both terms exactly zero on a flat neighbourhood.
#[must_use]
pub fn centred_moments(image: ArrayView2<'_, f64>, kernel: &[f64]) -> (Array2<f64>, Array2<f64>) {
    let (height, width) = image.dim();
    let radius = (kernel.len() / 2) as isize;

    let row_index = reflected_indices(height, kernel.len(), radius);
    let col_index = reflected_indices(width, kernel.len(), radius);

    let mut offset = Array2::<f64>::zeros((height, width));
    let mut variance = Array2::<f64>::zeros((height, width));
    for y in 0..height {
        let rows = &row_index[y * kernel.len()..(y + 1) * kernel.len()];
        for x in 0..width {
            let cols = &col_index[x * kernel.len()..(x + 1) * kernel.len()];
            let centre = image[[y, x]];

            let mut first = 0.0;
            let mut second = 0.0;
            for (&sy, &wy) in rows.iter().zip(kernel) {
                for (&sx, &wx) in cols.iter().zip(kernel) {
                    let diff = image[[sy, sx]] - centre;
                    let w = wy * wx;
                    first += w * diff;
                    second += w * diff * diff;
                }
            }
            offset[[y, x]] = first;
            variance[[y, x]] = second - first * first;
        }
    }
    (offset, variance)
}

/// Reflected source index of every window tap, `len * taps` entries
fn reflected_indices(len: usize, taps: usize, radius: isize) -> Vec<usize> {
    (0..len)
        .flat_map(|i| {
            (0..taps).map(move |k| reflect_101(i as isize + k as isize - radius, len))
        })
        .collect()
}

/// Compute the MSCN field of a normalized grayscale buffer
///
/// `(I - mu) / (sigma + 1/255)` where `mu` and `sigma` are the local
/// Gaussian-weighted mean and standard deviation. Negative variance from
/// rounding is floored at zero. A constant neighbourhood yields exactly 0.
/// The caller guarantees the buffer is at least 7x7.
#[must_use]
pub fn mscn_coefficients(image: ArrayView2<'_, f64>) -> Array2<f64> {
    let kernel = gaussian_kernel(WINDOW_SIZE, WINDOW_SIGMA);
    let (offset, variance) = centred_moments(image, &kernel);

    Zip::from(&offset)
        .and(&variance)
        .map_collect(|&offset, &variance| {
            let sigma = variance.max(0.0).sqrt() + SIGMA_OFFSET;
            -offset / sigma
        })
}
