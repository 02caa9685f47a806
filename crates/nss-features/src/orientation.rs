//! Pairwise products of neighbouring MSCN coefficients

use crate::aggd::{fit_aggd, AggdParams};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Neighbour direction used to form a pairwise product field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
    MainDiagonal,
    AntiDiagonal,
}

impl Orientation {
    /// Feature order
    pub const ALL: [Orientation; 4] = [
        Orientation::Horizontal,
        Orientation::Vertical,
        Orientation::MainDiagonal,
        Orientation::AntiDiagonal,
    ];

    /// `(row, col)` offset of the neighbour
    #[must_use]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
            Orientation::MainDiagonal => (1, 1),
            Orientation::AntiDiagonal => (-1, 1),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
            Orientation::MainDiagonal => "main_diagonal",
            Orientation::AntiDiagonal => "anti_diagonal",
        }
    }
}

/// Product of each coefficient with its neighbour along `orientation`
///
/// The output has the input's shape; cells whose neighbour lies outside the
/// field are 0.
#[must_use]
pub fn pairwise_product(field: ArrayView2<'_, f64>, orientation: Orientation) -> Array2<f64> {
    let (rows, cols) = field.dim();
    let (dr, dc) = orientation.offset();

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let nr = r as isize + dr;
        let nc = c as isize + dc;
        if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
            0.0
        } else {
            field[[r, c]] * field[[nr as usize, nc as usize]]
        }
    })
}

/// AGGD fit of one pairwise product field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationFeatures {
    pub orientation: Orientation,
    pub params: AggdParams,
    /// Distribution mean derived from `params`
    pub mean: f64,
}

impl OrientationFeatures {
    #[must_use]
    pub fn from_params(orientation: Orientation, params: AggdParams) -> Self {
        Self {
            orientation,
            params,
            mean: params.mean(),
        }
    }

    /// `[gamma, mean, left variance, right variance]`
    #[must_use]
    pub fn values(&self) -> [f64; 4] {
        [
            self.params.gamma,
            self.mean,
            self.params.left_variance(),
            self.params.right_variance(),
        ]
    }
}

/// Build and fit the product field for one orientation
#[must_use]
pub fn fit_orientation(field: ArrayView2<'_, f64>, orientation: Orientation) -> OrientationFeatures {
    let product = pairwise_product(field, orientation);
    OrientationFeatures::from_params(orientation, fit_aggd(product.view()))
}

/// Fit all four orientations, in [`Orientation::ALL`] order
///
/// With `parallel` the fits run on the rayon pool; each fit still sums its
/// own field sequentially, so results are identical either way.
#[must_use]
pub fn fit_orientations(field: ArrayView2<'_, f64>, parallel: bool) -> [OrientationFeatures; 4] {
    if !parallel {
        return Orientation::ALL.map(|o| fit_orientation(field, o));
    }

    let [h, v, d1, d2] = Orientation::ALL;
    let ((horizontal, vertical), (main_diagonal, anti_diagonal)) = rayon::join(
        || rayon::join(|| fit_orientation(field, h), || fit_orientation(field, v)),
        || rayon::join(|| fit_orientation(field, d1), || fit_orientation(field, d2)),
    );
    [horizontal, vertical, main_diagonal, anti_diagonal]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_offsets() {
        assert_eq!(Orientation::Horizontal.offset(), (0, 1));
        assert_eq!(Orientation::Vertical.offset(), (1, 0));
        assert_eq!(Orientation::MainDiagonal.offset(), (1, 1));
        assert_eq!(Orientation::AntiDiagonal.offset(), (-1, 1));
    }

    #[test]
    fn test_horizontal_product_zero_fills_last_column() {
        let field = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let product = pairwise_product(field.view(), Orientation::Horizontal);
        assert_eq!(product, array![[2.0, 6.0, 0.0], [20.0, 30.0, 0.0]]);
    }

    #[test]
    fn test_vertical_product_zero_fills_last_row() {
        let field = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let product = pairwise_product(field.view(), Orientation::Vertical);
        assert_eq!(product, array![[4.0, 10.0, 18.0], [0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_diagonal_products() {
        let field = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];

        let main = pairwise_product(field.view(), Orientation::MainDiagonal);
        assert_eq!(
            main,
            array![[5.0, 12.0, 0.0], [32.0, 45.0, 0.0], [0.0, 0.0, 0.0]]
        );

        let anti = pairwise_product(field.view(), Orientation::AntiDiagonal);
        assert_eq!(
            anti,
            array![[0.0, 0.0, 0.0], [8.0, 15.0, 0.0], [35.0, 48.0, 0.0]]
        );
    }

    #[test]
    fn test_product_keeps_shape() {
        let field = Array2::from_shape_fn((9, 13), |(r, c)| (r as f64 - c as f64) * 0.1);
        for orientation in Orientation::ALL {
            assert_eq!(pairwise_product(field.view(), orientation).dim(), (9, 13));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let field = Array2::from_shape_fn((16, 16), |(r, c)| {
            ((r * 7 + c * 3) % 11) as f64 / 5.0 - 1.0
        });
        let sequential = fit_orientations(field.view(), false);
        let parallel = fit_orientations(field.view(), true);

        for (s, p) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(s.orientation, p.orientation);
            for (a, b) in s.values().iter().zip(p.values().iter()) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
        let order: Vec<_> = parallel.iter().map(|f| f.orientation).collect();
        assert_eq!(order, Orientation::ALL.to_vec());
    }

    #[test]
    fn test_values_layout() {
        let features = OrientationFeatures::from_params(
            Orientation::Vertical,
            AggdParams {
                gamma: 0.8,
                left_scale: 0.5,
                right_scale: 0.25,
            },
        );
        let values = features.values();
        assert_eq!(values[0], 0.8);
        assert!(values[1] < 0.0);
        assert_eq!(values[2], 0.25);
        assert_eq!(values[3], 0.0625);
    }
}
