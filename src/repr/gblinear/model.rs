//! Linear model data structure.

use ndarray::{Array2, ArrayView2, s};

/// Linear booster weights plus bias.
///
/// ```
/// use xgb_inference::repr::gblinear::LinearModel;
/// use ndarray::array;
///
/// // y = 0.5 * x0 + 0.3 * x1 + 0.1
/// let model = LinearModel::from_array(array![[0.5], [0.3], [0.1]]);
///
/// assert_eq!(model.n_features(), 2);
/// assert_eq!(model.weight(1, 0), 0.3);
/// assert_eq!(model.bias(0), 0.1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Array2<f32>,
}

impl LinearModel {
    /// Wrap a `[n_features + 1, n_groups]` weight matrix.
    ///
    /// # Panics
    ///
    /// Panics if the array has no rows (the bias row is mandatory).
    pub fn from_array(weights: Array2<f32>) -> Self {
        assert!(weights.nrows() >= 1, "weights must include the bias row");
        Self { weights }
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.weights.nrows() - 1
    }

    #[inline]
    pub fn n_groups(&self) -> usize {
        self.weights.ncols()
    }

    #[inline]
    pub fn weight(&self, feature: usize, group: usize) -> f32 {
        self.weights[[feature, group]]
    }

    #[inline]
    pub fn bias(&self, group: usize) -> f32 {
        self.weights[[self.n_features(), group]]
    }

    /// Coefficients without the bias row, shape `[n_features, n_groups]`.
    #[inline]
    pub fn weight_matrix(&self) -> ArrayView2<'_, f32> {
        self.weights.slice(s![..self.n_features(), ..])
    }
}
