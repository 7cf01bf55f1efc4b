//! Dense row-major feature matrix.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Errors building a [`FeatureMatrix`] from request rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("row {row} has {got} features, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// Dense feature matrix, one row per sample.
///
/// Storage is an `Array2<f32>` in standard (row-major) layout, so each row
/// is a contiguous slice during traversal.
///
/// # Example
///
/// ```
/// use xgb_inference::data::FeatureMatrix;
///
/// let rows = vec![vec![Some(1.0), None], vec![Some(3.0), Some(4.0)]];
/// let matrix = FeatureMatrix::from_rows(&rows).unwrap();
///
/// assert_eq!(matrix.n_rows(), 2);
/// assert_eq!(matrix.n_features(), 2);
/// assert!(matrix.row(0)[1].is_nan());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f32>,
}

impl FeatureMatrix {
    /// Build from request rows, mapping `None` to NaN.
    ///
    /// The width is taken from the first row; every other row must match it.
    /// An empty slice gives a `0 x 0` matrix.
    pub fn from_rows(rows: &[Vec<Option<f64>>]) -> Result<Self, DataError> {
        let n_features = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows.len() * n_features);

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(DataError::RaggedRows {
                    row: row_idx,
                    expected: n_features,
                    got: row.len(),
                });
            }
            flat.extend(row.iter().map(|v| v.map_or(f32::NAN, |x| x as f32)));
        }

        let values = Array2::from_shape_vec((rows.len(), n_features), flat)
            .expect("every row checked against n_features");
        Ok(Self { values })
    }

    /// Wrap an existing array.
    pub fn from_array(values: Array2<f32>) -> Self {
        Self {
            values: values.as_standard_layout().into_owned(),
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    /// Feature values for one sample.
    ///
    /// # Panics
    ///
    /// Panics if `row >= n_rows()`.
    #[inline]
    pub fn row(&self, row: usize) -> ArrayView1<'_, f32> {
        self.values.row(row)
    }

    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }
}
