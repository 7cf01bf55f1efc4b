//! Prediction output buffer.

/// Predictions in row-major layout with shape metadata.
///
/// ```text
/// data[row * n_groups + group] = prediction for (row, group)
/// ```
///
/// ```
/// use xgb_inference::inference::PredictionOutput;
///
/// let output = PredictionOutput::new(vec![0.1, -0.2, 0.3, -0.4], 2, 2);
/// assert_eq!(output.row(1), &[0.3, -0.4]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutput {
    data: Vec<f32>,
    n_rows: usize,
    n_groups: usize,
}

impl PredictionOutput {
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_groups`.
    pub fn new(data: Vec<f32>, n_rows: usize, n_groups: usize) -> Self {
        assert_eq!(
            data.len(),
            n_rows * n_groups,
            "data length {} does not match shape {}x{}",
            data.len(),
            n_rows,
            n_groups
        );
        Self {
            data,
            n_rows,
            n_groups,
        }
    }

    pub fn zeros(n_rows: usize, n_groups: usize) -> Self {
        Self {
            data: vec![0.0; n_rows * n_groups],
            n_rows,
            n_groups,
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_groups)
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.n_groups;
        &self.data[start..start + self.n_groups]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        let start = row * self.n_groups;
        &mut self.data[start..start + self.n_groups]
    }

    /// Iterate over rows. Yields nothing when there are no groups.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.n_groups.max(1)).take(self.n_rows)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
