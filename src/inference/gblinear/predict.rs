//! Prediction for [`LinearModel`].

use ndarray::{ArrayView1, ArrayView2};

use crate::inference::common::PredictionOutput;
use crate::repr::gblinear::LinearModel;

/// Margin prediction for linear boosters.
pub trait LinearModelPredict {
    /// Write margins for one sample into `output` (length `n_groups`).
    ///
    /// Features past the model's width are ignored.
    fn predict_row_into(&self, sample: ArrayView1<'_, f32>, output: &mut [f32]);

    /// Margins for every row, shape `(n_rows, n_groups)`.
    fn predict(&self, features: ArrayView2<'_, f32>) -> PredictionOutput;
}

impl LinearModelPredict for LinearModel {
    fn predict_row_into(&self, sample: ArrayView1<'_, f32>, output: &mut [f32]) {
        debug_assert_eq!(output.len(), self.n_groups());
        for (group, out) in output.iter_mut().enumerate() {
            *out = self.bias(group);
        }

        let weights = self.weight_matrix();
        for (value, coefs) in sample.iter().zip(weights.rows()) {
            if value.is_nan() {
                continue;
            }
            for (out, &w) in output.iter_mut().zip(coefs.iter()) {
                *out += value * w;
            }
        }
    }

    fn predict(&self, features: ArrayView2<'_, f32>) -> PredictionOutput {
        let mut output = PredictionOutput::zeros(features.nrows(), self.n_groups());
        for (row_idx, sample) in features.rows().into_iter().enumerate() {
            self.predict_row_into(sample, output.row_mut(row_idx));
        }
        output
    }
}
