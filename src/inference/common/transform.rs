//! Margin-to-output transforms.
//!
//! XGBoost's `predict` returns transformed values unless raw margins are
//! requested. Which transform applies is decided by the objective; see
//! `compat::xgboost::Objective::output_transform`.

use super::PredictionOutput;

/// How raw margins become final predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputTransform {
    /// Output = margin (squared error, quantile, ranking, raw logits).
    #[default]
    Identity,
    /// Logistic sigmoid, per value.
    Sigmoid,
    /// `exp(margin)`, per value (poisson, gamma, tweedie, survival).
    Exp,
    /// Row-wise softmax over the output groups.
    Softmax,
    /// Row-wise index of the largest margin; one output per row.
    ArgMax,
    /// `1.0` when the margin is positive, else `0.0`.
    Hinge,
}

impl OutputTransform {
    /// Number of output columns produced for `n_groups` margins per row.
    #[inline]
    pub fn n_outputs(self, n_groups: usize) -> usize {
        match self {
            OutputTransform::ArgMax => 1,
            _ => n_groups,
        }
    }

    /// Transform a margin buffer.
    ///
    /// NaN and infinite margins propagate without panicking.
    pub fn apply(self, mut margins: PredictionOutput) -> PredictionOutput {
        match self {
            OutputTransform::Identity => {}
            OutputTransform::Sigmoid => margins.as_mut_slice().iter_mut().for_each(|x| *x = sigmoid(*x)),
            OutputTransform::Exp => margins.as_mut_slice().iter_mut().for_each(|x| *x = x.exp()),
            OutputTransform::Hinge => margins
                .as_mut_slice()
                .iter_mut()
                .for_each(|x| *x = if *x > 0.0 { 1.0 } else { 0.0 }),
            OutputTransform::Softmax => {
                for row in 0..margins.n_rows() {
                    softmax_inplace(margins.row_mut(row));
                }
            }
            OutputTransform::ArgMax => {
                let classes: Vec<f32> = margins.rows().map(|row| argmax(row) as f32).collect();
                let n_rows = classes.len();
                return PredictionOutput::new(classes, n_rows, 1);
            }
        }
        margins
    }
}

/// Sigmoid with the input clamped to keep `exp` finite.
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-88.0, 88.0);
    1.0 / (1.0 + (-clamped).exp())
}

/// Softmax with the row max subtracted first.
fn softmax_inplace(row: &mut [f32]) {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    if sum > 0.0 {
        for x in row.iter_mut() {
            *x /= sum;
        }
    }
}

/// First index holding the maximum; NaN never wins.
fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, &x) in row.iter().enumerate() {
        if x > row[best] || row[best].is_nan() {
            best = i;
        }
    }
    best
}
