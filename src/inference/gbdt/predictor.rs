//! Forest predictor.

use ndarray::{ArrayView1, ArrayView2};

use crate::inference::common::PredictionOutput;
use crate::repr::gbdt::Forest;

/// Computes raw margins for a [`Forest`].
///
/// ```
/// use xgb_inference::inference::Predictor;
/// use xgb_inference::repr::gbdt::{Forest, TreeBuilder};
/// use ndarray::array;
///
/// let mut b = TreeBuilder::with_n_nodes(3);
/// b.set_numeric_split(0, 0, 0.5, true, 1, 2);
/// b.set_leaf(1, 1.0);
/// b.set_leaf(2, 2.0);
///
/// let mut forest = Forest::for_regression().with_base_score(vec![0.5]);
/// forest.push_tree(b.build(), 0);
///
/// let output = Predictor::new(&forest).predict(array![[0.3], [0.7]].view());
/// assert_eq!(output.as_slice(), &[1.5, 2.5]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'f> {
    forest: &'f Forest,
    tree_weights: Option<&'f [f32]>,
}

impl<'f> Predictor<'f> {
    pub fn new(forest: &'f Forest) -> Self {
        Self {
            forest,
            tree_weights: None,
        }
    }

    /// Scale each tree's leaf output by a per-tree weight (DART).
    ///
    /// `weights` must hold one entry per tree.
    pub fn with_tree_weights(mut self, weights: &'f [f32]) -> Self {
        debug_assert_eq!(weights.len(), self.forest.n_trees());
        self.tree_weights = Some(weights);
        self
    }

    #[inline]
    pub fn n_groups(&self) -> usize {
        self.forest.n_groups() as usize
    }

    #[inline]
    pub fn forest(&self) -> &Forest {
        self.forest
    }

    /// Write margins for one sample into `output` (length `n_groups`).
    pub fn predict_row_into(&self, sample: ArrayView1<'_, f32>, output: &mut [f32]) {
        debug_assert_eq!(output.len(), self.n_groups());
        output.copy_from_slice(self.forest.base_score());

        for (tree_idx, (tree, group)) in self.forest.trees_with_groups().enumerate() {
            let weight = self.tree_weights.map_or(1.0, |w| w[tree_idx]);
            output[group as usize] += weight * tree.predict_row(sample);
        }
    }

    /// Margins for every row of `features`, shape `(n_rows, n_groups)`.
    pub fn predict(&self, features: ArrayView2<'_, f32>) -> PredictionOutput {
        let mut output = PredictionOutput::zeros(features.nrows(), self.n_groups());
        for (row_idx, sample) in features.rows().into_iter().enumerate() {
            self.predict_row_into(sample, output.row_mut(row_idx));
        }
        output
    }
}
