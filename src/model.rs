//! Inference-ready regression model.
//!
//! [`Regressor`] bundles a converted booster with the output transform of its
//! objective, and checks inputs before predicting.
//!
//! ```ignore
//! use xgb_inference::data::FeatureMatrix;
//! use xgb_inference::model::Regressor;
//!
//! let model = Regressor::load("ml/model.json")?;
//! let features = FeatureMatrix::from_rows(&[vec![Some(1.0), None, Some(3.0)]])?;
//! let predictions = model.predict(&features)?;
//! ```

use std::path::Path;

use tracing::debug;

use crate::compat::xgboost::{Booster, Objective, XgbModel};
use crate::data::FeatureMatrix;
use crate::error::PredictError;
use crate::inference::{LinearModelPredict, OutputTransform, PredictionOutput, Predictor};

/// A loaded model ready for prediction.
#[derive(Debug, Clone)]
pub struct Regressor {
    booster: Booster,
    transform: OutputTransform,
    n_features: usize,
    objective: Objective,
}

impl Regressor {
    /// Read, parse and convert an XGBoost JSON model file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let model = XgbModel::from_file(path)?;
        let regressor = Self::from_xgb(&model)?;
        debug!(
            path = %path.display(),
            objective = %regressor.objective,
            n_features = regressor.n_features,
            n_groups = regressor.n_groups(),
            "loaded model"
        );
        Ok(regressor)
    }

    /// Convert an already-parsed model.
    pub fn from_xgb(model: &XgbModel) -> Result<Self, PredictError> {
        let booster = model.to_booster()?;
        let n_features = match &booster {
            Booster::Linear(linear) => linear.n_features(),
            _ => model.num_feature(),
        };
        Ok(Self {
            booster,
            transform: model.objective().output_transform(),
            n_features,
            objective: model.objective(),
        })
    }

    /// Expected number of feature columns; 0 when the model does not say.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn n_groups(&self) -> usize {
        self.booster.n_groups()
    }

    /// Number of output columns per row.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.transform.n_outputs(self.n_groups())
    }

    #[inline]
    pub fn objective(&self) -> Objective {
        self.objective
    }

    #[inline]
    pub fn booster(&self) -> &Booster {
        &self.booster
    }

    /// Raw margins, shape `(n_rows, n_groups)`.
    pub fn predict_margin(&self, features: &FeatureMatrix) -> Result<PredictionOutput, PredictError> {
        self.check_input(features)?;
        let view = features.view();
        let margins = match &self.booster {
            Booster::Tree(forest) => Predictor::new(forest).predict(view),
            Booster::Dart { forest, weights } => Predictor::new(forest).with_tree_weights(weights).predict(view),
            Booster::Linear(linear) => linear.predict(view),
        };
        Ok(margins)
    }

    /// Final predictions, shape `(n_rows, n_outputs)`.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<PredictionOutput, PredictError> {
        let margins = self.predict_margin(features)?;
        debug!(
            n_rows = margins.n_rows(),
            transform = ?self.transform,
            "computed margins"
        );
        Ok(self.transform.apply(margins))
    }

    fn check_input(&self, features: &FeatureMatrix) -> Result<(), PredictError> {
        if features.is_empty() {
            return Err(PredictError::EmptyFeatures);
        }
        if self.n_features > 0 && features.n_features() != self.n_features {
            return Err(PredictError::FeatureMismatch {
                expected: self.n_features,
                got: features.n_features(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use serde_json::{Value, json};

    fn stump(feature: i32, threshold: f32, left: f32, right: f32) -> Value {
        json!({
            "tree_param": {"num_nodes": "3", "size_leaf_vector": "1", "num_feature": "2"},
            "base_weights": [0.0, left, right],
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1],
            "split_indices": [feature, 0, 0],
            "split_conditions": [threshold, left, right],
            "default_left": [0, 0, 0]
        })
    }

    fn regressor(objective: &str, base_score: &str, num_class: &str, trees: Vec<Value>, tree_info: Vec<i32>) -> Regressor {
        let model = XgbModel::from_value(&json!({
            "learner": {
                "gradient_booster": {"name": "gbtree", "model": {"trees": trees, "tree_info": tree_info}},
                "objective": {"name": objective},
                "learner_model_param": {"base_score": base_score, "num_class": num_class, "num_feature": "2"}
            }
        }))
        .unwrap();
        Regressor::from_xgb(&model).unwrap()
    }

    fn rows(rows: &[&[f64]]) -> FeatureMatrix {
        let rows: Vec<Vec<Option<f64>>> = rows.iter().map(|r| r.iter().copied().map(Some).collect()).collect();
        FeatureMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn regression_predictions() {
        let model = regressor("reg:squarederror", "0.5", "0", vec![stump(0, 1.0, -0.5, 0.5)], vec![0]);
        let out = model.predict(&rows(&[&[0.0, 0.0], &[2.0, 0.0]])).unwrap();

        assert_eq!(out.shape(), (2, 1));
        assert_eq!(out.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn logistic_applies_sigmoid() {
        let model = regressor("binary:logistic", "0.5", "0", vec![stump(0, 1.0, -2.0, 2.0)], vec![0]);
        let out = model.predict(&rows(&[&[0.0, 0.0]])).unwrap();
        let margin = model.predict_margin(&rows(&[&[0.0, 0.0]])).unwrap();

        assert_abs_diff_eq!(margin.as_slice()[0], -2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.as_slice()[0], 1.0 / (1.0 + 2.0f32.exp()), epsilon = 1e-6);
    }

    #[test]
    fn softmax_multiclass_rows_sum_to_one() {
        let trees = vec![stump(0, 1.0, 1.0, 0.0), stump(0, 1.0, 0.0, 1.0), stump(1, 1.0, 0.5, 0.5)];
        let model = regressor("multi:softprob", "0.5", "3", trees, vec![0, 1, 2]);
        let out = model.predict(&rows(&[&[0.0, 0.0]])).unwrap();

        assert_eq!(model.n_outputs(), 3);
        assert_abs_diff_eq!(out.row(0).iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert!(out.row(0)[0] > out.row(0)[1]);
    }

    #[test]
    fn softmax_class_index() {
        let trees = vec![stump(0, 1.0, 1.0, 0.0), stump(0, 1.0, 0.0, 1.0)];
        let model = regressor("multi:softmax", "0.5", "2", trees, vec![0, 1]);
        let out = model.predict(&rows(&[&[0.0, 0.0], &[5.0, 0.0]])).unwrap();

        assert_eq!(model.n_outputs(), 1);
        assert_eq!(out.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn empty_input_is_rejected() {
        let model = regressor("reg:squarederror", "0.5", "0", vec![stump(0, 1.0, -0.5, 0.5)], vec![0]);
        let err = model.predict(&FeatureMatrix::from_rows(&[]).unwrap()).unwrap_err();
        assert!(matches!(err, PredictError::EmptyFeatures));
    }

    #[test]
    fn wrong_width_is_rejected() {
        let model = regressor("reg:squarederror", "0.5", "0", vec![stump(0, 1.0, -0.5, 0.5)], vec![0]);
        let err = model.predict(&rows(&[&[1.0, 2.0, 3.0]])).unwrap_err();
        assert_eq!(err.to_string(), "feature shape mismatch, expected: 2, got 3");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Regressor::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PredictError::Io { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Regressor::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse model:"));
    }
}
