//! Prediction for tree ensembles and linear boosters.
//!
//! - [`common`]: [`PredictionOutput`] and the objective output transforms
//! - [`gbdt`]: forest margins (gbtree and dart)
//! - [`gblinear`]: linear booster margins
//!
//! Predictors produce raw margins; [`OutputTransform`] turns them into the
//! values XGBoost's `predict` would return.

pub mod common;
pub mod gbdt;
pub mod gblinear;

pub use common::{OutputTransform, PredictionOutput};
pub use gbdt::Predictor;
pub use gblinear::LinearModelPredict;
