//! Prediction backend capability.
//!
//! The backend is acquired once at startup. When the crate is built without
//! the `xgboost` feature, [`acquire_backend`] returns `None` and the binary
//! reports the backend as unavailable.

use std::path::Path;

use crate::data::FeatureMatrix;
use crate::error::PredictError;
use crate::invocation::Prediction;

/// Loads a model artifact and predicts a feature batch.
pub trait PredictBackend {
    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Load the model at `model_path` and predict every row of `features`.
    fn predict(&self, model_path: &Path, features: &FeatureMatrix) -> Result<Prediction, PredictError>;
}

/// Native XGBoost JSON backend.
#[cfg(feature = "xgboost")]
#[derive(Debug, Default, Clone, Copy)]
pub struct XgbBackend;

#[cfg(feature = "xgboost")]
impl PredictBackend for XgbBackend {
    fn name(&self) -> &'static str {
        "xgboost"
    }

    fn predict(&self, model_path: &Path, features: &FeatureMatrix) -> Result<Prediction, PredictError> {
        let model = crate::model::Regressor::load(model_path)?;
        let output = model.predict(features)?;
        Ok(Prediction::from_values(output.as_slice(), output.n_groups()))
    }
}

/// The compiled-in backend, if any.
pub fn acquire_backend() -> Option<Box<dyn PredictBackend>> {
    #[cfg(feature = "xgboost")]
    {
        Some(Box::new(XgbBackend))
    }
    #[cfg(not(feature = "xgboost"))]
    {
        None
    }
}
