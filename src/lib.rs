//! xgb-inference: one-shot prediction with XGBoost JSON models.
//!
//! The binary reads a JSON request from its single argument, loads the model
//! at `XGB_MODEL_PATH` (default `ml/model.json`), predicts every feature row
//! and prints one JSON line. The library exposes the pieces:
//!
//! - [`invocation`]: request parsing, response formatting, the handler
//! - [`backend`]: the prediction capability acquired at startup
//! - [`config`]: model path resolution
//! - [`data`]: the dense feature matrix
//! - [`compat`], [`repr`], [`inference`], [`model`]: the native XGBoost
//!   reader and predictor (feature `xgboost`)

pub mod backend;
pub mod config;
pub mod data;
pub mod error;
pub mod invocation;

#[cfg(feature = "xgboost")]
pub mod compat;
#[cfg(feature = "xgboost")]
pub mod inference;
#[cfg(feature = "xgboost")]
pub mod model;
#[cfg(feature = "xgboost")]
pub mod repr;

pub use backend::{PredictBackend, acquire_backend};
pub use config::ModelConfig;
pub use error::PredictError;
pub use invocation::{InvocationRequest, Prediction, Response, run};

#[cfg(feature = "xgboost")]
pub use model::Regressor;
