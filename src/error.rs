//! Top-level error type for model loading and prediction.

use std::path::PathBuf;

#[cfg(feature = "xgboost")]
use crate::compat::xgboost::ConversionError;
use crate::data::DataError;

/// Anything that can go wrong between reading the model file and producing
/// predictions.
///
/// The `Display` text is what ends up in the `error` field of a failure
/// response, so messages are kept short and self-contained.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("failed to read model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[cfg(feature = "xgboost")]
    #[error("invalid model: {0}")]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("feature matrix is empty")]
    EmptyFeatures,

    #[error("feature shape mismatch, expected: {expected}, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
}
