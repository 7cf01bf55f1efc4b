//! Linear booster inference.
//!
//! ```text
//! output[g] = bias[g] + sum_i(feature[i] * weight[i, g])
//! ```
//!
//! Missing (NaN) features contribute nothing, as in XGBoost's sparse
//! gblinear prediction.

mod predict;

pub use predict::LinearModelPredict;
