//! Linear booster (gblinear) representation.
//!
//! # Weight Layout
//!
//! Weights are an `Array2<f32>` with shape `[n_features + 1, n_groups]`; the
//! last row holds the per-group bias:
//!
//! ```text
//! weights[[feature, group]]    -> coefficient
//! weights[[n_features, group]] -> bias
//! ```

mod model;

pub use model::LinearModel;
