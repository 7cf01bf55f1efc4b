//! Native model representations.
//!
//! - [`gbdt`]: tree ensembles (gbtree and dart boosters)
//! - [`gblinear`]: linear booster weights

pub mod gbdt;
pub mod gblinear;
