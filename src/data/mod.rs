//! Feature matrix input.
//!
//! Requests arrive as nested JSON arrays; [`FeatureMatrix`] turns them into a
//! dense row-major `f32` matrix for tree traversal.
//!
//! # Missing Values
//!
//! Missing values are represented as `f32::NAN`, matching XGBoost. A `null`
//! cell in the request becomes NaN.

mod matrix;

pub use matrix::{DataError, FeatureMatrix};
