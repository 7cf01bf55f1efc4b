//! Loaders for models trained outside this crate.
//!
//! Only XGBoost's JSON format is supported. Loaders parse into foreign
//! schema types first and then convert to the native representations in
//! [`crate::repr`].

pub mod xgboost;

pub use xgboost::{Booster, ConversionError, XgbModel};
