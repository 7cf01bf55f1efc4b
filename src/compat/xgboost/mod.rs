//! XGBoost JSON model support.
//!
//! [`XgbModel`] mirrors the layout written by `Booster.save_model("*.json")`.
//! [`XgbModel::to_booster`] converts it into a [`Booster`]: a native
//! [`Forest`](crate::repr::gbdt::Forest) for gbtree and dart, or a
//! [`LinearModel`](crate::repr::gblinear::LinearModel) for gblinear.

mod convert;
mod json;

pub use convert::{Booster, ConversionError};
pub use json::{
    GBTreeModelParam, GbLinearModel, GradientBooster, Learner, LearnerModelParam, ModelTrees,
    Objective, ObjectiveConfig, Tree, TreeParam, XgbModel,
};
