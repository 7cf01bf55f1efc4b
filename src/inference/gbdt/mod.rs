//! Tree ensemble inference.
//!
//! [`Predictor`] accumulates the base score and one leaf value per tree into
//! each output group. DART forests scale every tree's contribution by its
//! weight.

mod predictor;

pub use predictor::Predictor;
