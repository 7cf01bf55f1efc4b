//! Shared inference types.

mod output;
mod transform;

pub use output::PredictionOutput;
pub use transform::OutputTransform;
