//! Per-node value types.

/// Type of split in a decision tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SplitType {
    /// Go left if `value < threshold`.
    #[default]
    Numeric = 0,
    /// Go right if the value's category is in the node's set.
    Categorical = 1,
}

/// Scalar leaf output.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScalarLeaf(pub f32);
