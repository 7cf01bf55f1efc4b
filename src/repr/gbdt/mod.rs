//! Gradient-boosted decision tree (GBDT) representations.

/// Node identifier: an index into the tree's SoA arrays.
pub type NodeId = u32;

pub mod categories;
pub mod forest;
pub mod node;
pub mod tree;

pub use categories::{CategoriesStorage, MAX_CATEGORY, categories_to_bitset, float_to_category};
pub use forest::{Forest, ForestValidationError};
pub use node::{ScalarLeaf, SplitType};
pub use tree::{Tree, TreeBuilder, TreeValidationError};
