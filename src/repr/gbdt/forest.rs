//! Forest: a collection of trees with output group assignments.

use super::Tree;
use super::tree::TreeValidationError;

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score has {len} values for {n_groups} output groups")]
    BaseScoreLenMismatch { n_groups: u32, len: usize },
    #[error("tree {tree_idx} is assigned to group {group} but the forest has {n_groups} groups")]
    TreeGroupOutOfRange {
        tree_idx: usize,
        group: u32,
        n_groups: u32,
    },
    #[error("tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// Forest of decision trees.
///
/// Each tree contributes to exactly one output group; regression and binary
/// models have a single group, `k`-class models have `k`.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    n_groups: u32,
    base_score: Vec<f32>,
}

impl Forest {
    /// Empty forest with a zero base score.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups,
            base_score: vec![0.0; n_groups as usize],
        }
    }

    pub fn for_regression() -> Self {
        Self::new(1)
    }

    /// Set the per-group base score (margin space).
    pub fn with_base_score(mut self, base_score: Vec<f32>) -> Self {
        self.base_score = base_score;
        self
    }

    pub fn push_tree(&mut self, tree: Tree, group: u32) {
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    #[inline]
    pub fn base_score(&self) -> &[f32] {
        &self.base_score
    }

    pub fn trees_with_groups(&self) -> impl Iterator<Item = (&Tree, u32)> {
        self.trees.iter().zip(self.tree_groups.iter().copied())
    }

    /// Minimum sample width that covers every split feature.
    pub fn required_features(&self) -> usize {
        self.trees
            .iter()
            .filter_map(Tree::max_split_index)
            .max()
            .map_or(0, |idx| idx as usize + 1)
    }

    /// Check base score length, group assignments, and every tree.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.base_score.len() != self.n_groups as usize {
            return Err(ForestValidationError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: self.base_score.len(),
            });
        }

        for (tree_idx, (tree, group)) in self.trees_with_groups().enumerate() {
            if group >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx,
                    group,
                    n_groups: self.n_groups,
                });
            }
            tree.validate()
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }

        Ok(())
    }
}
