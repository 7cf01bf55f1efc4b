//! Immutable SoA tree storage and its builder.

// Split setters take the full node description.
#![allow(clippy::too_many_arguments)]

use ndarray::ArrayView1;

use super::NodeId;
use super::categories::{CategoriesStorage, float_to_category};
use super::node::{ScalarLeaf, SplitType};

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node {node} has {side} child {child} but the tree has {n_nodes} nodes")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} is reachable along more than one path")]
    DuplicateVisit { node: NodeId },
}

/// Structure-of-Arrays decision tree.
///
/// Child indices are local to the tree; node 0 is the root.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[ScalarLeaf]>,
    split_types: Box<[SplitType]>,
    categories: CategoriesStorage,
}

impl Tree {
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn split_type(&self, node: NodeId) -> SplitType {
        self.split_types[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> ScalarLeaf {
        self.leaf_values[node as usize]
    }

    #[inline]
    pub fn categories(&self) -> &CategoriesStorage {
        &self.categories
    }

    pub fn has_categorical(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Largest feature index used by any split, `None` for a single-leaf tree.
    pub fn max_split_index(&self) -> Option<u32> {
        (0..self.n_nodes() as NodeId)
            .filter(|&n| !self.is_leaf(n))
            .map(|n| self.split_index(n))
            .max()
    }

    /// Walk from the root to the leaf reached by `sample`.
    ///
    /// NaN follows the node's default direction. A feature index past the end
    /// of `sample` is treated as missing.
    #[inline]
    pub fn traverse_to_leaf(&self, sample: ArrayView1<'_, f32>) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let fvalue = sample
                .get(self.split_index(node) as usize)
                .copied()
                .unwrap_or(f32::NAN);

            let go_left = if fvalue.is_nan() {
                self.default_left(node)
            } else {
                match self.split_type(node) {
                    SplitType::Numeric => fvalue < self.split_threshold(node),
                    SplitType::Categorical => match float_to_category(fvalue) {
                        Some(cat) => !self.categories.category_goes_right(node, cat),
                        None => true,
                    },
                }
            };

            node = if go_left {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }

        node
    }

    /// Leaf output for one sample.
    #[inline]
    pub fn predict_row(&self, sample: ArrayView1<'_, f32>) -> f32 {
        self.leaf_value(self.traverse_to_leaf(sample)).0
    }

    /// Check that every split points inside the tree and that no node is
    /// reachable twice (which also rules out cycles).
    ///
    /// Nodes unreachable from the root are allowed; XGBoost keeps pruned
    /// nodes in its arrays.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];

        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node as usize], true) {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            if self.is_leaf(node) {
                continue;
            }
            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        Ok(())
    }
}

/// Builds a [`Tree`] node by node.
///
/// Every node starts out as a zero-valued leaf; splits and leaf values are
/// then assigned by index, in any order.
///
/// ```
/// use xgb_inference::repr::gbdt::TreeBuilder;
/// use ndarray::array;
///
/// let mut builder = TreeBuilder::with_n_nodes(3);
/// builder.set_numeric_split(0, 0, 0.5, true, 1, 2);
/// builder.set_leaf(1, -1.0);
/// builder.set_leaf(2, 1.0);
/// let tree = builder.build();
///
/// assert_eq!(tree.predict_row(array![0.2].view()), -1.0);
/// assert_eq!(tree.predict_row(array![0.9].view()), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<ScalarLeaf>,
    split_types: Vec<SplitType>,
    category_sets: Vec<Vec<u32>>,
}

impl TreeBuilder {
    pub fn with_n_nodes(n_nodes: usize) -> Self {
        Self {
            split_indices: vec![0; n_nodes],
            split_thresholds: vec![0.0; n_nodes],
            left_children: vec![0; n_nodes],
            right_children: vec![0; n_nodes],
            default_left: vec![false; n_nodes],
            is_leaf: vec![true; n_nodes],
            leaf_values: vec![ScalarLeaf::default(); n_nodes],
            split_types: vec![SplitType::Numeric; n_nodes],
            category_sets: vec![Vec::new(); n_nodes],
        }
    }

    pub fn set_leaf(&mut self, node: NodeId, value: f32) {
        let i = node as usize;
        self.is_leaf[i] = true;
        self.leaf_values[i] = ScalarLeaf(value);
        self.split_types[i] = SplitType::Numeric;
        self.category_sets[i].clear();
    }

    pub fn set_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
        left: NodeId,
        right: NodeId,
    ) {
        self.set_split(node, feature, default_left, left, right);
        let i = node as usize;
        self.split_thresholds[i] = threshold;
        self.split_types[i] = SplitType::Numeric;
        self.category_sets[i].clear();
    }

    /// `bitset` holds the categories that go right, as built by
    /// [`categories_to_bitset`](super::categories_to_bitset).
    pub fn set_categorical_split(
        &mut self,
        node: NodeId,
        feature: u32,
        bitset: Vec<u32>,
        default_left: bool,
        left: NodeId,
        right: NodeId,
    ) {
        self.set_split(node, feature, default_left, left, right);
        let i = node as usize;
        self.split_types[i] = SplitType::Categorical;
        self.category_sets[i] = bitset;
    }

    fn set_split(&mut self, node: NodeId, feature: u32, default_left: bool, left: NodeId, right: NodeId) {
        let i = node as usize;
        self.is_leaf[i] = false;
        self.split_indices[i] = feature;
        self.default_left[i] = default_left;
        self.left_children[i] = left;
        self.right_children[i] = right;
    }

    pub fn build(self) -> Tree {
        let categories = if self.category_sets.iter().all(Vec::is_empty) {
            CategoriesStorage::empty()
        } else {
            let mut bitsets = Vec::new();
            let mut segments = Vec::with_capacity(self.category_sets.len());
            for set in &self.category_sets {
                segments.push((bitsets.len() as u32, set.len() as u32));
                bitsets.extend_from_slice(set);
            }
            CategoriesStorage::new(bitsets, segments)
        };

        Tree {
            split_indices: self.split_indices.into_boxed_slice(),
            split_thresholds: self.split_thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            default_left: self.default_left.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
            split_types: self.split_types.into_boxed_slice(),
            categories,
        }
    }
}
