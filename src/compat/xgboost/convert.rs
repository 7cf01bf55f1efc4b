//! Conversion from XGBoost JSON types to native types.

use std::collections::HashMap;

use ndarray::Array2;
use tracing::debug;

use crate::repr::gbdt::{
    Forest, ForestValidationError, MAX_CATEGORY, Tree, TreeBuilder, categories_to_bitset,
};
use crate::repr::gblinear::LinearModel;

use super::json::{GradientBooster, ModelTrees, Tree as XgbTree, XgbModel};

/// A booster converted from XGBoost.
#[derive(Debug, Clone)]
pub enum Booster {
    /// Standard gradient boosted tree ensemble.
    Tree(Forest),
    /// DART ensemble; every tree's output is scaled by its weight.
    Dart {
        forest: Forest,
        weights: Box<[f32]>,
    },
    /// Linear (gblinear) booster.
    Linear(LinearModel),
}

impl Booster {
    /// Number of margin outputs per row.
    pub fn n_groups(&self) -> usize {
        match self {
            Booster::Tree(forest) | Booster::Dart { forest, .. } => forest.n_groups() as usize,
            Booster::Linear(linear) => linear.n_groups(),
        }
    }
}

/// Structural problems found while converting an XGBoost model.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),
    #[error("tree {tree}: `{field}` has {len} entries but the tree has {num_nodes} nodes")]
    ArrayTooShort {
        tree: usize,
        field: &'static str,
        len: usize,
        num_nodes: usize,
    },
    #[error("tree {tree}: node {node} references child {child} but the tree has {num_nodes} nodes")]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },
    #[error("tree {tree}: node {node} splits on invalid feature index {feature}")]
    InvalidSplitIndex { tree: usize, node: usize, feature: i32 },
    #[error("tree {tree}: malformed categorical split data at entry {entry}")]
    InvalidCategories { tree: usize, entry: usize },
    #[error("tree {tree} has vector leaves (size {size}), which are not supported")]
    VectorLeaf { tree: usize, size: i64 },
    #[error("trees split on feature {feature} but the model declares {num_feature} features")]
    FeatureOutOfRange { feature: usize, num_feature: usize },
    #[error("base_score has {len} values but the model has {n_groups} outputs")]
    BaseScoreLenMismatch { len: usize, n_groups: usize },
    #[error("dart has {actual} tree weights for {expected} trees")]
    DartWeightsLenMismatch { actual: usize, expected: usize },
    #[error("gblinear weights length {actual} doesn't match (num_features + 1) * num_groups = {expected}")]
    InvalidLinearWeights { actual: usize, expected: usize },
    #[error("{0}")]
    InvalidForest(#[from] ForestValidationError),
    #[error("model uses the gblinear booster and has no trees")]
    NotATreeModel,
}

impl XgbModel {
    /// Convert to a native [`Booster`].
    pub fn to_booster(&self) -> Result<Booster, ConversionError> {
        let booster = match &self.learner.gradient_booster {
            GradientBooster::Gbtree { model } => Booster::Tree(self.convert_forest(model)?),
            GradientBooster::Dart {
                gbtree,
                weight_drop,
            } => {
                let n_trees = gbtree.model.num_trees();
                if weight_drop.len() != n_trees {
                    return Err(ConversionError::DartWeightsLenMismatch {
                        actual: weight_drop.len(),
                        expected: n_trees,
                    });
                }
                let forest = self.convert_forest(&gbtree.model)?;
                let weights = weight_drop[..forest.n_trees()].into();
                Booster::Dart { forest, weights }
            }
            GradientBooster::Gblinear { model } => {
                Booster::Linear(self.convert_linear_model(&model.weights)?)
            }
        };
        debug!(
            objective = %self.objective(),
            n_groups = booster.n_groups(),
            "converted xgboost model"
        );
        Ok(booster)
    }

    /// Convert a gbtree or dart model to a [`Forest`], ignoring DART weights.
    pub fn to_forest(&self) -> Result<Forest, ConversionError> {
        match &self.learner.gradient_booster {
            GradientBooster::Gbtree { model } => self.convert_forest(model),
            GradientBooster::Dart { gbtree, .. } => self.convert_forest(&gbtree.model),
            GradientBooster::Gblinear { .. } => Err(ConversionError::NotATreeModel),
        }
    }

    pub fn is_dart(&self) -> bool {
        matches!(self.learner.gradient_booster, GradientBooster::Dart { .. })
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.learner.gradient_booster, GradientBooster::Gblinear { .. })
    }

    /// Base score in margin space, one entry per output group.
    ///
    /// A single stored value is shared by every group.
    fn margin_base_score(&self) -> Result<Vec<f32>, ConversionError> {
        let raw = &self.learner.learner_model_param.base_score;
        let n_groups = self.n_groups() as usize;
        let objective = self.objective();
        match raw.as_slice() {
            [single] => Ok(vec![objective.prob_to_margin(*single); n_groups]),
            values if values.len() == n_groups => {
                Ok(values.iter().map(|&v| objective.prob_to_margin(v)).collect())
            }
            values => Err(ConversionError::BaseScoreLenMismatch {
                len: values.len(),
                n_groups,
            }),
        }
    }

    /// Number of leading trees used for prediction.
    ///
    /// Early-stopped models keep every trained round but predict with rounds
    /// `0..=best_iteration` only.
    fn tree_limit(&self, model_trees: &ModelTrees) -> usize {
        let n_trees = model_trees.num_trees();
        let Some(best) = self.learner.attributes.best_iteration else {
            return n_trees;
        };
        let limit = match model_trees.iteration_indptr.get(best + 1) {
            Some(&end) => usize::try_from(end).unwrap_or(0),
            None => {
                let per_round = self.n_groups() as usize
                    * model_trees.gbtree_model_param.num_parallel_tree.max(1) as usize;
                (best + 1).saturating_mul(per_round)
            }
        };
        limit.min(n_trees)
    }

    fn convert_forest(&self, model_trees: &ModelTrees) -> Result<Forest, ConversionError> {
        let mut forest = Forest::new(self.n_groups()).with_base_score(self.margin_base_score()?);

        let limit = self.tree_limit(model_trees);
        if limit < model_trees.num_trees() {
            debug!(
                best_iteration = ?self.learner.attributes.best_iteration,
                kept = limit,
                total = model_trees.num_trees(),
                "truncating forest to best iteration"
            );
        }

        for (tree_idx, xgb_tree) in model_trees.trees[..limit].iter().enumerate() {
            let group = model_trees.tree_info.get(tree_idx).copied().unwrap_or(0);
            let group = u32::try_from(group).unwrap_or(u32::MAX);
            forest.push_tree(convert_tree(xgb_tree, tree_idx)?, group);
        }
        forest.validate()?;

        let num_feature = self.num_feature();
        let required = forest.required_features();
        if num_feature > 0 && required > num_feature {
            return Err(ConversionError::FeatureOutOfRange {
                feature: required - 1,
                num_feature,
            });
        }

        Ok(forest)
    }

    /// XGBoost stores gblinear weights row-major as `[num_feature + 1, n_groups]`
    /// with the bias row last. The margin base score is folded into the bias.
    fn convert_linear_model(&self, weights: &[f32]) -> Result<LinearModel, ConversionError> {
        let num_features = self.num_feature();
        let num_groups = self.n_groups() as usize;

        let expected = (num_features + 1) * num_groups;
        if weights.len() != expected {
            return Err(ConversionError::InvalidLinearWeights {
                actual: weights.len(),
                expected,
            });
        }

        let mut arr = Array2::from_shape_vec((num_features + 1, num_groups), weights.to_vec())
            .expect("shape and weights length match");
        for (bias, base) in arr.row_mut(num_features).iter_mut().zip(self.margin_base_score()?) {
            *bias += base;
        }

        Ok(LinearModel::from_array(arr))
    }
}

/// Convert a single XGBoost tree.
fn convert_tree(xgb_tree: &XgbTree, tree_idx: usize) -> Result<Tree, ConversionError> {
    let num_nodes = xgb_tree.tree_param.num_nodes.max(0) as usize;
    if num_nodes == 0 {
        return Err(ConversionError::EmptyTree(tree_idx));
    }
    if xgb_tree.tree_param.size_leaf_vector > 1 {
        return Err(ConversionError::VectorLeaf {
            tree: tree_idx,
            size: xgb_tree.tree_param.size_leaf_vector,
        });
    }

    let lengths = [
        ("left_children", xgb_tree.left_children.len()),
        ("right_children", xgb_tree.right_children.len()),
        ("split_indices", xgb_tree.split_indices.len()),
        ("split_conditions", xgb_tree.split_conditions.len()),
        ("default_left", xgb_tree.default_left.len()),
    ];
    for (field, len) in lengths {
        if len < num_nodes {
            return Err(ConversionError::ArrayTooShort {
                tree: tree_idx,
                field,
                len,
                num_nodes,
            });
        }
    }

    let mut categorical = build_categorical_map(xgb_tree, tree_idx)?;
    let mut builder = TreeBuilder::with_n_nodes(num_nodes);

    for node_idx in 0..num_nodes {
        let left = xgb_tree.left_children[node_idx];
        let right = xgb_tree.right_children[node_idx];

        if left == -1 {
            builder.set_leaf(node_idx as u32, xgb_tree.split_conditions[node_idx]);
            continue;
        }

        let check_child = |child: i32| {
            if child < 0 || child as usize >= num_nodes {
                Err(ConversionError::InvalidNodeIndex {
                    tree: tree_idx,
                    node: node_idx,
                    child,
                    num_nodes,
                })
            } else {
                Ok(child as u32)
            }
        };
        let left = check_child(left)?;
        let right = check_child(right)?;

        let feature = xgb_tree.split_indices[node_idx];
        let feature = u32::try_from(feature).map_err(|_| ConversionError::InvalidSplitIndex {
            tree: tree_idx,
            node: node_idx,
            feature,
        })?;
        let default_left = xgb_tree.default_left[node_idx];

        // split_type: 0 = numeric, 1 = categorical; absent before categorical support.
        let is_categorical = xgb_tree.split_type.get(node_idx).copied().unwrap_or(0) == 1;
        if is_categorical {
            let bitset = categorical.remove(&node_idx).unwrap_or_default();
            builder.set_categorical_split(node_idx as u32, feature, bitset, default_left, left, right);
        } else {
            let threshold = xgb_tree.split_conditions[node_idx];
            builder.set_numeric_split(node_idx as u32, feature, threshold, default_left, left, right);
        }
    }

    Ok(builder.build())
}

/// Map node index to the packed bitset of categories that go right.
///
/// The JSON keeps category VALUES (not bitset words) in `categories`;
/// `categories_nodes[i]` owns `categories[segments[i]..segments[i] + sizes[i]]`.
fn build_categorical_map(
    xgb_tree: &XgbTree,
    tree_idx: usize,
) -> Result<HashMap<usize, Vec<u32>>, ConversionError> {
    let invalid = |entry| ConversionError::InvalidCategories {
        tree: tree_idx,
        entry,
    };
    let mut map = HashMap::with_capacity(xgb_tree.categories_nodes.len());

    for (i, &node) in xgb_tree.categories_nodes.iter().enumerate() {
        let node = usize::try_from(node).map_err(|_| invalid(i))?;
        let start = xgb_tree.categories_segments.get(i).copied().ok_or_else(|| invalid(i))?;
        let size = xgb_tree.categories_sizes.get(i).copied().ok_or_else(|| invalid(i))?;
        let start = usize::try_from(start).map_err(|_| invalid(i))?;
        let size = usize::try_from(size).map_err(|_| invalid(i))?;

        let values = start
            .checked_add(size)
            .and_then(|end| xgb_tree.categories.get(start..end))
            .ok_or_else(|| invalid(i))?;
        let values = values
            .iter()
            .map(|&c| {
                u32::try_from(c)
                    .ok()
                    .filter(|&c| c < MAX_CATEGORY)
                    .ok_or_else(|| invalid(i))
            })
            .collect::<Result<Vec<u32>, _>>()?;

        map.insert(node, categories_to_bitset(&values));
    }

    Ok(map)
}
