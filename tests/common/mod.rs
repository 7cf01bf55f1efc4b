//! Model fixtures for integration tests.
//!
//! Models are built as `serde_json::Value` in the layout XGBoost writes with
//! `save_model("*.json")` and written to a temporary directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// Default tolerance for comparing predictions against hand-computed values.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// A one-split tree: `feature < threshold` goes to `left`, else `right`.
/// Missing values follow `default_left`. `base_weights` hold unscaled weights
/// as XGBoost writes them with a learning rate of 0.3; leaf outputs are the
/// `split_conditions`.
pub fn stump(feature: i32, threshold: f32, left: f32, right: f32, default_left: bool) -> Value {
    json!({
        "tree_param": {"num_deleted": "0", "num_feature": "3", "num_nodes": "3", "size_leaf_vector": "1"},
        "id": 0,
        "loss_changes": [1.0, 0.0, 0.0],
        "sum_hessian": [4.0, 2.0, 2.0],
        "base_weights": [0.0, left / 0.3, right / 0.3],
        "left_children": [1, -1, -1],
        "right_children": [2, -1, -1],
        "parents": [2147483647, 0, 0],
        "split_indices": [feature, 0, 0],
        "split_conditions": [threshold, left, right],
        "split_type": [0, 0, 0],
        "default_left": [u8::from(default_left), 0, 0],
        "categories": [],
        "categories_nodes": [],
        "categories_segments": [],
        "categories_sizes": []
    })
}

/// A stump with a categorical split: categories in `right_set` go right.
pub fn categorical_stump(feature: i32, right_set: &[i32], left: f32, right: f32) -> Value {
    let mut tree = stump(feature, 0.0, left, right, true);
    tree["split_type"] = json!([1, 0, 0]);
    tree["categories"] = json!(right_set);
    tree["categories_nodes"] = json!([0]);
    tree["categories_segments"] = json!([0]);
    tree["categories_sizes"] = json!([right_set.len()]);
    tree
}

pub fn gbtree(trees: Vec<Value>, tree_info: Vec<i32>) -> Value {
    json!({
        "name": "gbtree",
        "gbtree_train_param": {"process_type": "default", "tree_method": "hist", "updater": "grow_quantile_histmaker"},
        "model": {
            "gbtree_model_param": {"num_parallel_tree": "1", "num_trees": trees.len().to_string()},
            "iteration_indptr": (0..=trees.len()).collect::<Vec<_>>(),
            "tree_info": tree_info,
            "trees": trees
        }
    })
}

pub fn dart(trees: Vec<Value>, tree_info: Vec<i32>, weight_drop: Vec<f32>) -> Value {
    json!({
        "name": "dart",
        "gbtree": gbtree(trees, tree_info),
        "weight_drop": weight_drop
    })
}

pub fn gblinear(weights: Vec<f32>) -> Value {
    json!({
        "name": "gblinear",
        "gblinear_train_param": {"feature_selector": "cyclic", "updater": "shotgun"},
        "model": {"weights": weights}
    })
}

/// Wrap a booster in a full model document.
pub fn model(booster: Value, objective: &str, base_score: &str, num_class: usize, num_feature: usize) -> Value {
    json!({
        "version": [2, 1, 3],
        "learner": {
            "attributes": {},
            "feature_names": [],
            "feature_types": [],
            "gradient_booster": booster,
            "objective": {"name": objective, "reg_loss_param": {"scale_pos_weight": "1"}},
            "learner_model_param": {
                "base_score": base_score,
                "boost_from_average": "1",
                "num_class": num_class.to_string(),
                "num_feature": num_feature.to_string(),
                "num_target": "1"
            }
        }
    })
}

/// Base score 0.5 plus two stumps over three features:
/// `f0 < 1.0 ? -0.25 : 0.75` and `f2 < 0.0 ? 0.1 : -0.1`.
pub fn regression_model() -> Value {
    model(
        gbtree(
            vec![stump(0, 1.0, -0.25, 0.75, true), stump(2, 0.0, 0.1, -0.1, false)],
            vec![0, 0],
        ),
        "reg:squarederror",
        "5E-1",
        0,
        3,
    )
}

/// Write `model` as `<dir>/<name>` and return the path.
pub fn write_model(dir: &Path, name: &str, model: &Value) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create model directory");
    }
    std::fs::write(&path, model.to_string()).expect("write model");
    path
}
