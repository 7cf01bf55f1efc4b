//! XGBoost inference tests: load model files from disk and predict.
//!
//! Expected values are computed by hand from the fixture trees in
//! `common/mod.rs`.

#![cfg(feature = "xgboost")]

mod common;

use approx::assert_abs_diff_eq;
use rstest::rstest;
use serde_json::json;
use tempfile::tempdir;

use xgb_inference::compat::{Booster, XgbModel};
use xgb_inference::data::FeatureMatrix;
use xgb_inference::{PredictError, Regressor};

use common::{
    DEFAULT_TOLERANCE, categorical_stump, dart, gblinear, gbtree, model, regression_model, stump,
    write_model,
};

fn matrix(rows: &[&[Option<f64>]]) -> FeatureMatrix {
    let rows: Vec<Vec<Option<f64>>> = rows.iter().map(|r| r.to_vec()).collect();
    FeatureMatrix::from_rows(&rows).expect("rectangular rows")
}

fn load(value: &serde_json::Value) -> Regressor {
    let dir = tempdir().unwrap();
    let path = write_model(dir.path(), "model.json", value);
    Regressor::load(&path).expect("load model")
}

fn assert_predictions(actual: &[f32], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "prediction count");
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (f64::from(a) - e).abs() < DEFAULT_TOLERANCE,
            "prediction {i}: expected {e}, got {a}"
        );
    }
}

// =============================================================================
// GBTree
// =============================================================================

#[test]
fn gbtree_regression() {
    let model = load(&regression_model());
    assert_eq!(model.n_features(), 3);
    assert_eq!(model.n_groups(), 1);

    let out = model
        .predict(&matrix(&[
            &[Some(0.5), Some(0.0), Some(2.0)],
            &[Some(3.0), Some(0.0), Some(-1.0)],
        ]))
        .unwrap();

    assert_predictions(out.as_slice(), &[0.15, 1.35]);
}

#[test]
fn gbtree_missing_values_follow_default_direction() {
    // First stump sends missing left, second sends missing right.
    let model = load(&regression_model());
    let out = model.predict(&matrix(&[&[None, None, None]])).unwrap();

    assert_predictions(out.as_slice(), &[0.5 - 0.25 - 0.1]);
}

#[test]
fn binary_logistic_outputs_probabilities() {
    let value = model(
        gbtree(vec![stump(0, 1.0, -1.0, 1.0, true)], vec![0]),
        "binary:logistic",
        "5E-1",
        0,
        3,
    );
    let model = load(&value);
    let out = model
        .predict(&matrix(&[&[Some(0.0), Some(0.0), Some(0.0)], &[Some(2.0), Some(0.0), Some(0.0)]]))
        .unwrap();

    let sigmoid = |x: f64| 1.0 / (1.0 + (-x).exp());
    assert_predictions(out.as_slice(), &[sigmoid(-1.0), sigmoid(1.0)]);
}

#[test]
fn poisson_outputs_exp_of_margin() {
    let value = model(
        gbtree(vec![stump(0, 1.0, 0.5, 1.0, true)], vec![0]),
        "count:poisson",
        "1",
        0,
        3,
    );
    let model = load(&value);
    let out = model.predict(&matrix(&[&[Some(0.0), Some(0.0), Some(0.0)]])).unwrap();

    // base_score 1.0 is ln(1.0) = 0.0 in margin space.
    assert_predictions(out.as_slice(), &[0.5f64.exp()]);
}

#[test]
fn multiclass_softprob() {
    let trees = vec![
        stump(0, 1.0, 2.0, 0.0, true),
        stump(0, 1.0, 0.0, 2.0, true),
        stump(1, 1.0, 1.0, 1.0, true),
    ];
    let value = model(gbtree(trees, vec![0, 1, 2]), "multi:softprob", "5E-1", 3, 3);
    let model = load(&value);
    let out = model
        .predict(&matrix(&[&[Some(0.0), Some(0.0), Some(0.0)], &[Some(5.0), Some(0.0), Some(0.0)]]))
        .unwrap();

    assert_eq!(out.shape(), (2, 3));
    for row in out.rows() {
        assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    }
    assert!(out.row(0)[0] > out.row(0)[2] && out.row(0)[2] > out.row(0)[1]);
    assert!(out.row(1)[1] > out.row(1)[2] && out.row(1)[2] > out.row(1)[0]);
}

#[test]
fn categorical_split() {
    let value = model(
        gbtree(vec![categorical_stump(1, &[2, 5], -1.0, 1.0)], vec![0]),
        "reg:squarederror",
        "0",
        0,
        3,
    );
    let model = load(&value);
    let out = model
        .predict(&matrix(&[
            &[Some(0.0), Some(2.0), Some(0.0)],
            &[Some(0.0), Some(3.0), Some(0.0)],
            &[Some(0.0), Some(5.9), Some(0.0)],
            &[Some(0.0), Some(-1.0), Some(0.0)],
            &[Some(0.0), None, Some(0.0)],
        ]))
        .unwrap();

    // 5.9 truncates to 5; negatives go left; missing follows default_left.
    assert_predictions(out.as_slice(), &[1.0, -1.0, 1.0, -1.0, -1.0]);
}

#[test]
fn leaf_output_ignores_base_weights() {
    let mut tree = stump(0, 0.5, 1.0, 2.0, true);
    tree["base_weights"] = json!([0.0, 10.0, 20.0]);
    let value = model(gbtree(vec![tree], vec![0]), "reg:absoluteerror", "0", 0, 1);
    let out = load(&value).predict(&matrix(&[&[Some(0.0)], &[Some(1.0)]])).unwrap();

    assert_predictions(out.as_slice(), &[1.0, 2.0]);
}

#[test]
fn early_stopped_model_uses_best_iteration() {
    let trees = vec![stump(0, 0.5, 1.0, 1.0, true), stump(0, 0.5, 100.0, 100.0, true)];
    let mut value = model(gbtree(trees, vec![0, 0]), "reg:squarederror", "0", 0, 1);
    value["learner"]["attributes"] = json!({"best_iteration": "0", "best_score": "0.5"});
    let out = load(&value).predict(&matrix(&[&[Some(0.0)]])).unwrap();

    assert_predictions(out.as_slice(), &[1.0]);
}

#[test]
fn multi_target_base_score_per_output() {
    let trees = vec![stump(0, 0.5, 1.0, 1.0, true), stump(0, 0.5, 2.0, 2.0, true)];
    let mut value = model(gbtree(trees, vec![0, 1]), "reg:squarederror", "[1E0,-1E0]", 0, 1);
    value["learner"]["learner_model_param"]["num_target"] = json!("2");
    let model = load(&value);
    assert_eq!(model.n_groups(), 2);

    let out = model.predict(&matrix(&[&[Some(0.0)]])).unwrap();
    assert_predictions(out.as_slice(), &[2.0, 1.0]);
}

// =============================================================================
// DART and GBLinear
// =============================================================================

#[test]
fn dart_scales_trees_by_weight() {
    let value = model(
        dart(
            vec![stump(0, 1.0, 1.0, 2.0, true), stump(0, 1.0, 4.0, 8.0, true)],
            vec![0, 0],
            vec![1.0, 0.5],
        ),
        "reg:squarederror",
        "0",
        0,
        3,
    );
    let model = load(&value);
    assert!(matches!(model.booster(), Booster::Dart { .. }));

    let out = model
        .predict(&matrix(&[&[Some(0.0), Some(0.0), Some(0.0)], &[Some(1.0), Some(0.0), Some(0.0)]]))
        .unwrap();
    assert_predictions(out.as_slice(), &[3.0, 6.0]);
}

#[test]
fn gblinear_regression() {
    // y = 1.0 * x0 - 2.0 * x1 + 0.5 * x2 + 0.25 + base_score
    let value = model(gblinear(vec![1.0, -2.0, 0.5, 0.25]), "reg:squarederror", "5E-1", 0, 3);
    let model = load(&value);
    assert!(matches!(model.booster(), Booster::Linear(_)));

    let out = model
        .predict(&matrix(&[&[Some(1.0), Some(1.0), Some(2.0)], &[Some(2.0), None, Some(0.0)]]))
        .unwrap();
    assert_predictions(out.as_slice(), &[0.75, 2.75]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn feature_width_mismatch() {
    let model = load(&regression_model());
    let err = model.predict(&matrix(&[&[Some(1.0), Some(2.0)]])).unwrap_err();

    assert!(matches!(err, PredictError::FeatureMismatch { expected: 3, got: 2 }));
}

#[test]
fn empty_batch() {
    let model = load(&regression_model());
    let err = model.predict(&FeatureMatrix::from_rows(&[]).unwrap()).unwrap_err();

    assert_eq!(err.to_string(), "feature matrix is empty");
}

#[rstest]
#[case::unknown_objective(json!({"learner": {
    "gradient_booster": {"name": "gbtree", "model": {"trees": []}},
    "objective": {"name": "reg:made-up"},
    "learner_model_param": {"base_score": "0"}
}}))]
#[case::unknown_booster(json!({"learner": {
    "gradient_booster": {"name": "gbforest", "model": {}},
    "objective": {"name": "reg:squarederror"},
    "learner_model_param": {"base_score": "0"}
}}))]
#[case::missing_learner(json!({"version": [2, 1, 0]}))]
fn unparseable_models(#[case] value: serde_json::Value) {
    let dir = tempdir().unwrap();
    let path = write_model(dir.path(), "model.json", &value);

    let err = Regressor::load(&path).unwrap_err();
    assert!(matches!(err, PredictError::Parse(_)), "got {err}");
}

#[test]
fn structurally_invalid_model() {
    let mut tree = stump(0, 1.0, 1.0, 2.0, true);
    tree["right_children"] = json!([7, -1, -1]);
    let value = model(gbtree(vec![tree], vec![0]), "reg:squarederror", "0", 0, 3);

    let dir = tempdir().unwrap();
    let path = write_model(dir.path(), "model.json", &value);
    let err = Regressor::load(&path).unwrap_err();

    assert!(err.to_string().starts_with("invalid model: "), "got {err}");
}

#[rstest]
#[case::base_score_length(model(
    gbtree(vec![stump(0, 0.5, 1.0, 2.0, true)], vec![0]),
    "reg:squarederror",
    "[5E-1,5E-1]",
    0,
    1,
))]
#[case::category_too_large(model(
    gbtree(vec![categorical_stump(0, &[3, 1 << 24], 1.0, 2.0)], vec![0]),
    "reg:squarederror",
    "0",
    0,
    1,
))]
fn unsupported_model_data(#[case] value: serde_json::Value) {
    let dir = tempdir().unwrap();
    let path = write_model(dir.path(), "model.json", &value);
    let err = Regressor::load(&path).unwrap_err();

    assert!(err.to_string().starts_with("invalid model: "), "got {err}");
}

#[test]
fn parsed_model_exposes_metadata() {
    let parsed = XgbModel::from_value(&regression_model()).unwrap();

    assert_eq!(parsed.version, [2, 1, 3]);
    assert_eq!(parsed.num_feature(), 3);
    assert_eq!(parsed.n_groups(), 1);
    assert!(!parsed.is_dart());
    assert!(!parsed.is_linear());
    assert_eq!(parsed.objective().to_string(), "reg:squarederror");
}
