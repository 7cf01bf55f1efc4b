//! XGBoost JSON model schema.
//!
//! These are foreign types used only for parsing; see `convert` for the
//! mapping onto native representations. Fields that do not influence
//! prediction are either skipped entirely or kept only for inspection.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};

use crate::error::PredictError;
use crate::inference::OutputTransform;

// =============================================================================
// Custom deserializers for XGBoost-specific encodings
// =============================================================================

/// `base_score` appears as `0.5`, `"0.5"`, `"[5E-1]"`, `[0.5]`, or, for
/// multi-output models, `"[a,b,c]"` with one intercept per output.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let values = base_score_values::<D::Error>(Value::deserialize(deserializer)?)?;
    if values.is_empty() {
        return Err(D::Error::custom("base_score array is empty"));
    }
    Ok(values)
}

fn base_score_values<E: serde::de::Error>(value: Value) -> Result<Vec<f32>, E> {
    match value {
        Value::Array(items) => items.into_iter().map(base_score_scalar).collect(),
        Value::String(s) => match s.trim().parse::<f32>() {
            Ok(f) => Ok(vec![f]),
            Err(_) => match serde_json::from_str::<Value>(s.trim()) {
                Ok(inner @ (Value::Array(_) | Value::Number(_))) => base_score_values(inner),
                _ => Err(E::custom(format!("cannot parse base_score from {s:?}"))),
            },
        },
        other => base_score_scalar(other).map(|f| vec![f]),
    }
}

fn base_score_scalar<E: serde::de::Error>(value: Value) -> Result<f32, E> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| E::custom("invalid base_score number")),
        Value::String(s) => s
            .trim()
            .parse::<f32>()
            .map_err(|_| E::custom(format!("cannot parse base_score from {s:?}"))),
        _ => Err(E::custom("base_score must be a number, string, or array")),
    }
}

fn flag_from_value<E: serde::de::Error>(value: &Value) -> Result<bool, E> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => n
            .as_f64()
            .map(|f| f != 0.0)
            .ok_or_else(|| E::custom("invalid number for flag")),
        Value::String(s) => match s.trim() {
            t if t.eq_ignore_ascii_case("true") || t == "1" => Ok(true),
            t if t.eq_ignore_ascii_case("false") || t == "0" => Ok(false),
            _ => Err(E::custom(format!("cannot parse flag from {s:?}"))),
        },
        _ => Err(E::custom("flag must be a bool, number, or string")),
    }
}

/// `default_left` is a list of 0/1 integers in most versions, bools in some.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(flag_from_value)
        .collect()
}

fn default_num_target() -> i64 {
    1
}

// =============================================================================
// Trees
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub size_leaf_vector: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_feature: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_deleted: i64,
}

/// One regression tree in XGBoost's SoA layout.
///
/// Leaves are the nodes with `left_children[i] == -1`; their output is in
/// `split_conditions[i]`. `base_weights` holds the pre-regularization node
/// weight and is not used for prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub base_weights: Vec<f32>,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    #[serde(default)]
    pub parents: Vec<i32>,
    pub split_indices: Vec<i32>,
    pub split_conditions: Vec<f32>,
    #[serde(default)]
    pub split_type: Vec<i32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    #[serde(default)]
    pub categories: Vec<i32>,
    #[serde(default)]
    pub categories_nodes: Vec<i32>,
    #[serde(default)]
    pub categories_segments: Vec<i64>,
    #[serde(default)]
    pub categories_sizes: Vec<i64>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GBTreeModelParam {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_trees: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_parallel_tree: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    #[serde(default)]
    pub gbtree_model_param: GBTreeModelParam,
    pub trees: Vec<Tree>,
    /// Output group of each tree.
    #[serde(default)]
    pub tree_info: Vec<i32>,
    /// Tree offsets of each boosting round, `n_rounds + 1` entries.
    #[serde(default)]
    pub iteration_indptr: Vec<i64>,
}

impl ModelTrees {
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

// =============================================================================
// Gradient boosters (gbtree | gblinear | dart)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GbLinearModel {
    /// Row-major `[num_feature + 1, n_groups]`, bias row last.
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeDefinition {
    pub model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    Gblinear {
        model: GbLinearModel,
    },
    Dart {
        gbtree: GBTreeDefinition,
        weight_drop: Vec<f32>,
    },
}

// =============================================================================
// Objective
// =============================================================================

/// Training objective, as named in the model file.
///
/// Objective parameters (`reg_loss_param`, `tweedie_regression_param`, ...)
/// only matter during training and are not parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Objective {
    #[serde(rename = "reg:squarederror")]
    RegSquaredError,
    #[serde(rename = "reg:squaredlogerror")]
    RegSquaredLogError,
    #[serde(rename = "reg:pseudohubererror")]
    RegPseudoHuberError,
    #[serde(rename = "reg:linear")]
    RegLinear,
    #[serde(rename = "reg:absoluteerror")]
    RegAbsoluteError,
    #[serde(rename = "reg:quantileerror")]
    RegQuantileError,
    #[serde(rename = "reg:logistic")]
    RegLogistic,
    #[serde(rename = "reg:gamma")]
    RegGamma,
    #[serde(rename = "reg:tweedie")]
    RegTweedie,
    #[serde(rename = "count:poisson")]
    CountPoisson,
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
    #[serde(rename = "binary:logitraw")]
    BinaryLogitRaw,
    #[serde(rename = "binary:hinge")]
    BinaryHinge,
    #[serde(rename = "multi:softmax")]
    MultiSoftmax,
    #[serde(rename = "multi:softprob")]
    MultiSoftprob,
    #[serde(rename = "survival:cox")]
    SurvivalCox,
    #[serde(rename = "survival:aft")]
    SurvivalAft,
    #[serde(rename = "rank:pairwise")]
    RankPairwise,
    #[serde(rename = "rank:ndcg")]
    RankNdcg,
    #[serde(rename = "rank:map")]
    RankMap,
}

impl Objective {
    pub fn name(self) -> &'static str {
        match self {
            Objective::RegSquaredError => "reg:squarederror",
            Objective::RegSquaredLogError => "reg:squaredlogerror",
            Objective::RegPseudoHuberError => "reg:pseudohubererror",
            Objective::RegLinear => "reg:linear",
            Objective::RegAbsoluteError => "reg:absoluteerror",
            Objective::RegQuantileError => "reg:quantileerror",
            Objective::RegLogistic => "reg:logistic",
            Objective::RegGamma => "reg:gamma",
            Objective::RegTweedie => "reg:tweedie",
            Objective::CountPoisson => "count:poisson",
            Objective::BinaryLogistic => "binary:logistic",
            Objective::BinaryLogitRaw => "binary:logitraw",
            Objective::BinaryHinge => "binary:hinge",
            Objective::MultiSoftmax => "multi:softmax",
            Objective::MultiSoftprob => "multi:softprob",
            Objective::SurvivalCox => "survival:cox",
            Objective::SurvivalAft => "survival:aft",
            Objective::RankPairwise => "rank:pairwise",
            Objective::RankNdcg => "rank:ndcg",
            Objective::RankMap => "rank:map",
        }
    }

    /// Transform `predict` applies to margins for this objective.
    pub fn output_transform(self) -> OutputTransform {
        match self {
            Objective::RegLogistic | Objective::BinaryLogistic => OutputTransform::Sigmoid,
            Objective::RegGamma
            | Objective::RegTweedie
            | Objective::CountPoisson
            | Objective::SurvivalCox
            | Objective::SurvivalAft => OutputTransform::Exp,
            Objective::MultiSoftprob => OutputTransform::Softmax,
            Objective::MultiSoftmax => OutputTransform::ArgMax,
            Objective::BinaryHinge => OutputTransform::Hinge,
            _ => OutputTransform::Identity,
        }
    }

    /// Map a stored `base_score` from output space to margin space.
    ///
    /// The model file keeps the base score in the same space as predictions;
    /// tree leaves are summed in margin space.
    pub fn prob_to_margin(self, base_score: f32) -> f32 {
        match self {
            Objective::RegLogistic | Objective::BinaryLogistic | Objective::BinaryLogitRaw => {
                let p = base_score.clamp(1e-7, 1.0 - 1e-7);
                (p / (1.0 - p)).ln()
            }
            Objective::RegGamma
            | Objective::RegTweedie
            | Objective::CountPoisson
            | Objective::SurvivalCox
            | Objective::SurvivalAft => base_score.max(1e-7).ln(),
            _ => base_score,
        }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectiveConfig {
    pub name: Objective,
}

// =============================================================================
// Learner
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    /// Intercept in probability space; one value, or one per output.
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: Vec<f32>,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_class: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_feature: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_num_target")]
    pub num_target: i64,
}

impl Default for LearnerModelParam {
    fn default() -> Self {
        Self {
            base_score: vec![0.5],
            num_class: 0,
            num_feature: 0,
            num_target: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_types: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: ObjectiveConfig,
    pub learner_model_param: LearnerModelParam,
    #[serde(default)]
    pub attributes: LearnerAttributes,
}

/// Free-form string attributes saved with the model. Only the early-stopping
/// marker changes inference.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LearnerAttributes {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub best_iteration: Option<usize>,
}

// =============================================================================
// Top-level model
// =============================================================================

/// A parsed XGBoost JSON model.
///
/// ```ignore
/// use xgb_inference::compat::xgboost::XgbModel;
///
/// let model = XgbModel::from_file("ml/model.json")?;
/// let booster = model.to_booster()?;
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    #[serde(default)]
    pub version: [u32; 3],
    pub learner: Learner,
}

impl XgbModel {
    /// Read and parse a model file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| PredictError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    #[inline]
    pub fn objective(&self) -> Objective {
        self.learner.objective.name
    }

    /// Declared input width, 0 when the file does not record it.
    #[inline]
    pub fn num_feature(&self) -> usize {
        self.learner.learner_model_param.num_feature.max(0) as usize
    }

    /// Number of margin outputs per row: classes for multiclass models,
    /// targets otherwise.
    pub fn n_groups(&self) -> u32 {
        let param = &self.learner.learner_model_param;
        if param.num_class > 1 {
            param.num_class as u32
        } else {
            param.num_target.max(1) as u32
        }
    }
}
