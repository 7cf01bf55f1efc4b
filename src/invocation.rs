//! One-shot invocation: request in, single JSON response line out.
//!
//! Every path through [`run`] produces a [`Response`]; nothing here panics on
//! bad input or exits the process.

use std::io;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use serde_json::ser::Formatter;
use tracing::{debug, info};

use crate::backend::PredictBackend;
use crate::config::ModelConfig;
use crate::data::FeatureMatrix;
use crate::error::PredictError;

/// Error code when no prediction backend is compiled in.
pub const XGBOOST_NOT_INSTALLED: &str = "xgboost-not-installed";

/// Error code when the resolved model path does not exist.
pub const MODEL_NOT_FOUND: &str = "model-not-found";

// =============================================================================
// Request
// =============================================================================

/// Problems with the command-line payload.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid-request: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid-request: expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// The decoded command-line argument.
///
/// Only `features` is read; other keys are ignored. A missing or `null`
/// `features` means an empty batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InvocationRequest {
    #[serde(default)]
    features: Option<Vec<Vec<Option<f64>>>>,
}

impl InvocationRequest {
    /// Parse the raw argument; `None` is treated as `{}`.
    pub fn parse(raw: Option<&str>) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(raw.unwrap_or("{}"))?;
        if !value.is_object() {
            return Err(RequestError::NotAnObject(json_kind(&value)));
        }
        Ok(Self::deserialize(value)?)
    }

    /// Feature rows; `None` cells are missing values.
    pub fn features(&self) -> &[Vec<Option<f64>>] {
        self.features.as_deref().unwrap_or_default()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Response
// =============================================================================

/// Predicted values: one number per row for single-output models, one list
/// per row otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prediction {
    Scalar(Vec<f64>),
    Vector(Vec<Vec<f64>>),
}

impl Prediction {
    /// Build from a row-major buffer with `n_outputs` values per row.
    pub fn from_values(values: &[f32], n_outputs: usize) -> Self {
        if n_outputs <= 1 {
            Prediction::Scalar(values.iter().map(|&v| f64::from(v)).collect())
        } else {
            Prediction::Vector(
                values
                    .chunks(n_outputs)
                    .map(|row| row.iter().map(|&v| f64::from(v)).collect())
                    .collect(),
            )
        }
    }

    /// Number of predicted rows.
    pub fn len(&self) -> usize {
        match self {
            Prediction::Scalar(values) => values.len(),
            Prediction::Vector(rows) => rows.len(),
        }
    }
}

/// The single payload written to stdout.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(Prediction),
    Failure(String),
}

impl Response {
    pub fn failure(reason: impl Into<String>) -> Self {
        Response::Failure(reason.into())
    }

    /// Serialize as one line, with `", "` and `": "` separators.
    pub fn to_json_line(&self) -> String {
        let mut buf = Vec::with_capacity(64);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.serialize(&mut ser)
            .expect("serializing into a Vec cannot fail");
        String::from_utf8(buf).expect("serde_json writes UTF-8")
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 2)?;
        match self {
            Response::Success(prediction) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("prediction", prediction)?;
            }
            Response::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

/// Compact single-line output with a space after `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Handle one invocation.
///
/// Checks run in order: backend available, request well-formed, model file
/// present. Only then is the model loaded; any failure from there on is
/// reported with its message.
pub fn run(raw: Option<&str>, config: &ModelConfig, backend: Option<&dyn PredictBackend>) -> Response {
    let Some(backend) = backend else {
        return Response::failure(XGBOOST_NOT_INSTALLED);
    };

    let request = match InvocationRequest::parse(raw) {
        Ok(request) => request,
        Err(e) => {
            info!(error = %e, "rejected request");
            return Response::failure(e.to_string());
        }
    };

    if !config.model_exists() {
        info!(path = %config.model_path().display(), "model file not found");
        return Response::failure(MODEL_NOT_FOUND);
    }

    match predict(backend, config, &request) {
        Ok(prediction) => {
            debug!(rows = prediction.len(), backend = backend.name(), "prediction done");
            Response::Success(prediction)
        }
        Err(e) => {
            info!(error = %e, "prediction failed");
            Response::failure(e.to_string())
        }
    }
}

fn predict(
    backend: &dyn PredictBackend,
    config: &ModelConfig,
    request: &InvocationRequest,
) -> Result<Prediction, PredictError> {
    let features = FeatureMatrix::from_rows(request.features())?;
    debug!(
        rows = features.n_rows(),
        cols = features.n_features(),
        path = %config.model_path().display(),
        "predicting"
    );
    backend.predict(config.model_path(), &features)
}
