use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use xgb_inference::invocation::{self, Response, XGBOOST_NOT_INSTALLED};
use xgb_inference::{ModelConfig, acquire_backend};

/// Predict a batch of feature rows with an XGBoost JSON model.
///
/// Prints exactly one JSON line and always exits 0; check `success` in the
/// output. The model path comes from XGB_MODEL_PATH (default ml/model.json).
#[derive(Debug, Parser)]
#[command(name = "xgb-inference", version)]
struct Cli {
    /// JSON request, e.g. '{"features": [[1.0, 2.0, 3.0]]}'. Defaults to '{}'.
    #[arg(allow_hyphen_values = true)]
    request: Option<String>,

    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    extra: Vec<String>,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let Some(backend) = acquire_backend() else {
        println!("{}", Response::failure(XGBOOST_NOT_INSTALLED).to_json_line());
        return;
    };

    let response = match Cli::try_parse() {
        Ok(cli) => {
            if !cli.extra.is_empty() {
                debug!(count = cli.extra.len(), "ignoring extra arguments");
            }
            let config = ModelConfig::from_env();
            invocation::run(cli.request.as_deref(), &config, Some(backend.as_ref()))
        }
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let rendered = e.to_string();
            let detail = rendered.lines().next().unwrap_or_default();
            Response::failure(format!("invalid-request: {}", detail.trim_start_matches("error: ")))
        }
    };

    println!("{}", response.to_json_line());
}
