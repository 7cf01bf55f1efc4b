//! Model location configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the model file location.
pub const MODEL_PATH_ENV: &str = "XGB_MODEL_PATH";

/// Model file used when [`MODEL_PATH_ENV`] is unset, relative to the working
/// directory.
pub const DEFAULT_MODEL_PATH: &str = "ml/model.json";

/// Where to find the model artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl ModelConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Resolve using an arbitrary variable lookup.
    ///
    /// A variable that is present but empty still counts as set; the empty
    /// path then simply does not exist.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        match lookup(MODEL_PATH_ENV) {
            Some(path) => Self {
                model_path: PathBuf::from(path),
            },
            None => Self::default(),
        }
    }

    #[inline]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Whether anything exists at the resolved path.
    pub fn model_exists(&self) -> bool {
        self.model_path.exists()
    }
}
