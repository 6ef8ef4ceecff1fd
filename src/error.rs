//! Typed errors for loading the regression model artifact

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a model artifact. Any of these is fatal at start-up.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

impl ModelError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ModelError::Invalid(msg.into())
    }
}
