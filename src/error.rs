use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a model or scaler from disk.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read artifact '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode artifact '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("failed to encode artifact: {0}")]
    Encode(String),

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

/// Failures inside the prediction pipeline. Never shown to clients verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("model and scaler are not loaded")]
    NotLoaded,

    #[error("feature count mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("model produced {got} outputs, expected 1")]
    OutputWidth { got: usize },

    #[error("model produced a non-finite value: {0}")]
    NonFinite(f64),
}

/// Client-side problems with a `/predict` request body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("No JSON data received")]
    Empty,

    #[error("Malformed request body: {0}")]
    Malformed(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Missing required field: '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for field '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}
