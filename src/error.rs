//! Error types for artifact loading, preprocessing, inference and flow parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Startup-time failures. All of these are fatal to the service.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no supported model file found in {}", .0.display())]
    NoSupportedModel(PathBuf),

    #[error("{runtime} runtime not available for {}", path.display())]
    RuntimeUnavailable { runtime: &'static str, path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize {}: {reason}", path.display())]
    Deserialize { path: PathBuf, reason: String },

    #[error("{artifact} expects {found} features, flow vector has {expected}")]
    FeatureMismatch {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("scaler fitted on {expected} features, input has {found}")]
    ScalerDimension { expected: usize, found: usize },
}

/// Model invocation failures. The normalizer absorbs these into degraded decisions.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("no rows left to classify")]
    EmptyInput,

    #[error("model expects {expected} features, input has {found}")]
    Dimension { expected: usize, found: usize },

    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("model runtime error: {0}")]
    Runtime(String),
}

/// Per-request input errors.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("No input data provided")]
    MissingData,

    #[error("malformed flow record: {0}")]
    Malformed(#[from] serde_json::Error),
}
