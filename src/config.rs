//! Service configuration. Loaded once at startup from JSON; every field has a default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding the model and its companion artifacts. Unset: probe the
    /// working directory with the tree-first fallback order.
    pub model_dir: Option<PathBuf>,
    /// HTTP listen address
    pub bind_addr: String,
    /// Candidate artifact file names
    pub artifacts: ArtifactCandidates,
    /// Allow neural-network artifacts to be loaded
    pub neural_runtime: bool,
    /// Row validation options
    pub preprocess: PreprocessConfig,
    /// Sample flow served by `GET /test`
    pub test_data_path: PathBuf,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    TreeEnsemble,
    NeuralNetwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub file: String,
    pub family: ModelFamily,
}

impl ModelCandidate {
    pub fn new(file: impl Into<String>, family: ModelFamily) -> Self {
        Self {
            file: file.into(),
            family,
        }
    }
}

/// Ordered probe lists. Evaluated top-to-bottom; the first existing file wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactCandidates {
    pub models: Vec<ModelCandidate>,
    pub scaler: Vec<String>,
    pub label_encoder: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Treat NaN like infinity and drop the row. Off: only infinities are dropped.
    pub drop_nan: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            bind_addr: "0.0.0.0:5000".to_string(),
            artifacts: ArtifactCandidates::default(),
            neural_runtime: true,
            preprocess: PreprocessConfig::default(),
            test_data_path: PathBuf::from("test_data.json"),
            log: LogConfig::default(),
        }
    }
}

impl Default for ArtifactCandidates {
    /// Model-directory layout: neural artifacts first, then tree ensembles.
    fn default() -> Self {
        use ModelFamily::*;
        Self {
            models: vec![
                ModelCandidate::new("model.onnx", NeuralNetwork),
                ModelCandidate::new("keras_model.onnx", NeuralNetwork),
                ModelCandidate::new("model.json", TreeEnsemble),
                ModelCandidate::new("random_forest_model.json", TreeEnsemble),
                ModelCandidate::new("forest.json", TreeEnsemble),
            ],
            scaler: vec!["scaler.json".to_string()],
            label_encoder: vec!["label_encoder.json".to_string()],
        }
    }
}

impl ArtifactCandidates {
    /// Working-directory fallback: tree ensembles take precedence over the network.
    pub fn working_directory() -> Self {
        use ModelFamily::*;
        Self {
            models: vec![
                ModelCandidate::new("random_forest_model.json", TreeEnsemble),
                ModelCandidate::new("model.json", TreeEnsemble),
                ModelCandidate::new("model.onnx", NeuralNetwork),
            ],
            ..Self::default()
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ServiceConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<ServiceConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Apply `MODEL_FOLDER` and `DEBUG` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("MODEL_FOLDER") {
            if !dir.is_empty() {
                self.model_dir = Some(PathBuf::from(dir));
            }
        }
        if std::env::var("DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
        {
            self.log.level = "debug".to_string();
        }
        self
    }
}
