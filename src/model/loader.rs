//! Artifact discovery: pick the model family present in a directory and load it
//! together with its optional scaler and label encoder.

use super::{LabelEncoder, Model, ModelFamily, TreeEnsemble};
use crate::config::{ArtifactCandidates, ServiceConfig};
use crate::error::LoadError;
use crate::preprocess::StandardScaler;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Whether neural-network artifacts can be executed in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NeuralRuntime {
    Onnx,
    Unavailable,
}

impl NeuralRuntime {
    pub fn detect() -> Self {
        if cfg!(feature = "onnx") {
            NeuralRuntime::Onnx
        } else {
            NeuralRuntime::Unavailable
        }
    }
}

/// Model plus companions. Immutable after load; share it behind an `Arc`.
pub struct ModelBundle {
    pub model: Model,
    pub scaler: Option<StandardScaler>,
    pub label_encoder: Option<LabelEncoder>,
    pub framework: ModelFamily,
    pub folder: PathBuf,
    pub model_path: PathBuf,
    /// Hex sha256 of the model file
    pub model_sha256: String,
}

impl ModelBundle {
    /// Probe the current working directory with the tree-first fallback order.
    pub fn load_working_directory() -> Result<Self, LoadError> {
        ArtifactLoader::new(ArtifactCandidates::working_directory()).load(Path::new("."))
    }

    /// Load from `model_dir` when configured, otherwise fall back to the working directory.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, LoadError> {
        match &config.model_dir {
            Some(dir) => ArtifactLoader::from_config(config).load(dir),
            None => {
                tracing::info!("no model folder configured; probing working directory");
                ArtifactLoader::working_directory(config).load(Path::new("."))
            }
        }
    }

    /// Fail unless the scaler and model (where they declare a width) take `expected` features.
    pub fn check_feature_dim(&self, expected: usize) -> Result<(), LoadError> {
        if let Some(s) = &self.scaler {
            if s.n_features() != expected {
                return Err(LoadError::FeatureMismatch {
                    artifact: "scaler",
                    expected,
                    found: s.n_features(),
                });
            }
        }
        if let Some(n) = self.model.n_features() {
            if n != expected {
                return Err(LoadError::FeatureMismatch {
                    artifact: "model",
                    expected,
                    found: n,
                });
            }
        }
        Ok(())
    }
}

pub struct ArtifactLoader {
    candidates: ArtifactCandidates,
    neural: NeuralRuntime,
}

impl ArtifactLoader {
    pub fn new(candidates: ArtifactCandidates) -> Self {
        Self {
            candidates,
            neural: NeuralRuntime::detect(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let loader = Self::new(config.artifacts.clone());
        if config.neural_runtime {
            loader
        } else {
            loader.with_neural_runtime(NeuralRuntime::Unavailable)
        }
    }

    /// Same companions and runtime as [`ArtifactLoader::from_config`], but with the
    /// working-directory model order: tree ensembles before `model.onnx`.
    pub fn working_directory(config: &ServiceConfig) -> Self {
        let mut loader = Self::from_config(config);
        loader.candidates.models = ArtifactCandidates::working_directory().models;
        loader
    }

    pub fn with_neural_runtime(mut self, runtime: NeuralRuntime) -> Self {
        self.neural = runtime;
        self
    }

    /// First existing model candidate in `dir`, in configured order.
    pub fn locate(&self, dir: &Path) -> Result<(PathBuf, ModelFamily), LoadError> {
        self.candidates
            .models
            .iter()
            .map(|c| (dir.join(&c.file), c.family))
            .find(|(p, _)| p.is_file())
            .ok_or_else(|| LoadError::NoSupportedModel(dir.to_path_buf()))
    }

    pub fn load(&self, dir: &Path) -> Result<ModelBundle, LoadError> {
        let (model_path, family) = self.locate(dir)?;
        tracing::info!(path = %model_path.display(), family = ?family, "loading model");

        let model = match family {
            ModelFamily::TreeEnsemble => Model::TreeEnsemble(TreeEnsemble::load(&model_path)?),
            ModelFamily::NeuralNetwork => self.load_network(&model_path)?,
        };
        let model_sha256 = file_digest(&model_path)?;

        let scaler = first_existing(dir, &self.candidates.scaler)
            .map(|p| StandardScaler::load(&p))
            .transpose()?;
        let label_encoder = first_existing(dir, &self.candidates.label_encoder)
            .map(|p| LabelEncoder::load(&p))
            .transpose()?;
        tracing::info!(
            scaler = scaler.is_some(),
            label_encoder = label_encoder.is_some(),
            "companion artifacts probed"
        );

        Ok(ModelBundle {
            model,
            scaler,
            label_encoder,
            framework: family,
            folder: dir.to_path_buf(),
            model_path,
            model_sha256,
        })
    }

    #[cfg(feature = "onnx")]
    fn load_network(&self, path: &Path) -> Result<Model, LoadError> {
        match self.neural {
            NeuralRuntime::Onnx => Ok(Model::NeuralNetwork(super::OnnxNetwork::load(path)?)),
            NeuralRuntime::Unavailable => Err(runtime_unavailable(path)),
        }
    }

    #[cfg(not(feature = "onnx"))]
    fn load_network(&self, path: &Path) -> Result<Model, LoadError> {
        Err(runtime_unavailable(path))
    }
}

fn runtime_unavailable(path: &Path) -> LoadError {
    LoadError::RuntimeUnavailable {
        runtime: "ONNX",
        path: path.to_path_buf(),
    }
}

fn first_existing(dir: &Path, names: &[String]) -> Option<PathBuf> {
    names.iter().map(|n| dir.join(n)).find(|p| p.is_file())
}

fn file_digest(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forest::tests::stump_forest_json;

    #[test]
    fn locate_follows_candidate_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("forest.json"), "{}").unwrap();
        std::fs::write(dir.path().join("random_forest_model.json"), "{}").unwrap();

        let loader = ArtifactLoader::new(ArtifactCandidates::default());
        let (path, family) = loader.locate(dir.path()).unwrap();
        assert!(path.ends_with("random_forest_model.json"));
        assert_eq!(family, ModelFamily::TreeEnsemble);
    }

    #[test]
    fn digest_is_hex_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, stump_forest_json(9)).unwrap();
        let d = file_digest(&path).unwrap();
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn configured_folder_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("forest.json"), stump_forest_json(9)).unwrap();
        let config = ServiceConfig {
            model_dir: Some(dir.path().to_path_buf()),
            ..ServiceConfig::default()
        };
        let bundle = ModelBundle::from_config(&config).unwrap();
        assert!(bundle.model_path.ends_with("forest.json"));
        assert_eq!(bundle.folder, dir.path());
    }

    #[test]
    fn mismatched_scaler_fails_dimension_check() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.json"), stump_forest_json(9)).unwrap();
        std::fs::write(dir.path().join("scaler.json"), r#"{"mean":[0,0],"scale":[1,1]}"#).unwrap();

        let bundle = ArtifactLoader::new(ArtifactCandidates::default())
            .load(dir.path())
            .unwrap();
        assert!(matches!(
            bundle.check_feature_dim(9),
            Err(LoadError::FeatureMismatch { artifact: "scaler", found: 2, .. })
        ));
    }
}
