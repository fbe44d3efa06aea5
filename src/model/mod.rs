//! Loaded classifiers behind one interface.
//!
//! - [`TreeEnsemble`]: JSON tree ensemble, produces class probabilities
//! - `OnnxNetwork`: ONNX graph (feature `onnx`), produces raw scores
//! - [`ArtifactLoader`]: finds and loads a model plus scaler / label encoder

mod forest;
mod labels;
mod loader;
#[cfg(feature = "onnx")]
mod onnx;

pub use crate::config::ModelFamily;
pub use forest::{DecisionTree, TreeEnsemble, TreeNode};
pub use labels::{ClassLabel, LabelEncoder};
pub use loader::{ArtifactLoader, ModelBundle, NeuralRuntime};
#[cfg(feature = "onnx")]
pub use onnx::OnnxNetwork;

use crate::error::InferenceError;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

pub enum Model {
    TreeEnsemble(TreeEnsemble),
    #[cfg(feature = "onnx")]
    NeuralNetwork(OnnxNetwork),
}

/// Native score output, tagged by what the values mean.
#[derive(Debug, Clone, PartialEq)]
pub enum Scores {
    /// Class probabilities, rows sum to 1
    Probabilities(Array2<f32>),
    /// Unnormalized network outputs (post-softmax or otherwise)
    Raw(Array2<f32>),
}

impl Scores {
    pub fn matrix(&self) -> &Array2<f32> {
        match self {
            Scores::Probabilities(m) | Scores::Raw(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Predicted class index per input row
    pub classes: Vec<usize>,
    pub scores: Scores,
}

impl Model {
    pub fn family(&self) -> ModelFamily {
        match self {
            Model::TreeEnsemble(_) => ModelFamily::TreeEnsemble,
            #[cfg(feature = "onnx")]
            Model::NeuralNetwork(_) => ModelFamily::NeuralNetwork,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Model::TreeEnsemble(_) => "TreeEnsembleModel",
            #[cfg(feature = "onnx")]
            Model::NeuralNetwork(_) => "NeuralNetworkModel",
        }
    }

    /// Input width, when the artifact declares it.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Model::TreeEnsemble(f) => Some(f.n_features),
            #[cfg(feature = "onnx")]
            Model::NeuralNetwork(_) => None,
        }
    }

    pub fn classify(&self, rows: ArrayView2<f32>) -> Result<Classification, InferenceError> {
        if rows.nrows() == 0 {
            return Err(InferenceError::EmptyInput);
        }
        match self {
            Model::TreeEnsemble(f) => {
                let proba = f.predict_proba(rows)?;
                let classes = proba.axis_iter(Axis(0)).map(argmax).collect();
                Ok(Classification {
                    classes,
                    scores: Scores::Probabilities(proba),
                })
            }
            #[cfg(feature = "onnx")]
            Model::NeuralNetwork(n) => {
                let raw = n.predict_raw(rows)?;
                let classes = raw.axis_iter(Axis(0)).map(argmax).collect();
                Ok(Classification {
                    classes,
                    scores: Scores::Raw(raw),
                })
            }
        }
    }
}

/// Index of the first maximum; NaN never wins. A single column always yields 0.
pub(crate) fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    let mut best_v = f32::NEG_INFINITY;
    for (i, &v) in row.iter().enumerate() {
        if v > best_v {
            best = i;
            best_v = v;
        }
    }
    best
}
