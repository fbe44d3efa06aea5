//! Tree-ensemble classifier stored as JSON. Probabilities are the mean of the
//! per-tree leaf class distributions; the predicted class is their argmax.

use crate::error::{InferenceError, LoadError};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go left iff `x[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    /// Class counts or weights at this leaf
    Leaf { value: Vec<f32> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl DecisionTree {
    fn leaf(&self, x: &[f32]) -> &[f32] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[*feature] <= *threshold { *left } else { *right },
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|reason| LoadError::Deserialize {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_json(data: &str) -> Result<Self, String> {
        let forest: Self = serde_json::from_str(data).map_err(|e| e.to_string())?;
        forest.prepared()
    }

    /// Check structure and normalize leaves into class distributions.
    /// Children must point forward, so traversal always terminates.
    fn prepared(mut self) -> Result<Self, String> {
        if self.trees.is_empty() {
            return Err("ensemble has no trees".into());
        }
        if self.n_classes == 0 {
            return Err("n_classes must be positive".into());
        }
        for (t, tree) in self.trees.iter_mut().enumerate() {
            let len = tree.nodes.len();
            if len == 0 {
                return Err(format!("tree {t} has no nodes"));
            }
            for (i, node) in tree.nodes.iter_mut().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.n_features {
                            return Err(format!(
                                "tree {t} node {i}: feature {feature} out of range"
                            ));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= len {
                                return Err(format!("tree {t} node {i}: bad child index {child}"));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.n_classes {
                            return Err(format!(
                                "tree {t} node {i}: leaf has {} classes, expected {}",
                                value.len(),
                                self.n_classes
                            ));
                        }
                        let total: f32 = value.iter().sum();
                        if total > 0.0 {
                            value.iter_mut().for_each(|v| *v /= total);
                        }
                    }
                }
            }
        }
        Ok(self)
    }

    pub fn predict_proba(&self, rows: ArrayView2<f32>) -> Result<Array2<f32>, InferenceError> {
        if rows.ncols() != self.n_features {
            return Err(InferenceError::Dimension {
                expected: self.n_features,
                found: rows.ncols(),
            });
        }
        let mut out = Array2::<f32>::zeros((rows.nrows(), self.n_classes));
        let weight = 1.0 / self.trees.len() as f32;
        for (row, mut probs) in rows.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
            let x = row.to_vec();
            for tree in &self.trees {
                for (p, v) in probs.iter_mut().zip(tree.leaf(&x)) {
                    *p += v * weight;
                }
            }
        }
        Ok(out)
    }
}
