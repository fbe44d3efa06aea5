//! Standard scaler fitted at training time: `(x - mean) / scale` per feature.

use crate::error::{LoadError, PreprocessError};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f32>, scale: Vec<f32>) -> Self {
        Self { mean, scale }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scaler: Self = serde_json::from_str(&data).map_err(|e| LoadError::Deserialize {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if scaler.mean.len() != scaler.scale.len() {
            return Err(LoadError::Deserialize {
                path: path.to_path_buf(),
                reason: format!(
                    "mean has {} entries, scale has {}",
                    scaler.mean.len(),
                    scaler.scale.len()
                ),
            });
        }
        Ok(scaler)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Scale in place. A zero (or non-finite) scale leaves the centered value unscaled.
    pub fn transform(&self, rows: &mut Array2<f32>) -> Result<(), PreprocessError> {
        if rows.ncols() != self.n_features() {
            return Err(PreprocessError::ScalerDimension {
                expected: self.n_features(),
                found: rows.ncols(),
            });
        }
        for mut row in rows.axis_iter_mut(Axis(0)) {
            for (j, x) in row.iter_mut().enumerate() {
                let s = self.scale[j];
                let s = if s == 0.0 || !s.is_finite() { 1.0 } else { s };
                *x = (*x - self.mean[j]) / s;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn centers_and_scales() {
        let s = StandardScaler::new(vec![1.0, 10.0], vec![2.0, 0.0]);
        let mut rows = array![[3.0f32, 12.0], [1.0, 10.0]];
        s.transform(&mut rows).unwrap();
        assert_eq!(rows, array![[1.0f32, 2.0], [0.0, 0.0]]);
    }

    #[test]
    fn rejects_wrong_width() {
        let s = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]);
        let mut rows = array![[1.0f32, 2.0]];
        assert_eq!(
            s.transform(&mut rows),
            Err(PreprocessError::ScalerDimension { expected: 3, found: 2 })
        );
    }

    #[test]
    fn load_rejects_mismatched_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, r#"{"mean":[0,0],"scale":[1]}"#).unwrap();
        assert!(matches!(StandardScaler::load(&path), Err(LoadError::Deserialize { .. })));
    }
}
