//! ONNX Runtime inference for neural-network artifacts.
//! Input: [rows, n_features] f32. Output: first graph output, read as [rows, k] raw scores.

use crate::error::{InferenceError, LoadError};
use ndarray::{Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;

pub struct OnnxNetwork {
    // ort needs `&mut Session` to run; the lock only serializes calls into the runtime.
    session: Mutex<Session>,
    output_name: String,
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> LoadError {
    LoadError::Deserialize {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn runtime_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Runtime(e.to_string())
}

impl OnnxNetwork {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }

        let session = Session::builder()
            .map_err(|e| load_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(path, e))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| load_error(path, "graph has no outputs"))?;

        tracing::info!(path = %path.display(), output = %output_name, "ONNX model loaded");
        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }

    /// Run the graph; one row of raw outputs per input row.
    pub fn predict_raw(&self, rows: ArrayView2<f32>) -> Result<Array2<f32>, InferenceError> {
        let n = rows.nrows();
        if n == 0 {
            return Err(InferenceError::EmptyInput);
        }
        let input = Value::from_array(rows.to_owned()).map_err(runtime_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| runtime_error("session lock poisoned"))?;
        let outputs = session.run(ort::inputs![input]).map_err(runtime_error)?;
        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| runtime_error(format!("missing output {}", self.output_name)))?;
        let (_, data) = output.try_extract_tensor::<f32>().map_err(runtime_error)?;

        if data.is_empty() || data.len() % n != 0 {
            return Err(runtime_error(format!(
                "output of {} values does not split into {n} rows",
                data.len()
            )));
        }
        Array2::from_shape_vec((n, data.len() / n), data.to_vec()).map_err(runtime_error)
    }
}
