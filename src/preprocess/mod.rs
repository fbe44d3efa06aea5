//! Row validation and scaling applied before every model call.
//!
//! Rows holding ±infinity are dropped with a warning. NaN passes through unless
//! [`PreprocessOptions::drop_nan`] is set.

mod scaler;

pub use scaler::StandardScaler;

use crate::config::PreprocessConfig;
use crate::error::PreprocessError;
use ndarray::{Array2, ArrayView2, Axis};

pub type PreprocessOptions = PreprocessConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub rows: Array2<f32>,
    /// Rows removed by the finite-value mask
    pub dropped: usize,
}

/// Build a uniform matrix from row slices; every row must have the same width.
pub fn matrix_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Array2<f32>, PreprocessError> {
    let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * width);
    for (i, r) in rows.iter().enumerate() {
        let r = r.as_ref();
        if r.len() != width {
            return Err(PreprocessError::RaggedRows {
                row: i,
                expected: width,
                found: r.len(),
            });
        }
        flat.extend(r.iter().map(|&v| v as f32));
    }
    Array2::from_shape_vec((rows.len(), width), flat).map_err(|_| PreprocessError::RaggedRows {
        row: 0,
        expected: width,
        found: 0,
    })
}

/// Per-row validity: false when any field is infinite (or NaN with `drop_nan`).
pub fn finite_mask(rows: ArrayView2<f32>, options: &PreprocessOptions) -> Vec<bool> {
    rows.axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .all(|v| !v.is_infinite() && !(options.drop_nan && v.is_nan()))
        })
        .collect()
}

pub fn preprocess(
    rows: ArrayView2<f32>,
    scaler: Option<&StandardScaler>,
    options: &PreprocessOptions,
) -> Result<Preprocessed, PreprocessError> {
    let mask = finite_mask(rows, options);
    let keep: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, ok)| ok.then_some(i))
        .collect();
    let dropped = rows.nrows() - keep.len();
    if dropped > 0 {
        tracing::warn!(dropped, kept = keep.len(), "rows with infinite values were removed");
    }

    let mut out = rows.select(Axis(0), &keep);
    if let Some(s) = scaler {
        s.transform(&mut out)?;
    }
    Ok(Preprocessed { rows: out, dropped })
}
