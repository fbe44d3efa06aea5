//! Flow feature extraction and the fixed 9-field model input vector.

mod flow;

pub use flow::{extract_features, protocol_number, FlowRecord};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of fields in the model input vector.
pub const FEATURE_COUNT: usize = 9;

/// Model input order. Models are trained on exactly this layout.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "packet_count",
    "byte_count",
    "duration",
    "packets_per_second",
    "bytes_per_second",
    "avg_packet_size",
    "protocol_num",
    "src_port",
    "dst_port",
];

/// Named numeric features of a single flow.
pub type FeatureMap = BTreeMap<String, f64>;

/// Fixed-order feature vector for model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Pick the canonical fields out of `features`; missing names read as zero.
    pub fn from_map(features: &FeatureMap) -> Self {
        let mut values = [0.0f32; FEATURE_COUNT];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            *slot = features.get(name).copied().unwrap_or(0.0) as f32;
        }
        Self { values }
    }

    /// Single-row matrix `[1, FEATURE_COUNT]`.
    pub fn to_row(&self) -> Array2<f32> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| self.values[j])
    }
}
