//! Artifact fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;

/// Nine-feature ensemble voting malicious when packet_count > 100.
pub const FOREST: &str = r#"{
  "n_features": 9,
  "n_classes": 2,
  "trees": [
    {"nodes": [
      {"kind": "split", "feature": 0, "threshold": 100.0, "left": 1, "right": 2},
      {"kind": "leaf", "value": [8.0, 2.0]},
      {"kind": "leaf", "value": [1.0, 9.0]}
    ]},
    {"nodes": [
      {"kind": "split", "feature": 0, "threshold": 100.0, "left": 1, "right": 2},
      {"kind": "leaf", "value": [10.0, 0.0]},
      {"kind": "leaf", "value": [3.0, 7.0]}
    ]}
  ]
}"#;

/// Shifts packet_count down by 100, everything else unchanged.
pub const SCALER: &str = r#"{
  "mean": [100, 0, 0, 0, 0, 0, 0, 0, 0],
  "scale": [1, 1, 1, 1, 1, 1, 1, 1, 1]
}"#;

pub const LABELS: &str = r#"{"classes": ["BENIGN", "ATTACK"]}"#;

pub fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

pub fn tree_dir(with_scaler: bool, with_labels: bool) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "random_forest_model.json", FOREST);
    if with_scaler {
        write(dir.path(), "scaler.json", SCALER);
    }
    if with_labels {
        write(dir.path(), "label_encoder.json", LABELS);
    }
    dir
}
