//! Class index ↔ class name mapping saved alongside the model.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|e| LoadError::Deserialize {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}

/// A predicted class: its encoded name when an encoder is loaded, else the raw index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Name(String),
    Index(usize),
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassLabel::Name(n) => f.write_str(n),
            ClassLabel::Index(i) => write!(f, "{i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_index_to_name() {
        let enc = LabelEncoder::new(vec!["BENIGN".into(), "DDoS".into()]);
        assert_eq!(enc.inverse_transform(1), Some("DDoS"));
        assert_eq!(enc.inverse_transform(2), None);
        assert_eq!(enc.classes(), ["BENIGN".to_string(), "DDoS".to_string()]);
    }

    #[test]
    fn label_serializes_untagged() {
        assert_eq!(serde_json::to_string(&ClassLabel::Index(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ClassLabel::Name("DDoS".into())).unwrap(),
            "\"DDoS\""
        );
    }
}
