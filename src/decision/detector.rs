//! Invokes the loaded model and folds its native output into [`DecisionRecord`]s.
//!
//! Inference faults never surface as errors from [`predict_threat`]: they become
//! benign decisions at 0.5 confidence with `degraded` set, and a warning is logged.

use super::{DecisionRecord, Verdict, DEGRADED_CONFIDENCE};
use crate::error::InferenceError;
use crate::features::{extract_features, FeatureMap, FeatureVector, FlowRecord, FEATURE_NAMES};
use crate::model::{ClassLabel, ModelBundle, ModelFamily, Scores};
use crate::preprocess::{preprocess, PreprocessOptions};
use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;
use std::collections::BTreeMap;

/// Confidence scalar for one call's scores. Multi-column probabilities give
/// their maximum, a single probability column its mean, raw outputs their
/// maximum clamped into [0, 1]. `None` when nothing usable came out.
pub fn confidence_from_scores(scores: &Scores) -> Option<f64> {
    let m = scores.matrix();
    if m.is_empty() {
        return None;
    }
    let max = || m.iter().copied().filter(|v| !v.is_nan()).reduce(f32::max);
    let c = match scores {
        Scores::Probabilities(p) if p.ncols() > 1 => max()?,
        Scores::Probabilities(p) => p.mean()?,
        Scores::Raw(_) => max()?,
    };
    if c.is_nan() {
        None
    } else {
        Some((c as f64).clamp(0.0, 1.0))
    }
}

pub fn predict_threat(
    features: &FeatureMap,
    bundle: &ModelBundle,
    options: &PreprocessOptions,
) -> DecisionRecord {
    let row = FeatureVector::from_map(features).to_row();
    let outcome = preprocess(row.view(), bundle.scaler.as_ref(), options)
        .map_err(InferenceError::from)
        .and_then(|p| bundle.model.classify(p.rows.view()));

    match outcome {
        Ok(c) => {
            let class = c.classes.first().copied().unwrap_or(0);
            let verdict = Verdict::from_class(class);
            match confidence_from_scores(&c.scores) {
                Some(conf) => DecisionRecord::new(verdict, conf, false),
                None => {
                    tracing::warn!(class, "model returned no usable score; confidence defaulted");
                    DecisionRecord::new(verdict, DEGRADED_CONFIDENCE, true)
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "inference failed; returning degraded benign decision");
            DecisionRecord::fallback()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowDecision {
    pub flow_id: serde_json::Value,
    #[serde(flatten)]
    pub decision: DecisionRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub predictions: Vec<FlowDecision>,
    pub total_flows: usize,
    pub malicious_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowPrediction {
    pub class: ClassLabel,
    /// Score per class name (probabilities for tree ensembles, raw outputs for networks)
    pub probabilities: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: &'static str,
    pub framework: ModelFamily,
    pub model_loaded: bool,
    pub features_count: Option<usize>,
    pub feature_names: Vec<&'static str>,
    pub classes: Option<Vec<String>>,
    pub model_file: String,
    pub model_sha256: String,
    pub scaler: bool,
    pub label_encoder: bool,
}

/// Shared, read-only prediction context: the loaded bundle plus row options.
pub struct ThreatDetector {
    bundle: ModelBundle,
    options: PreprocessOptions,
}

impl ThreatDetector {
    pub fn new(bundle: ModelBundle, options: PreprocessOptions) -> Self {
        Self { bundle, options }
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn predict_threat(&self, features: &FeatureMap) -> DecisionRecord {
        predict_threat(features, &self.bundle, &self.options)
    }

    pub fn predict_flow(&self, flow: &FlowRecord) -> DecisionRecord {
        self.predict_threat(&extract_features(flow))
    }

    /// One decision per flow, in input order.
    pub fn predict_batch(&self, flows: &[FlowRecord]) -> BatchOutcome {
        let predictions: Vec<FlowDecision> = flows
            .iter()
            .map(|flow| FlowDecision {
                flow_id: flow
                    .flow_id
                    .clone()
                    .unwrap_or_else(|| serde_json::Value::from("unknown")),
                decision: self.predict_flow(flow),
            })
            .collect();
        let malicious_count = predictions.iter().filter(|p| p.decision.is_malicious()).count();
        BatchOutcome {
            total_flows: predictions.len(),
            malicious_count,
            predictions,
        }
    }

    /// Classify a raw matrix. Rows dropped by preprocessing get no label, so a
    /// matrix with no finite row yields an empty list.
    /// Indices the encoder does not know leave the whole batch as raw indices.
    pub fn predict_labels(&self, rows: ArrayView2<f32>) -> Result<Vec<ClassLabel>, InferenceError> {
        let p = preprocess(rows, self.bundle.scaler.as_ref(), &self.options)?;
        if p.rows.nrows() == 0 {
            return Ok(Vec::new());
        }
        let c = self.bundle.model.classify(p.rows.view())?;

        if let Some(enc) = &self.bundle.label_encoder {
            let names: Option<Vec<ClassLabel>> = c
                .classes
                .iter()
                .map(|&i| enc.inverse_transform(i).map(|n| ClassLabel::Name(n.to_string())))
                .collect();
            match names {
                Some(names) => return Ok(names),
                None => tracing::debug!("label encoder rejected a class index; returning indices"),
            }
        }
        Ok(c.classes.into_iter().map(ClassLabel::Index).collect())
    }

    /// Classify one raw row and report the score of every class.
    pub fn predict_row(&self, values: &[f32]) -> Result<RowPrediction, InferenceError> {
        let row = Array2::from_shape_vec((1, values.len()), values.to_vec())
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;
        let p = preprocess(row.view(), self.bundle.scaler.as_ref(), &self.options)?;
        let c = self.bundle.model.classify(p.rows.view())?;

        let class_name = |i: usize| -> String {
            self.bundle
                .label_encoder
                .as_ref()
                .and_then(|enc| enc.inverse_transform(i))
                .map(str::to_string)
                .unwrap_or_else(|| i.to_string())
        };
        let probabilities = c
            .scores
            .matrix()
            .index_axis(Axis(0), 0)
            .iter()
            .enumerate()
            .map(|(i, &p)| (class_name(i), p))
            .collect();
        let index = c.classes.first().copied().unwrap_or(0);
        let class = match self.bundle.label_encoder.as_ref().and_then(|e| e.inverse_transform(index)) {
            Some(name) => ClassLabel::Name(name.to_string()),
            None => ClassLabel::Index(index),
        };
        Ok(RowPrediction { class, probabilities })
    }

    pub fn model_info(&self) -> ModelInfo {
        let b = &self.bundle;
        ModelInfo {
            model_type: b.model.type_name(),
            framework: b.framework,
            model_loaded: true,
            features_count: b.model.n_features(),
            feature_names: FEATURE_NAMES.to_vec(),
            classes: b.label_encoder.as_ref().map(|e| e.classes().to_vec()),
            model_file: b.model_path.display().to_string(),
            model_sha256: b.model_sha256.clone(),
            scaler: b.scaler.is_some(),
            label_encoder: b.label_encoder.is_some(),
        }
    }
}
