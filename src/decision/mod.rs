//! Canonical decision output and the normalizer that produces it.

mod detector;

pub use detector::{
    confidence_from_scores, predict_threat, BatchOutcome, FlowDecision, ModelInfo, RowPrediction,
    ThreatDetector,
};

use serde::Serialize;

/// Fallback confidence when the model produced no usable score.
pub const DEGRADED_CONFIDENCE: f64 = 0.5;

/// Class index that means malicious. Fixed binary convention.
pub const MALICIOUS_CLASS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Malicious,
    Benign,
}

impl Verdict {
    pub fn from_class(class: usize) -> Self {
        if class == MALICIOUS_CLASS {
            Verdict::Malicious
        } else {
            Verdict::Benign
        }
    }

    pub fn attack_type(self) -> &'static str {
        match self {
            Verdict::Malicious => "anomaly",
            Verdict::Benign => "benign",
        }
    }
}

/// Per-call prediction result. Fields are private so `is_malicious` can only
/// ever be derived from `prediction`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    prediction: Verdict,
    confidence: f64,
    is_malicious: bool,
    attack_type: &'static str,
    /// Milliseconds, filled in by the caller that measured it
    inference_time: f64,
    /// True when confidence or class came from the fallback path
    degraded: bool,
}

impl DecisionRecord {
    pub fn new(prediction: Verdict, confidence: f64, degraded: bool) -> Self {
        let confidence = if confidence.is_nan() {
            DEGRADED_CONFIDENCE
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            prediction,
            confidence,
            is_malicious: prediction == Verdict::Malicious,
            attack_type: prediction.attack_type(),
            inference_time: 0.0,
            degraded,
        }
    }

    /// Benign at 0.5 confidence, flagged degraded.
    pub fn fallback() -> Self {
        Self::new(Verdict::Benign, DEGRADED_CONFIDENCE, true)
    }

    pub fn with_inference_time(mut self, elapsed: std::time::Duration) -> Self {
        self.inference_time = elapsed.as_secs_f64() * 1000.0;
        self
    }

    pub fn prediction(&self) -> Verdict {
        self.prediction
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_malicious(&self) -> bool {
        self.is_malicious
    }

    pub fn attack_type(&self) -> &'static str {
        self.attack_type
    }

    pub fn inference_time(&self) -> f64 {
        self.inference_time
    }

    pub fn degraded(&self) -> bool {
        self.degraded
    }
}
