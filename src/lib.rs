//! Flow Sentinel: classify network flows as benign or malicious with a
//! previously trained model.
//!
//! Modular structure:
//! - [`features`]: Flow record → fixed 9-field feature vector
//! - [`preprocess`]: Infinite-row filtering and standard scaling
//! - [`model`]: Tree-ensemble / ONNX models and artifact discovery
//! - [`decision`]: Output normalization into decision records
//! - [`server`]: HTTP routes
//! - [`logging`]: Structured JSON logging

pub mod config;
pub mod decision;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod preprocess;
pub mod server;

pub use config::ServiceConfig;
pub use decision::{predict_threat, DecisionRecord, ThreatDetector, Verdict};
pub use error::{FlowError, InferenceError, LoadError, PreprocessError};
pub use features::{extract_features, FeatureMap, FeatureVector, FlowRecord};
pub use logging::StructuredLogger;
pub use model::{ArtifactLoader, ModelBundle};
pub use preprocess::{preprocess, StandardScaler};
