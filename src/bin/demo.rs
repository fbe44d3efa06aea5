//! Load a model folder (`MODEL_FOLDER`, else the working directory with the
//! tree-first order) and classify a few random rows, printing one JSON line per
//! prediction.

use flow_sentinel::{
    config::{ArtifactCandidates, LogConfig, PreprocessConfig},
    decision::ThreatDetector,
    features::FEATURE_COUNT,
    logging::StructuredLogger,
    model::{ArtifactLoader, ModelBundle},
};
use ndarray::Array2;
use rand::Rng;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    StructuredLogger::init(&LogConfig {
        level: "warn".to_string(),
        json: false,
    });

    let loaded = match std::env::var("MODEL_FOLDER") {
        Ok(folder) if !folder.is_empty() => {
            ArtifactLoader::new(ArtifactCandidates::default()).load(&PathBuf::from(folder))
        }
        _ => ModelBundle::load_working_directory(),
    };
    let bundle = match loaded {
        Ok(b) => b,
        Err(e) => {
            eprintln!("load failed: {e}");
            return Err(e.into());
        }
    };
    let width = bundle.model.n_features().unwrap_or(FEATURE_COUNT);
    let detector = ThreatDetector::new(bundle, PreprocessConfig::default());

    let mut rng = rand::thread_rng();
    let rows = Array2::from_shape_simple_fn((5, width), || rng.gen_range(-1.0f32..1.0));
    let labels = detector.predict_labels(rows.view())?;

    let mut out = std::io::stdout();
    for (i, label) in labels.iter().enumerate() {
        StructuredLogger::emit_json(&serde_json::json!({ "row": i, "label": label }), &mut out);
    }
    Ok(())
}
