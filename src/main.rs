//! Flow Sentinel service entrypoint: load the model bundle once, then serve
//! predictions over HTTP until Ctrl-C. Load failures exit before binding.

use flow_sentinel::{
    config::ServiceConfig,
    decision::ThreatDetector,
    features::FEATURE_COUNT,
    logging::StructuredLogger,
    model::ModelBundle,
    server::{self, AppState},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("FLOW_SENTINEL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = ServiceConfig::load(&config_path).with_env_overrides();

    StructuredLogger::init(&config.log);
    info!(model_dir = ?config.model_dir, "flow sentinel starting");

    let bundle = ModelBundle::from_config(&config)
        .and_then(|b| b.check_feature_dim(FEATURE_COUNT).map(|_| b))
        .map_err(|e| {
            error!(error = %e, "failed to load model; refusing to serve");
            e
        })?;
    info!(
        framework = ?bundle.framework,
        model = %bundle.model_path.display(),
        scaler = bundle.scaler.is_some(),
        label_encoder = bundle.label_encoder.is_some(),
        "model ready"
    );

    let state = AppState {
        detector: Arc::new(ThreatDetector::new(bundle, config.preprocess.clone())),
        test_data_path: config.test_data_path.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    server::serve(listener, state).await?;

    info!("flow sentinel stopped");
    Ok(())
}
