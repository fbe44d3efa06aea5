//! Route handlers. Each request reads the shared detector; nothing here mutates it.

use super::error::{AppError, AppResult};
use super::AppState;
use crate::decision::{BatchOutcome, DecisionRecord, ModelInfo};
use crate::features::FlowRecord;
use crate::model::ModelFamily;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> AppResult<Value> {
    body.map(|Json(v)| v)
        .map_err(|r| AppError::BadRequest(format!("invalid JSON body: {}", r.body_text())))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    framework: ModelFamily,
    timestamp: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: true,
        framework: state.detector.bundle().framework,
        timestamp: timestamp(),
    })
}

#[derive(Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    decision: DecisionRecord,
    timestamp: String,
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let flow = FlowRecord::from_json(&json_body(body)?)?;

    let started = Instant::now();
    let decision = state
        .detector
        .predict_flow(&flow)
        .with_inference_time(started.elapsed());
    tracing::debug!(
        prediction = ?decision.prediction(),
        confidence = decision.confidence(),
        degraded = decision.degraded(),
        "flow classified"
    );

    Ok(Json(PredictResponse {
        decision,
        timestamp: timestamp(),
    }))
}

#[derive(Serialize)]
pub struct BatchResponse {
    #[serde(flatten)]
    outcome: BatchOutcome,
    timestamp: String,
}

pub async fn predict_batch(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BatchResponse>> {
    let body = json_body(body)?;
    let items = body
        .get("flows")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::BadRequest("No flows data provided".to_string()))?;

    let flows = items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            FlowRecord::deserialize_item(v)
                .map_err(|e| AppError::BadRequest(format!("flow {i}: {e}")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let outcome = state.detector.predict_batch(&flows);
    tracing::info!(
        total = outcome.total_flows,
        malicious = outcome.malicious_count,
        "batch classified"
    );
    Ok(Json(BatchResponse {
        outcome,
        timestamp: timestamp(),
    }))
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.detector.model_info())
}

/// Run the configured sample flow through the full pipeline.
pub async fn test_prediction(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let failed = |msg: String| AppError::Internal(format!("Test prediction failed: {msg}"));

    let data = tokio::fs::read_to_string(&state.test_data_path)
        .await
        .map_err(|e| failed(format!("{}: {e}", state.test_data_path.display())))?;
    let input: Value = serde_json::from_str(&data).map_err(|e| failed(e.to_string()))?;
    let flow = FlowRecord::from_json(&input).map_err(|e| failed(e.to_string()))?;

    let result = state.detector.predict_flow(&flow);
    Ok(Json(json!({
        "test_input": input,
        "prediction_result": result,
        "status": "success"
    })))
}
