//! Prediction Routes

use axum::{extract::State, Json};
use feature_defaults::Subsystem;
use feature_engine::{EngineReadings, HydraulicsReadings, LandingGearReadings};
use inference_engine::{HealthZone, InferenceError, RulPrediction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Unit of every reported RUL
pub const UNITS: &str = "cycles";

/// Response for a single prediction
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predicted_rul: f64,
    pub units: &'static str,
    pub model_version: String,
    pub health: HealthZone,
}

impl From<RulPrediction> for PredictionResponse {
    fn from(p: RulPrediction) -> Self {
        Self {
            predicted_rul: p.predicted_rul,
            units: UNITS,
            model_version: p.model_version,
            health: p.health,
        }
    }
}

/// Batch request body
#[derive(Debug, Deserialize)]
pub struct BatchRequest<T> {
    pub items: Vec<T>,
}

/// Batch response body
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub predictions: Vec<PredictionResponse>,
}

/// Run every item; the first failure fails the batch and nothing is recorded
fn predict_all<T>(
    state: &AppState,
    subsystem: Subsystem,
    items: &[T],
    predict: impl Fn(&T) -> Result<RulPrediction, InferenceError>,
) -> Result<Json<BatchResponse>, ApiError> {
    let predictions = match items.iter().map(predict).collect::<Result<Vec<_>, _>>() {
        Ok(predictions) => predictions,
        Err(e) => return Err(state.record_failure(subsystem, e)),
    };

    let predictions = predictions
        .into_iter()
        .map(|p| state.record(subsystem, Ok(p)).map(PredictionResponse::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(BatchResponse { predictions }))
}

pub async fn engine(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EngineReadings>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let prediction = state.record(Subsystem::Engine, state.engine.predict_engine(&body.to_payload()))?;
    Ok(Json(prediction.into()))
}

pub async fn engine_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest<EngineReadings>>,
) -> Result<Json<BatchResponse>, ApiError> {
    predict_all(&state, Subsystem::Engine, &body.items, |r| {
        state.engine.predict_engine(&r.to_payload())
    })
}

pub async fn hydraulics(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HydraulicsReadings>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let prediction = state.record(Subsystem::Hydraulics, state.engine.predict_hydraulics(&body))?;
    Ok(Json(prediction.into()))
}

pub async fn hydraulics_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest<HydraulicsReadings>>,
) -> Result<Json<BatchResponse>, ApiError> {
    predict_all(&state, Subsystem::Hydraulics, &body.items, |r| state.engine.predict_hydraulics(r))
}

pub async fn landing_gear(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LandingGearReadings>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let prediction = state.record(Subsystem::LandingGear, state.engine.predict_landing_gear(&body.to_payload()))?;
    Ok(Json(prediction.into()))
}

pub async fn landing_gear_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest<LandingGearReadings>>,
) -> Result<Json<BatchResponse>, ApiError> {
    predict_all(&state, Subsystem::LandingGear, &body.items, |r| {
        state.engine.predict_landing_gear(&r.to_payload())
    })
}
