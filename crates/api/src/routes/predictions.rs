//! Prediction Log Routes

use axum::{
    extract::{Query, State},
    Json,
};
use feature_defaults::Subsystem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};
use storage::PredictionRecord;

/// Query parameters for predictions endpoint
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    /// Filter by subsystem
    pub subsystem: Option<String>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for predictions endpoint
#[derive(Debug, Serialize)]
pub struct PredictionLogResponse {
    pub data: Vec<PredictionRecord>,
    pub count: usize,
}

/// Get recent predictions, newest first
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictionQuery>,
) -> Result<Json<PredictionLogResponse>, ApiError> {
    let limit = params.limit.min(500);
    let subsystem = params
        .subsystem
        .as_deref()
        .map(|s| s.parse::<Subsystem>().map_err(|_| ApiError::UnknownSubsystem(s.to_string())))
        .transpose()?;

    let data = state.repository.get_predictions(subsystem, limit)?;

    Ok(Json(PredictionLogResponse {
        count: data.len(),
        data,
    }))
}
