//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::InferenceError;
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Unknown subsystem: {0}")]
    UnknownSubsystem(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

impl ApiError {
    /// Status code and stable machine-readable code
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Inference(e) => match e {
                InferenceError::InvalidInputShape { .. }
                | InferenceError::SchemaMismatch { .. }
                | InferenceError::Feature(_) => (StatusCode::INTERNAL_SERVER_ERROR, "schema_mismatch"),
                InferenceError::ModelLoadError(_) | InferenceError::InvalidArtifact { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "model_unavailable")
                }
                InferenceError::UnknownModel(_) => (StatusCode::NOT_FOUND, "unknown_model"),
                InferenceError::InferenceFailed(_)
                | InferenceError::InvalidRange { .. }
                | InferenceError::Defaults(_)
                | InferenceError::History(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "inference_failed")
                }
            },
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            ApiError::UnknownSubsystem(_) => (StatusCode::NOT_FOUND, "unknown_subsystem"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        warn!("Request failed ({}): {}", code, self);
        let body = ErrorBody {
            error: code,
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
