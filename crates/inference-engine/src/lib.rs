//! RUL Inference Engine
//!
//! Loads regressors and scalers through a pluggable provider, runs them on
//! assembled feature vectors, and rescales hydraulics output for display.

mod artifact;
mod engine;
mod health;
mod onnx;
mod provider;
mod regressor;
mod rescale;
mod scaler;

pub use artifact::{Aggregation, FeatureManifest, NodeSpec, RegressorArtifact, RegressorSpec, ScalerArtifact, ScalerSpec, TreeSpec};
pub use engine::{
    InferenceEngine, InferenceSettings, RulPrediction, ENGINE_MODEL, ENGINE_SCALER, HYDRAULICS_MODEL, LANDING_GEAR_MODEL,
};
pub use health::HealthZone;
pub use onnx::OnnxRegressor;
pub use provider::{ArtifactProvider, ArtifactSource, CachePolicy, DirectorySource, MemorySource, ModelHandle, ModelProvider};
pub use regressor::{LinearRegressor, Regressor, TreeEnsemble};
pub use rescale::{interpolate, rescale_adaptive, rescale_fixed, round2, RescaleBounds, RescalePolicy};
pub use scaler::{Scaler, ScalerHandle};

use feature_defaults::DefaultsError;
use feature_engine::FeatureError;
use ring_buffer::BufferError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape for '{model}': expected {expected} features, got {actual}")]
    InvalidInputShape { model: String, expected: usize, actual: usize },
    #[error("Model '{model}' declares a feature order that does not match schema {schema}")]
    SchemaMismatch { model: String, schema: &'static str },
    #[error("Unknown model name: {0}")]
    UnknownModel(String),
    #[error("Invalid {name} range [{low}, {high}]: low must be below high")]
    InvalidRange { name: &'static str, low: f64, high: f64 },
    #[error("Invalid artifact '{file}': {reason}")]
    InvalidArtifact { file: String, reason: String },
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Defaults(#[from] DefaultsError),
    #[error("Prediction history unavailable: {0}")]
    History(#[from] BufferError),
}
