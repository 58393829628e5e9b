//! Fitted linear scalers

use feature_engine::{FeatureError, RowTransform};

use crate::artifact::ScalerSpec;
use crate::InferenceError;

/// Per-column affine transform
#[derive(Debug, Clone)]
pub enum Scaler {
    /// `x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },
    /// `(x - mean) / scale`, zero scale treated as 1
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    pub fn from_spec(spec: ScalerSpec, n_features: usize, file: &str) -> Result<Self, InferenceError> {
        let (a, b) = match &spec {
            ScalerSpec::MinMax { scale, min } => (scale.len(), min.len()),
            ScalerSpec::Standard { mean, scale } => (mean.len(), scale.len()),
        };
        if a != n_features || b != n_features {
            return Err(InferenceError::InvalidArtifact {
                file: file.to_string(),
                reason: format!("scaler parameters ({}, {}) for {} features", a, b, n_features),
            });
        }

        Ok(match spec {
            ScalerSpec::MinMax { scale, min } => Scaler::MinMax { scale, min },
            ScalerSpec::Standard { mean, scale } => Scaler::Standard {
                mean,
                scale: scale.into_iter().map(|s| if s == 0.0 { 1.0 } else { s }).collect(),
            },
        })
    }

    pub fn width(&self) -> usize {
        match self {
            Scaler::MinMax { scale, .. } => scale.len(),
            Scaler::Standard { mean, .. } => mean.len(),
        }
    }

    /// Transform a row of exactly `width()` values
    pub fn apply(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if row.len() != self.width() {
            return Err(InferenceError::InvalidInputShape {
                model: "scaler".to_string(),
                expected: self.width(),
                actual: row.len(),
            });
        }

        Ok(match self {
            Scaler::MinMax { scale, min } => row.iter().zip(scale).zip(min).map(|((x, s), m)| x * s + m).collect(),
            Scaler::Standard { mean, scale } => row.iter().zip(mean).zip(scale).map(|((x, m), s)| (x - m) / s).collect(),
        })
    }
}

/// Loaded scaler with its declared column order
#[derive(Debug, Clone)]
pub struct ScalerHandle {
    pub name: String,
    pub version: String,
    pub feature_names: Vec<String>,
    pub scaler: Scaler,
}

impl RowTransform for ScalerHandle {
    fn n_features(&self) -> usize {
        self.scaler.width()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, FeatureError> {
        self.scaler
            .apply(row)
            .map_err(|e| FeatureError::Transform(format!("{}: {}", self.name, e)))
    }
}
