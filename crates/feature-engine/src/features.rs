//! Feature Vector types

use feature_defaults::Subsystem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::FeatureError;

/// Partial mapping from feature name to value, as supplied by a caller
pub type FeaturePayload = HashMap<String, f64>;

/// Assembled, model-ready feature vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Subsystem whose schema the values follow
    pub subsystem: Subsystem,
    /// Values in schema order
    pub values: Vec<f64>,
    /// Timestamp when the vector was assembled
    pub timestamp_ms: u64,
}

impl FeatureVector {
    pub fn new(subsystem: Subsystem, values: Vec<f64>) -> Self {
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            subsystem,
            values,
            timestamp_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// First `n` values, for diagnostics
    pub fn head(&self, n: usize) -> &[f64] {
        &self.values[..n.min(self.values.len())]
    }
}

/// Pre-fitted row transform applied after imputation (e.g. a fitted scaler)
pub trait RowTransform {
    /// Number of columns the transform was fit on
    fn n_features(&self) -> usize;

    /// Transform one row
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, FeatureError>;
}
