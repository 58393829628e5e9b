//! Engine Assembler

use feature_defaults::{FeatureStats, Subsystem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::impute::impute_row;
use crate::schema::ENGINE_FEATURES;
use crate::{FeatureError, FeaturePayload, FeatureVector, RowTransform};

/// Engine request body: six required readings, any other engine feature optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReadings {
    pub op_setting_1: f64,
    pub op_setting_2: f64,
    pub op_setting_3: f64,
    pub sensor_4: f64,
    pub sensor_11: f64,
    pub sensor_12: f64,
    /// Additional features, e.g. `time_in_cycles` or `sensor_7`
    #[serde(flatten)]
    pub additional: HashMap<String, f64>,
}

impl EngineReadings {
    pub fn to_payload(&self) -> FeaturePayload {
        let mut payload = self.additional.clone();
        payload.insert("op_setting_1".into(), self.op_setting_1);
        payload.insert("op_setting_2".into(), self.op_setting_2);
        payload.insert("op_setting_3".into(), self.op_setting_3);
        payload.insert("sensor_4".into(), self.sensor_4);
        payload.insert("sensor_11".into(), self.sensor_11);
        payload.insert("sensor_12".into(), self.sensor_12);
        payload
    }
}

/// Impute the full engine row without scaling
pub fn impute_engine(payload: &FeaturePayload, stats: &FeatureStats) -> Vec<f64> {
    impute_row(&ENGINE_FEATURES, payload, stats)
}

/// Impute the engine row and apply the fitted scaler
pub fn assemble_engine(
    payload: &FeaturePayload,
    stats: &FeatureStats,
    scaler: &dyn RowTransform,
) -> Result<FeatureVector, FeatureError> {
    let row = impute_engine(payload, stats);

    if scaler.n_features() != row.len() {
        return Err(FeatureError::LengthMismatch {
            schema: "engine",
            expected: row.len(),
            actual: scaler.n_features(),
        });
    }

    let scaled = scaler.transform(&row)?;
    if scaled.len() != row.len() {
        return Err(FeatureError::LengthMismatch {
            schema: "engine",
            expected: row.len(),
            actual: scaled.len(),
        });
    }

    let vector = FeatureVector::new(Subsystem::Engine, scaled);
    debug!("Engine vector: len={}, head={:?}", vector.len(), vector.head(5));
    Ok(vector)
}
