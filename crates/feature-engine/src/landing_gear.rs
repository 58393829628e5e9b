//! Landing-Gear Assembler

use feature_defaults::{FeatureStats, Subsystem};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::impute::to_finite;
use crate::schema::LANDING_GEAR_FEATURES;
use crate::{FeaturePayload, FeatureVector};

/// Landing-gear request body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingGearReadings {
    pub load_during_landing: f64,
    pub tire_pressure: f64,
    pub speed_during_landing: f64,
}

impl LandingGearReadings {
    pub fn to_payload(&self) -> FeaturePayload {
        FeaturePayload::from([
            ("load_during_landing".to_string(), self.load_during_landing),
            ("tire_pressure".to_string(), self.tire_pressure),
            ("speed_during_landing".to_string(), self.speed_during_landing),
        ])
    }
}

/// Supplied values override defaults; no clamping.
pub fn assemble_landing_gear(payload: &FeaturePayload, stats: &FeatureStats) -> FeatureVector {
    let values: Vec<f64> = LANDING_GEAR_FEATURES
        .iter()
        .map(|&feature| {
            let v = payload
                .get(feature)
                .copied()
                .or_else(|| stats.mean(feature))
                .unwrap_or(0.0);
            to_finite(v)
        })
        .collect();

    debug!("Landing-gear vector: {:?}", values);
    FeatureVector::new(Subsystem::LandingGear, values)
}
