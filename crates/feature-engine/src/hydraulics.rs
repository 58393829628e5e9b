//! Hydraulics Assembler
//!
//! Reconstructs the 65-column aggregate vector from eight user readings with
//! fixed correlation heuristics plus bounded noise. Anything the heuristics
//! do not produce is back-filled from the defaults table.

use feature_defaults::{FeatureStats, Subsystem};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::impute::to_finite;
use crate::schema::HYDRAULICS_FEATURES;
use crate::{FeatureError, FeatureVector, Jitter};

/// Final multiplier applied to the whole vector
pub const HYDRAULICS_POST_SCALE: f64 = 1.5;

/// Pressure sensors whose means are propagated from the PS5/PS6 average
const PROPAGATED_PRESSURES: [&str; 5] = ["PS1_mean", "PS2_mean", "PS3_mean", "PS4_mean", "PS5_mean"];

/// The eight aggregate readings a caller supplies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydraulicsReadings {
    #[serde(rename = "PS6_mean")]
    pub ps6_mean: f64,
    #[serde(rename = "PS5_mean")]
    pub ps5_mean: f64,
    #[serde(rename = "CE_mean")]
    pub ce_mean: f64,
    #[serde(rename = "TS4_mean")]
    pub ts4_mean: f64,
    #[serde(rename = "TS2_mean")]
    pub ts2_mean: f64,
    #[serde(rename = "TS1_mean")]
    pub ts1_mean: f64,
    #[serde(rename = "CP_mean")]
    pub cp_mean: f64,
    #[serde(rename = "TS3_mean")]
    pub ts3_mean: f64,
}

/// Check that a non-empty hydraulics defaults section covers exactly the declared columns
pub fn validate_hydraulics_defaults(stats: &FeatureStats) -> Result<(), FeatureError> {
    if stats.is_empty() {
        return Ok(());
    }

    let declared: HashSet<&str> = HYDRAULICS_FEATURES.iter().copied().collect();
    let mut missing: Vec<String> = HYDRAULICS_FEATURES
        .iter()
        .filter(|f| !stats.contains(f))
        .map(|f| f.to_string())
        .collect();
    let mut unexpected: Vec<String> = stats
        .features()
        .filter(|f| !declared.contains(f))
        .map(str::to_string)
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }
    missing.sort();
    unexpected.sort();
    Err(FeatureError::OrderMismatch { missing, unexpected })
}

/// Build the hydraulics vector in declared order
pub fn assemble_hydraulics(
    readings: &HydraulicsReadings,
    stats: &FeatureStats,
    jitter: &mut dyn Jitter,
) -> FeatureVector {
    let mut vals: HashMap<&str, f64> = HashMap::with_capacity(HYDRAULICS_FEATURES.len());
    vals.insert("PS6_mean", readings.ps6_mean);
    vals.insert("PS5_mean", readings.ps5_mean);
    vals.insert("CE_mean", readings.ce_mean);
    vals.insert("TS4_mean", readings.ts4_mean);
    vals.insert("TS2_mean", readings.ts2_mean);
    vals.insert("TS1_mean", readings.ts1_mean);
    vals.insert("CP_mean", readings.cp_mean);
    vals.insert("TS3_mean", readings.ts3_mean);

    // Temperatures
    let avg_temp = (readings.ts1_mean + readings.ts2_mean + readings.ts3_mean + readings.ts4_mean) / 4.0;
    vals.insert("SE_mean", avg_temp * 1.15 + jitter.uniform(-2.0, 2.0));

    // Pressure propagation; PS5_mean is overwritten as well
    let avg_ps = (readings.ps5_mean + readings.ps6_mean) / 2.0;
    for name in PROPAGATED_PRESSURES {
        vals.insert(name, avg_ps * (0.9 + jitter.uniform(-0.03, 0.03)));
    }

    // Flow
    vals.insert("FS1_mean", 5.0 + jitter.uniform(-0.5, 0.5) + 0.002 * (avg_ps - 2500.0));
    vals.insert("FS2_mean", 8.0 + jitter.uniform(-0.3, 0.3) + 0.0015 * (avg_ps - 2500.0));

    // Efficiency
    let ce = readings.ce_mean;
    vals.insert("CE_std", (ce * 0.01 + jitter.uniform(0.0, 0.05)).abs());
    vals.insert("CE_min", ce * 0.9);
    vals.insert("CE_max", ce * 1.1);

    let cp = readings.cp_mean;
    vals.insert("CP_std", (cp * 0.02 + jitter.uniform(0.0, 0.05)).abs());
    vals.insert("CP_min", cp * 0.9);
    vals.insert("CP_max", cp * 1.1);

    // Vibration, independent of input
    let vs1 = jitter.uniform(0.55, 0.75);
    vals.insert("VS1_mean", vs1);
    vals.insert("VS1_std", jitter.uniform(0.02, 0.08));
    vals.insert("VS1_min", vs1 * 0.9);
    vals.insert("VS1_max", vs1 * 1.1);

    let synthesized = vals.len();
    let values: Vec<f64> = HYDRAULICS_FEATURES
        .iter()
        .map(|&feature| {
            let raw = vals
                .get(feature)
                .copied()
                .or_else(|| stats.mean(feature))
                .unwrap_or(0.0);
            to_finite((raw * HYDRAULICS_POST_SCALE).max(0.0))
        })
        .collect();

    debug!(
        "Hydraulics vector: avg_temp={:.2}, avg_ps={:.2}, synthesized={}, head={:?}",
        avg_temp,
        avg_ps,
        synthesized,
        &values[..5]
    );
    FeatureVector::new(Subsystem::Hydraulics, values)
}
