//! Imputation Engine
//!
//! Merges a partial payload with learned statistics: missing or NaN values
//! take the feature mean, known features are clamped into `[min, max]`, and
//! any residual non-finite value is replaced by a fixed sentinel.

use feature_defaults::{FeatureStat, FeatureStats};
use tracing::{debug, warn};

use crate::FeaturePayload;

/// Replacement for `+inf`
pub const POS_INF_SENTINEL: f64 = 1e6;
/// Replacement for `-inf`
pub const NEG_INF_SENTINEL: f64 = -1e6;

/// Map NaN to 0 and infinities to `±1e6`
pub fn to_finite(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value == f64::INFINITY {
        POS_INF_SENTINEL
    } else if value == f64::NEG_INFINITY {
        NEG_INF_SENTINEL
    } else {
        value
    }
}

/// Impute a single value against an optional statistic
pub fn impute_value(value: Option<f64>, stat: Option<&FeatureStat>) -> f64 {
    let value = match value {
        Some(v) if !v.is_nan() => v,
        _ => stat.map_or(0.0, |s| s.mean),
    };

    let value = match stat {
        Some(s) => s.clamp(value),
        None => value,
    };

    to_finite(value)
}

/// Build a complete row in `features` order.
///
/// The result always has exactly `features.len()` finite values.
pub fn impute_row(features: &[&str], payload: &FeaturePayload, stats: &FeatureStats) -> Vec<f64> {
    let mut defaulted = 0usize;

    let row: Vec<f64> = features
        .iter()
        .map(|&feature| {
            let stat = stats.get(feature);
            let supplied = payload.get(feature).copied();

            match (supplied, stat) {
                (None, _) => defaulted += 1,
                (Some(v), Some(s)) if !v.is_nan() && !s.contains(v) => {
                    warn!("{} = {} outside [{}, {}]; clamped", feature, v, s.min, s.max);
                }
                _ => {}
            }

            impute_value(supplied, stat)
        })
        .collect();

    debug!(
        "Imputed row: {} features, {} supplied, {} defaulted",
        row.len(),
        row.len() - defaulted,
        defaulted
    );
    row
}
