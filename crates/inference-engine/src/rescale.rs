//! Display rescaling for hydraulics predictions
//!
//! Raw regressor output is mapped into a fixed display range. The stored and
//! logged raw value is never altered.

use ring_buffer::{BufferError, HistoryBuffer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::InferenceError;

/// Minimum usable width of adaptive bounds
const MIN_SPAN: f64 = 1e-9;

/// How raw hydraulics output is mapped to display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescalePolicy {
    /// Interpolate from the fixed source range
    #[default]
    Fixed,
    /// Interpolate from mean ± 2·std over the rolling history
    Adaptive,
}

/// Source and display ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaleBounds {
    pub source: (f64, f64),
    pub display: (f64, f64),
}

impl Default for RescaleBounds {
    fn default() -> Self {
        Self {
            source: (80.0, 120.0),
            display: (60.0, 120.0),
        }
    }
}

impl RescaleBounds {
    /// Both ranges must be finite with `low < high`
    pub fn validate(&self) -> Result<(), InferenceError> {
        for (name, (low, high)) in [("source", self.source), ("display", self.display)] {
            if !(low.is_finite() && high.is_finite() && low < high) {
                return Err(InferenceError::InvalidRange { name, low, high });
            }
        }
        Ok(())
    }
}

/// Piecewise-linear map from `from` to `to`, clamped at both ends
pub fn interpolate(x: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    let (x0, x1) = from;
    let (y0, y1) = to;
    if x <= x0 {
        return y0;
    }
    if x >= x1 {
        return y1;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Round to two decimals
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn clamp_display(x: f64, bounds: &RescaleBounds) -> f64 {
    let (lo, hi) = bounds.display;
    x.clamp(lo, hi)
}

/// Deterministic rescale with no history dependency
pub fn rescale_fixed(raw: f64, bounds: &RescaleBounds) -> f64 {
    round2(clamp_display(interpolate(raw, bounds.source, bounds.display), bounds))
}

/// Record `raw` in the history, then rescale against its current spread.
///
/// Falls back to the fixed mapping while the history is too narrow to
/// define a range (e.g. a single sample).
pub fn rescale_adaptive(raw: f64, history: &HistoryBuffer, bounds: &RescaleBounds) -> Result<f64, BufferError> {
    let stats = history.push_and_stats(raw)?;
    let (floor, ceiling) = bounds.source;

    let low = (stats.mean - 2.0 * stats.std_dev).clamp(floor, ceiling);
    let high = (stats.mean + 2.0 * stats.std_dev).clamp(floor, ceiling);

    if high - low < MIN_SPAN {
        debug!("Adaptive bounds degenerate (n={}), using fixed range", stats.count);
        return Ok(rescale_fixed(raw, bounds));
    }

    debug!("Adaptive bounds [{:.2}, {:.2}] over {} samples", low, high, stats.count);
    Ok(round2(clamp_display(interpolate(raw, (low, high), bounds.display), bounds)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_anchor_points() {
        let b = RescaleBounds::default();
        assert_eq!(rescale_fixed(80.0, &b), 60.0);
        assert_eq!(rescale_fixed(120.0, &b), 120.0);
        assert_eq!(rescale_fixed(100.0, &b), 90.0);
    }

    #[test]
    fn test_fixed_clamps_outside_source() {
        let b = RescaleBounds::default();
        assert_eq!(rescale_fixed(10.0, &b), 60.0);
        assert_eq!(rescale_fixed(500.0, &b), 120.0);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(RescaleBounds::default().validate().is_ok());

        let inverted = RescaleBounds {
            display: (120.0, 60.0),
            ..RescaleBounds::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(InferenceError::InvalidRange { name: "display", .. })
        ));

        let empty = RescaleBounds {
            source: (80.0, 80.0),
            ..RescaleBounds::default()
        };
        assert!(matches!(empty.validate(), Err(InferenceError::InvalidRange { name: "source", .. })));

        let nan = RescaleBounds {
            source: (f64::NAN, 120.0),
            ..RescaleBounds::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(90.456), 90.46);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn test_adaptive_first_sample_matches_fixed() {
        let history = HistoryBuffer::new(100).unwrap();
        let b = RescaleBounds::default();
        assert_eq!(rescale_adaptive(100.0, &history, &b).unwrap(), 90.0);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_adaptive_uses_history_spread() {
        let history = HistoryBuffer::new(100).unwrap();
        let b = RescaleBounds::default();
        for v in [95.0, 105.0] {
            rescale_adaptive(v, &history, &b).unwrap();
        }
        // history {95, 105, 100}: mean 100, bounds stay inside [80,120]
        let y = rescale_adaptive(100.0, &history, &b).unwrap();
        assert_eq!(y, 90.0);
    }

    #[test]
    fn test_adaptive_bounds_clamped_to_source() {
        let history = HistoryBuffer::new(100).unwrap();
        let b = RescaleBounds::default();
        for v in [0.0, 200.0, 0.0, 200.0] {
            rescale_adaptive(v, &history, &b).unwrap();
        }
        // spread far exceeds [80,120], so the mapping equals the fixed one
        assert_eq!(rescale_adaptive(100.0, &history, &b).unwrap(), 90.0);
    }

    #[test]
    fn test_adaptive_history_capped() {
        let history = HistoryBuffer::new(100).unwrap();
        let b = RescaleBounds::default();
        for i in 0..101 {
            rescale_adaptive(80.0 + (i % 40) as f64, &history, &b).unwrap();
        }
        assert_eq!(history.len(), 100);
        assert_eq!(history.snapshot()[0], 81.0);
    }

    proptest! {
        #[test]
        fn prop_fixed_in_display_range(raw in -1e6f64..1e6) {
            let y = rescale_fixed(raw, &RescaleBounds::default());
            prop_assert!((60.0..=120.0).contains(&y));
        }

        #[test]
        fn prop_adaptive_in_display_range(values in prop::collection::vec(-500.0f64..500.0, 1..150)) {
            let history = HistoryBuffer::new(100).unwrap();
            let b = RescaleBounds::default();
            for v in values {
                let y = rescale_adaptive(v, &history, &b).unwrap();
                prop_assert!((60.0..=120.0).contains(&y));
            }
            prop_assert!(history.len() <= 100);
        }

        #[test]
        fn prop_interpolate_monotone(a in 0.0f64..200.0, b in 0.0f64..200.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(interpolate(lo, (80.0, 120.0), (60.0, 120.0)) <= interpolate(hi, (80.0, 120.0), (60.0, 120.0)));
        }
    }
}
