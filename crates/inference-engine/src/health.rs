//! Health zone derived from a reported RUL

use feature_defaults::Subsystem;
use serde::{Deserialize, Serialize};

/// Maintenance urgency bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthZone {
    Optimal,
    Caution,
    Critical,
}

/// `(optimal, caution)` lower bounds in cycles. Landing gear runs on a much
/// longer cycle scale than the other subsystems.
fn thresholds(subsystem: Subsystem) -> (f64, f64) {
    match subsystem {
        Subsystem::Engine | Subsystem::Hydraulics => (100.0, 80.0),
        Subsystem::LandingGear => (350.0, 265.0),
    }
}

impl HealthZone {
    /// Zone of a reported RUL on the subsystem's own scale
    pub fn for_subsystem(subsystem: Subsystem, rul: f64) -> Self {
        let (optimal, caution) = thresholds(subsystem);
        if rul >= optimal {
            HealthZone::Optimal
        } else if rul >= caution {
            HealthZone::Caution
        } else {
            HealthZone::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthZone::Optimal => "optimal",
            HealthZone::Caution => "caution",
            HealthZone::Critical => "critical",
        }
    }
}
