//! Defaults Error Types

use thiserror::Error;

/// Errors raised while loading or querying feature defaults
#[derive(Debug, Clone, Error)]
pub enum DefaultsError {
    /// A well-formed statistic violates `min <= mean <= max`
    #[error("{subsystem}/{feature}: invalid statistic (min={min}, mean={mean}, max={max})")]
    InvalidStat {
        subsystem: &'static str,
        feature: String,
        min: f64,
        mean: f64,
        max: f64,
    },

    /// Subsystem name not known to the service
    #[error("Unknown subsystem: {0}")]
    UnknownSubsystem(String),
}
