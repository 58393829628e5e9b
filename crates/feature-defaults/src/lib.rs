//! Feature Defaults Store
//!
//! Loads the offline-computed `{min, mean, max}` statistics for every model
//! feature and exposes them per subsystem. Loading fails open: a missing or
//! unparseable file yields an empty table, and every consumer must treat an
//! absent statistic as "no defaulting information available".

mod error;
mod stats;
mod subsystem;
mod table;

pub use error::DefaultsError;
pub use stats::{FeatureStat, FeatureStats};
pub use subsystem::Subsystem;
pub use table::{DefaultsOrigin, DefaultsTable, SectionSummary};
