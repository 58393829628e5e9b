//! Per-feature statistics

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Training-set statistics for a single feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStat {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl FeatureStat {
    /// Create a new statistic (unchecked, see [`FeatureStat::is_valid`])
    pub fn new(min: f64, mean: f64, max: f64) -> Self {
        Self { min, mean, max }
    }

    /// All three values are finite and `min <= mean <= max`
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.mean.is_finite()
            && self.max.is_finite()
            && self.min <= self.mean
            && self.mean <= self.max
    }

    /// Clamp a value into `[min, max]`
    pub fn clamp(&self, value: f64) -> f64 {
        self.min.max(value.min(self.max))
    }

    /// Whether a value lies inside `[min, max]`
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Statistics for every feature of one subsystem
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureStats {
    stats: HashMap<String, FeatureStat>,
}

impl FeatureStats {
    /// Create an empty section
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a feature; `None` means no defaulting information
    pub fn get(&self, feature: &str) -> Option<&FeatureStat> {
        self.stats.get(feature)
    }

    /// Mean of a feature, if known
    pub fn mean(&self, feature: &str) -> Option<f64> {
        self.get(feature).map(|s| s.mean)
    }

    pub fn insert(&mut self, feature: impl Into<String>, stat: FeatureStat) {
        self.stats.insert(feature.into(), stat);
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.stats.contains_key(feature)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Feature names in unspecified order
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.stats.keys().map(String::as_str)
    }
}

impl FromIterator<(String, FeatureStat)> for FeatureStats {
    fn from_iter<I: IntoIterator<Item = (String, FeatureStat)>>(iter: I) -> Self {
        Self {
            stats: iter.into_iter().collect(),
        }
    }
}
