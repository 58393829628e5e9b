//! Defaults Table loading and lookup

use crate::{DefaultsError, FeatureStat, FeatureStats, Subsystem};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Where the loaded table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultsOrigin {
    /// Parsed from a defaults file
    File,
    /// File absent or unreadable; table is empty
    Missing,
    /// File present but not a JSON object; table is empty
    Unparseable,
    /// Built in code
    InMemory,
}

/// Feature count of one subsystem section
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub subsystem: Subsystem,
    pub features: usize,
}

/// Process-wide, read-only table of feature statistics
#[derive(Debug, Clone)]
pub struct DefaultsTable {
    sections: [FeatureStats; 3],
    origin: DefaultsOrigin,
}

fn index(subsystem: Subsystem) -> usize {
    match subsystem {
        Subsystem::Engine => 0,
        Subsystem::Hydraulics => 1,
        Subsystem::LandingGear => 2,
    }
}

impl DefaultsTable {
    /// Table with no statistics at all
    pub fn empty(origin: DefaultsOrigin) -> Self {
        Self {
            sections: Default::default(),
            origin,
        }
    }

    /// Build a table in code from per-subsystem sections
    pub fn from_sections(sections: impl IntoIterator<Item = (Subsystem, FeatureStats)>) -> Self {
        let mut table = Self::empty(DefaultsOrigin::InMemory);
        for (subsystem, stats) in sections {
            table.sections[index(subsystem)] = stats;
        }
        table
    }

    /// Load the defaults file.
    ///
    /// A missing or unparseable file yields an empty table with a warning.
    /// Entries that are not proper `{min, mean, max}` objects are skipped.
    /// A well-formed entry violating `min <= mean <= max` is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefaultsError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Defaults file {} unavailable ({}); imputation will zero-fill", path.display(), e);
                return Ok(Self::empty(DefaultsOrigin::Missing));
            }
        };

        let table = Self::from_json_str(&text)?;
        if table.origin == DefaultsOrigin::Unparseable {
            warn!("Defaults file {} could not be parsed; imputation will zero-fill", path.display());
        } else {
            info!("Loaded feature defaults from {}", path.display());
        }
        Ok(table)
    }

    /// Parse a defaults document held in memory
    pub fn from_json_str(text: &str) -> Result<Self, DefaultsError> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(root)) => {
                let mut table = Self::empty(DefaultsOrigin::File);
                for subsystem in Subsystem::ALL {
                    table.sections[index(subsystem)] =
                        parse_section(subsystem, root.get(subsystem.defaults_key()))?;
                }
                Ok(table)
            }
            Ok(_) => Ok(Self::empty(DefaultsOrigin::Unparseable)),
            Err(e) => {
                debug!("Defaults JSON parse error: {}", e);
                Ok(Self::empty(DefaultsOrigin::Unparseable))
            }
        }
    }

    /// Statistic for one feature of one subsystem
    pub fn get(&self, subsystem: Subsystem, feature: &str) -> Option<&FeatureStat> {
        self.section(subsystem).get(feature)
    }

    /// All statistics of one subsystem (possibly empty)
    pub fn section(&self, subsystem: Subsystem) -> &FeatureStats {
        &self.sections[index(subsystem)]
    }

    pub fn origin(&self) -> DefaultsOrigin {
        self.origin
    }

    /// True when every section is empty
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(FeatureStats::is_empty)
    }

    /// True when at least one subsystem has no statistics
    pub fn is_degraded(&self) -> bool {
        self.sections.iter().any(FeatureStats::is_empty)
    }

    pub fn summary(&self) -> Vec<SectionSummary> {
        Subsystem::ALL
            .iter()
            .map(|&subsystem| SectionSummary {
                subsystem,
                features: self.section(subsystem).len(),
            })
            .collect()
    }

    /// Startup health check: report section sizes, warn on empty sections
    pub fn log_health(&self) {
        for section in self.summary() {
            if section.features == 0 {
                warn!(
                    "No feature defaults for {}: missing values zero-fill, nothing is clamped",
                    section.subsystem
                );
            } else {
                info!("Feature defaults for {}: {} features", section.subsystem, section.features);
            }
        }
    }
}

fn parse_section(subsystem: Subsystem, value: Option<&Value>) -> Result<FeatureStats, DefaultsError> {
    let entries = match value {
        Some(Value::Object(entries)) => entries,
        Some(_) => {
            warn!("Defaults section '{}' is not an object; ignoring it", subsystem.defaults_key());
            return Ok(FeatureStats::new());
        }
        None => {
            debug!("Defaults section '{}' absent", subsystem.defaults_key());
            return Ok(FeatureStats::new());
        }
    };

    let mut stats = FeatureStats::new();
    for (feature, raw) in entries {
        let stat = match serde_json::from_value::<FeatureStat>(raw.clone()) {
            Ok(stat) => stat,
            Err(e) => {
                warn!("Skipping malformed default {}/{}: {}", subsystem.defaults_key(), feature, e);
                continue;
            }
        };
        if !stat.is_valid() {
            return Err(DefaultsError::InvalidStat {
                subsystem: subsystem.defaults_key(),
                feature: feature.clone(),
                min: stat.min,
                mean: stat.mean,
                max: stat.max,
            });
        }
        stats.insert(feature.clone(), stat);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "engine": {
            "sensor_4": {"min": 1382.25, "mean": 1408.93, "max": 1441.49},
            "op_setting_1": {"min": -0.0087, "mean": 0.0, "max": 0.0087}
        },
        "hyd": {
            "CE_mean": {"min": 17.5, "mean": 31.3, "max": 47.2},
            "VS1_std": 0.05
        },
        "lg": {
            "tire_pressure": {"min": 150, "mean": 200, "max": 250}
        }
    }"#;

    #[test]
    fn test_parse_sections() {
        let table = DefaultsTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.origin(), DefaultsOrigin::File);
        assert_eq!(table.section(Subsystem::Engine).len(), 2);
        assert_eq!(table.get(Subsystem::LandingGear, "tire_pressure").unwrap().mean, 200.0);
        assert!(!table.is_degraded());
    }

    #[test]
    fn test_malformed_entry_is_absent() {
        let table = DefaultsTable::from_json_str(SAMPLE).unwrap();
        assert!(table.get(Subsystem::Hydraulics, "VS1_std").is_none());
        assert!(table.get(Subsystem::Hydraulics, "CE_mean").is_some());
    }

    #[test]
    fn test_partial_stat_is_absent() {
        let table = DefaultsTable::from_json_str(r#"{"engine": {"sensor_2": {"mean": 642.0}}}"#).unwrap();
        assert!(table.get(Subsystem::Engine, "sensor_2").is_none());
    }

    #[test]
    fn test_invalid_ordering_fails_fast() {
        let err = DefaultsTable::from_json_str(r#"{"lg": {"speed_during_landing": {"min": 300, "mean": 200, "max": 100}}}"#)
            .unwrap_err();
        assert!(matches!(err, DefaultsError::InvalidStat { subsystem: "lg", .. }));
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let table = DefaultsTable::from_json_str(r#"{"engine": {}}"#).unwrap();
        assert!(table.is_empty());
        assert!(table.is_degraded());
    }

    #[test]
    fn test_missing_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let table = DefaultsTable::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(table.origin(), DefaultsOrigin::Missing);
        assert!(table.is_empty());
        assert!(table.get(Subsystem::Engine, "sensor_4").is_none());
    }

    #[test]
    fn test_unparseable_file_fails_open() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let table = DefaultsTable::load(file.path()).unwrap();
        assert_eq!(table.origin(), DefaultsOrigin::Unparseable);
        assert!(table.is_empty());
    }

    #[test]
    fn test_non_object_root_is_unparseable() {
        let table = DefaultsTable::from_json_str("[1, 2, 3]").unwrap();
        assert_eq!(table.origin(), DefaultsOrigin::Unparseable);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let table = DefaultsTable::load(file.path()).unwrap();
        assert_eq!(table.summary().iter().map(|s| s.features).sum::<usize>(), 4);
    }
}
