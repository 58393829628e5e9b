//! Feature Schema Registry
//!
//! Column order of every trained model. These lists are a hard contract with
//! the model artifacts: reordering them silently changes predictions.

use feature_defaults::Subsystem;

/// Version tag of the engine column order (C-MAPSS FD001 training frame)
pub const ENGINE_SCHEMA_VERSION: &str = "fd001-v1";

/// Version tag of the hydraulics column order (aggregated rig statistics)
pub const HYDRAULICS_SCHEMA_VERSION: &str = "hyd-agg-v1";

/// Version tag of the landing-gear column order
pub const LANDING_GEAR_SCHEMA_VERSION: &str = "lg-top3-v1";

/// Engine: cycle counter, 3 operating settings, 21 sensors
pub const ENGINE_FEATURES: [&str; 25] = [
    "time_in_cycles",
    "op_setting_1",
    "op_setting_2",
    "op_setting_3",
    "sensor_1",
    "sensor_2",
    "sensor_3",
    "sensor_4",
    "sensor_5",
    "sensor_6",
    "sensor_7",
    "sensor_8",
    "sensor_9",
    "sensor_10",
    "sensor_11",
    "sensor_12",
    "sensor_13",
    "sensor_14",
    "sensor_15",
    "sensor_16",
    "sensor_17",
    "sensor_18",
    "sensor_19",
    "sensor_20",
    "sensor_21",
];

/// Hydraulics: per-sensor aggregates. PS2, PS3 and SE carry no `_min` column.
pub const HYDRAULICS_FEATURES: [&str; 65] = [
    "CE_mean", "CE_std", "CE_min", "CE_max",
    "CP_mean", "CP_std", "CP_min", "CP_max",
    "EPS1_mean", "EPS1_std", "EPS1_min", "EPS1_max",
    "FS1_mean", "FS1_std", "FS1_min", "FS1_max",
    "FS2_mean", "FS2_std", "FS2_min", "FS2_max",
    "PS1_mean", "PS1_std", "PS1_min", "PS1_max",
    "PS2_mean", "PS2_std", "PS2_max",
    "PS3_mean", "PS3_std", "PS3_max",
    "PS4_mean", "PS4_std", "PS4_min", "PS4_max",
    "PS5_mean", "PS5_std", "PS5_min", "PS5_max",
    "PS6_mean", "PS6_std", "PS6_min", "PS6_max",
    "SE_mean", "SE_std", "SE_max",
    "TS1_mean", "TS1_std", "TS1_min", "TS1_max",
    "TS2_mean", "TS2_std", "TS2_min", "TS2_max",
    "TS3_mean", "TS3_std", "TS3_min", "TS3_max",
    "TS4_mean", "TS4_std", "TS4_min", "TS4_max",
    "VS1_mean", "VS1_std", "VS1_min", "VS1_max",
];

/// Landing gear: the three most important features of the retrained model
pub const LANDING_GEAR_FEATURES: [&str; 3] = ["load_during_landing", "tire_pressure", "speed_during_landing"];

/// Ordered feature list of one subsystem model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub subsystem: Subsystem,
    pub version: &'static str,
    pub features: &'static [&'static str],
}

static ENGINE_SCHEMA: FeatureSchema = FeatureSchema {
    subsystem: Subsystem::Engine,
    version: ENGINE_SCHEMA_VERSION,
    features: &ENGINE_FEATURES,
};

static HYDRAULICS_SCHEMA: FeatureSchema = FeatureSchema {
    subsystem: Subsystem::Hydraulics,
    version: HYDRAULICS_SCHEMA_VERSION,
    features: &HYDRAULICS_FEATURES,
};

static LANDING_GEAR_SCHEMA: FeatureSchema = FeatureSchema {
    subsystem: Subsystem::LandingGear,
    version: LANDING_GEAR_SCHEMA_VERSION,
    features: &LANDING_GEAR_FEATURES,
};

impl FeatureSchema {
    /// Schema registered for a subsystem
    pub fn for_subsystem(subsystem: Subsystem) -> &'static FeatureSchema {
        match subsystem {
            Subsystem::Engine => &ENGINE_SCHEMA,
            Subsystem::Hydraulics => &HYDRAULICS_SCHEMA,
            Subsystem::LandingGear => &LANDING_GEAR_SCHEMA,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Column index of a feature
    pub fn position(&self, feature: &str) -> Option<usize> {
        self.features.iter().position(|f| *f == feature)
    }

    /// Whether a declared order (e.g. from a model artifact) matches exactly
    pub fn matches<S: AsRef<str>>(&self, declared: &[S]) -> bool {
        declared.len() == self.features.len()
            && declared.iter().zip(self.features).all(|(d, f)| d.as_ref() == *f)
    }
}
