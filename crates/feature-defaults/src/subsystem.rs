//! Subsystem identifiers

use crate::DefaultsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aircraft subsystem served by a dedicated model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    /// Turbofan engine (C-MAPSS FD001 features)
    Engine,
    /// Hydraulic test rig (aggregated sensor statistics)
    Hydraulics,
    /// Landing gear
    LandingGear,
}

impl Subsystem {
    /// All subsystems in a fixed order
    pub const ALL: [Subsystem; 3] = [Subsystem::Engine, Subsystem::Hydraulics, Subsystem::LandingGear];

    /// Canonical name used in logs, metrics and the prediction log
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Engine => "engine",
            Subsystem::Hydraulics => "hydraulics",
            Subsystem::LandingGear => "landing_gear",
        }
    }

    /// Top-level key of this subsystem in the defaults file
    pub fn defaults_key(&self) -> &'static str {
        match self {
            Subsystem::Engine => "engine",
            Subsystem::Hydraulics => "hyd",
            Subsystem::LandingGear => "lg",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subsystem {
    type Err = DefaultsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "engine" => Ok(Subsystem::Engine),
            "hydraulics" | "hyd" => Ok(Subsystem::Hydraulics),
            "landing_gear" | "landing-gear" | "lg" => Ok(Subsystem::LandingGear),
            other => Err(DefaultsError::UnknownSubsystem(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("hyd".parse::<Subsystem>().unwrap(), Subsystem::Hydraulics);
        assert_eq!("landing-gear".parse::<Subsystem>().unwrap(), Subsystem::LandingGear);
        assert_eq!("engine".parse::<Subsystem>().unwrap(), Subsystem::Engine);
    }

    #[test]
    fn test_unknown_subsystem_fails() {
        let err = "rotor".parse::<Subsystem>().unwrap_err();
        assert!(matches!(err, DefaultsError::UnknownSubsystem(name) if name == "rotor"));
    }

    #[test]
    fn test_defaults_keys() {
        let keys: Vec<_> = Subsystem::ALL.iter().map(|s| s.defaults_key()).collect();
        assert_eq!(keys, ["engine", "hyd", "lg"]);
    }
}
