//! Service configuration
//!
//! Optional TOML file layered under `RUL__*` environment variables. Every key
//! has a default, so an empty environment yields a working service.

use feature_engine::NoiseMode;
use inference_engine::{
    CachePolicy, InferenceSettings, RescaleBounds, RescalePolicy, ENGINE_MODEL, ENGINE_SCALER, HYDRAULICS_MODEL,
    LANDING_GEAR_MODEL,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default config file name, overridden by `RUL_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "rul-service.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub models: ModelsConfig,
    pub hydraulics: HydraulicsConfig,
    pub logging: LoggingConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub models_dir: PathBuf,
    pub defaults_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            defaults_file: PathBuf::from("models/feature_defaults.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub cache_policy: CachePolicy,
    /// Local copies for the `persist` policy
    pub cache_dir: PathBuf,
    /// Load and verify every model at startup
    pub preload: bool,
    /// Model name → artifact file under `paths.models_dir`
    pub artifacts: HashMap<String, String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let artifacts = [
            (ENGINE_MODEL, "best_model_fd001.json"),
            (ENGINE_SCALER, "scaler_fd001.json"),
            (HYDRAULICS_MODEL, "agg_best_model.json"),
            (LANDING_GEAR_MODEL, "best_rul_model_top3.json"),
        ]
        .into_iter()
        .map(|(name, file)| (name.to_string(), file.to_string()))
        .collect();

        Self {
            cache_policy: CachePolicy::Memoize,
            cache_dir: PathBuf::from("cache/models"),
            preload: false,
            artifacts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HydraulicsConfig {
    pub rescale: RescalePolicy,
    pub history_capacity: usize,
    pub source_range: [f64; 2],
    pub display_range: [f64; 2],
    pub noise: NoiseMode,
    pub seed: Option<u64>,
}

impl Default for HydraulicsConfig {
    fn default() -> Self {
        Self {
            rescale: RescalePolicy::Fixed,
            history_capacity: 100,
            source_range: [80.0, 120.0],
            display_range: [60.0, 120.0],
            noise: NoiseMode::Random,
            seed: None,
        }
    }
}

impl HydraulicsConfig {
    pub fn inference_settings(&self) -> InferenceSettings {
        InferenceSettings {
            rescale: self.rescale,
            bounds: RescaleBounds {
                source: (self.source_range[0], self.source_range[1]),
                display: (self.display_range[0], self.display_range[1]),
            },
            history_capacity: self.history_capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_records: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_records: storage::DEFAULT_MAX_RECORDS,
        }
    }
}

/// Load configuration from an optional TOML file and `RUL__` environment variables
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(config::Environment::with_prefix("RUL").separator("__").try_parsing(true))
        .build()?;

    settings.try_deserialize()
}
