//! Prediction orchestration: assemble, run the model, rescale

use feature_defaults::{DefaultsTable, Subsystem};
use feature_engine::{
    assemble_engine, assemble_hydraulics, assemble_landing_gear, validate_hydraulics_defaults, FeaturePayload,
    FeatureSchema, FeatureVector, HydraulicsReadings, Jitter,
};
use ring_buffer::HistoryBuffer;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::health::HealthZone;
use crate::provider::{ModelHandle, ModelProvider};
use crate::rescale::{rescale_adaptive, rescale_fixed, round2, RescaleBounds, RescalePolicy};
use crate::scaler::ScalerHandle;
use crate::InferenceError;

pub const ENGINE_MODEL: &str = "engine";
pub const ENGINE_SCALER: &str = "scaler_engine";
pub const HYDRAULICS_MODEL: &str = "hydraulics";
pub const LANDING_GEAR_MODEL: &str = "landing_gear";

/// Runtime knobs for prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceSettings {
    pub rescale: RescalePolicy,
    pub bounds: RescaleBounds,
    pub history_capacity: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            rescale: RescalePolicy::Fixed,
            bounds: RescaleBounds::default(),
            history_capacity: ring_buffer::DEFAULT_CAPACITY,
        }
    }
}

/// Result of one prediction
#[derive(Debug, Clone, Serialize)]
pub struct RulPrediction {
    pub subsystem: Subsystem,
    /// Regressor output before any display rescaling
    pub raw_rul: f64,
    /// Value reported to the caller
    pub predicted_rul: f64,
    pub model_version: String,
    pub health: HealthZone,
    #[serde(skip)]
    pub latency: Duration,
}

/// RUL inference over all three subsystems
pub struct InferenceEngine {
    provider: Arc<dyn ModelProvider>,
    defaults: Arc<DefaultsTable>,
    settings: InferenceSettings,
    history: HistoryBuffer,
    jitter: Mutex<Box<dyn Jitter>>,
}

impl InferenceEngine {
    /// Create an engine; fails on hydraulics defaults out of declared order or an invalid rescale range
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        defaults: Arc<DefaultsTable>,
        settings: InferenceSettings,
        jitter: Box<dyn Jitter>,
    ) -> Result<Self, InferenceError> {
        validate_hydraulics_defaults(defaults.section(Subsystem::Hydraulics))?;
        settings.bounds.validate()?;
        let history = HistoryBuffer::new(settings.history_capacity)?;

        info!(
            "Inference engine ready: rescale={:?}, history capacity {}",
            settings.rescale, settings.history_capacity
        );

        Ok(Self {
            provider,
            defaults,
            settings,
            history,
            jitter: Mutex::new(jitter),
        })
    }

    /// Load every model and scaler and verify their declared orders
    pub fn preload(&self) -> Result<(), InferenceError> {
        for (name, subsystem) in [
            (ENGINE_MODEL, Subsystem::Engine),
            (HYDRAULICS_MODEL, Subsystem::Hydraulics),
            (LANDING_GEAR_MODEL, Subsystem::LandingGear),
        ] {
            self.model_for(name, subsystem)?;
        }
        self.engine_scaler()?;
        info!("Preloaded all models");
        Ok(())
    }

    pub fn predict_engine(&self, payload: &FeaturePayload) -> Result<RulPrediction, InferenceError> {
        let start = Instant::now();
        let model = self.model_for(ENGINE_MODEL, Subsystem::Engine)?;
        let scaler = self.engine_scaler()?;

        let vector = assemble_engine(payload, self.defaults.section(Subsystem::Engine), scaler.as_ref())?;
        let raw = self.run(&model, &vector)?;

        Ok(self.finish(Subsystem::Engine, raw, round2(raw), &model, start))
    }

    pub fn predict_hydraulics(&self, readings: &HydraulicsReadings) -> Result<RulPrediction, InferenceError> {
        let start = Instant::now();
        let model = self.model_for(HYDRAULICS_MODEL, Subsystem::Hydraulics)?;

        let vector = {
            let mut jitter = self
                .jitter
                .lock()
                .map_err(|_| InferenceError::InferenceFailed("noise source lock poisoned".to_string()))?;
            assemble_hydraulics(readings, self.defaults.section(Subsystem::Hydraulics), jitter.as_mut())
        };
        let raw = self.run(&model, &vector)?;

        let display = match self.settings.rescale {
            RescalePolicy::Fixed => rescale_fixed(raw, &self.settings.bounds),
            RescalePolicy::Adaptive => rescale_adaptive(raw, &self.history, &self.settings.bounds)?,
        };

        Ok(self.finish(Subsystem::Hydraulics, raw, display, &model, start))
    }

    pub fn predict_landing_gear(&self, payload: &FeaturePayload) -> Result<RulPrediction, InferenceError> {
        let start = Instant::now();
        let model = self.model_for(LANDING_GEAR_MODEL, Subsystem::LandingGear)?;

        let vector = assemble_landing_gear(payload, self.defaults.section(Subsystem::LandingGear));
        let raw = self.run(&model, &vector)?;

        Ok(self.finish(Subsystem::LandingGear, raw, round2(raw), &model, start))
    }

    /// Rolling history used by the adaptive rescale policy
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    pub fn defaults(&self) -> &DefaultsTable {
        &self.defaults
    }

    pub fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    fn model_for(&self, name: &str, subsystem: Subsystem) -> Result<Arc<ModelHandle>, InferenceError> {
        let model = self.provider.regressor(name)?;
        model.ensure_schema(FeatureSchema::for_subsystem(subsystem))?;
        Ok(model)
    }

    fn engine_scaler(&self) -> Result<Arc<ScalerHandle>, InferenceError> {
        let scaler = self.provider.scaler(ENGINE_SCALER)?;
        let schema = FeatureSchema::for_subsystem(Subsystem::Engine);
        if !schema.matches(&scaler.feature_names) {
            return Err(InferenceError::SchemaMismatch {
                model: scaler.name.clone(),
                schema: schema.version,
            });
        }
        Ok(scaler)
    }

    fn run(&self, model: &ModelHandle, vector: &FeatureVector) -> Result<f64, InferenceError> {
        let raw = model.predict(vector.as_slice())?;
        debug!("{} raw prediction {:.3} from {} features", vector.subsystem, raw, vector.len());
        Ok(raw)
    }

    fn finish(&self, subsystem: Subsystem, raw: f64, predicted: f64, model: &ModelHandle, start: Instant) -> RulPrediction {
        let prediction = RulPrediction {
            subsystem,
            raw_rul: raw,
            predicted_rul: predicted,
            model_version: model.version.clone(),
            health: HealthZone::for_subsystem(subsystem, predicted),
            latency: start.elapsed(),
        };
        debug!(
            "{} prediction: raw={:.3}, reported={:.2}, health={}",
            subsystem,
            raw,
            predicted,
            prediction.health.as_str()
        );
        prediction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ArtifactProvider, CachePolicy, MemorySource};
    use feature_defaults::{DefaultsOrigin, FeatureStat, FeatureStats};
    use feature_engine::schema::{ENGINE_FEATURES, HYDRAULICS_FEATURES, LANDING_GEAR_FEATURES};
    use feature_engine::NoJitter;
    use serde_json::json;
    use std::collections::HashMap;

    fn linear(version: &str, names: &[&str], coefficients: Vec<f64>, intercept: f64) -> String {
        json!({
            "version": version,
            "feature_names": names,
            "model": {"type": "linear", "coefficients": coefficients, "intercept": intercept}
        })
        .to_string()
    }

    fn provider_with(hydraulics_intercept: f64) -> Arc<dyn ModelProvider> {
        let n = ENGINE_FEATURES.len();
        // engine model sums the scaled row
        let engine = linear("fd001_v3", &ENGINE_FEATURES, vec![1.0; n], 0.0);
        let scaler = json!({
            "version": "fd001_v3",
            "feature_names": ENGINE_FEATURES,
            "scaler": {"type": "standard", "mean": vec![0.0; n], "scale": vec![1.0; n]}
        })
        .to_string();
        let hydraulics = linear("hyd_v2", &HYDRAULICS_FEATURES, vec![0.0; HYDRAULICS_FEATURES.len()], hydraulics_intercept);
        let landing = linear("lg_v1", &LANDING_GEAR_FEATURES, vec![1.0, 0.0, 0.0], 0.0);

        let source = MemorySource::new()
            .with_file("engine.json", engine)
            .with_file("scaler_engine.json", scaler)
            .with_file("hydraulics.json", hydraulics)
            .with_file("landing_gear.json", landing);
        let artifacts = [ENGINE_MODEL, ENGINE_SCALER, HYDRAULICS_MODEL, LANDING_GEAR_MODEL]
            .into_iter()
            .map(|name| (name.to_string(), format!("{}.json", name)))
            .collect::<HashMap<_, _>>();

        Arc::new(ArtifactProvider::new(artifacts, Box::new(source), CachePolicy::Memoize))
    }

    fn engine(settings: InferenceSettings, defaults: DefaultsTable) -> InferenceEngine {
        InferenceEngine::new(provider_with(100.0), Arc::new(defaults), settings, Box::new(NoJitter)).unwrap()
    }

    #[test]
    fn test_landing_gear_end_to_end() {
        let e = engine(InferenceSettings::default(), DefaultsTable::empty(DefaultsOrigin::InMemory));
        let payload = FeaturePayload::from([
            ("load_during_landing".to_string(), 300.0),
            ("tire_pressure".to_string(), 200.0),
            ("speed_during_landing".to_string(), 150.0),
        ]);
        let p = e.predict_landing_gear(&payload).unwrap();
        assert_eq!(p.raw_rul, 300.0);
        assert_eq!(p.predicted_rul, 300.0);
        // landing gear is scored on its own cycle scale
        assert_eq!(p.health, HealthZone::Caution);
        assert_eq!(p.model_version, "lg_v1");
    }

    #[test]
    fn test_engine_imputes_missing_means() {
        let stats: FeatureStats = [("sensor_7".to_string(), FeatureStat::new(550.0, 553.0, 556.0))]
            .into_iter()
            .collect();
        let e = engine(InferenceSettings::default(), DefaultsTable::from_sections([(Subsystem::Engine, stats)]));
        let payload = FeaturePayload::from([
            ("op_setting_1".to_string(), 1.0),
            ("op_setting_2".to_string(), 1.0),
            ("op_setting_3".to_string(), 1.0),
            ("sensor_4".to_string(), 500.0),
            ("sensor_11".to_string(), 47.0),
            ("sensor_12".to_string(), 520.0),
        ]);
        let p = e.predict_engine(&payload).unwrap();
        // supplied readings plus the imputed sensor_7 mean; everything else zero-filled
        assert_eq!(p.raw_rul, 3.0 + 500.0 + 47.0 + 520.0 + 553.0);
        assert_eq!(p.subsystem, Subsystem::Engine);
    }

    #[test]
    fn test_hydraulics_fixed_rescale() {
        let e = engine(InferenceSettings::default(), DefaultsTable::empty(DefaultsOrigin::InMemory));
        let readings = HydraulicsReadings {
            ps6_mean: 2500.0,
            ps5_mean: 2500.0,
            ce_mean: 30.0,
            ts4_mean: 40.0,
            ts2_mean: 40.0,
            ts1_mean: 40.0,
            cp_mean: 2.0,
            ts3_mean: 40.0,
        };
        let p = e.predict_hydraulics(&readings).unwrap();
        assert_eq!(p.raw_rul, 100.0);
        assert_eq!(p.predicted_rul, 90.0);
        assert_eq!(p.health, HealthZone::Caution);
        assert!(e.history().is_empty());
    }

    #[test]
    fn test_hydraulics_adaptive_records_history() {
        let settings = InferenceSettings {
            rescale: RescalePolicy::Adaptive,
            history_capacity: 3,
            ..InferenceSettings::default()
        };
        let e = engine(settings, DefaultsTable::empty(DefaultsOrigin::InMemory));
        let readings = HydraulicsReadings {
            ps6_mean: 2500.0,
            ps5_mean: 2500.0,
            ce_mean: 30.0,
            ts4_mean: 40.0,
            ts2_mean: 40.0,
            ts1_mean: 40.0,
            cp_mean: 2.0,
            ts3_mean: 40.0,
        };
        for _ in 0..5 {
            e.predict_hydraulics(&readings).unwrap();
        }
        assert_eq!(e.history().len(), 3);
        assert_eq!(e.history().total_written(), 5);
    }

    #[test]
    fn test_mismatched_hydraulics_defaults_rejected() {
        let stats: FeatureStats = [("not_a_column".to_string(), FeatureStat::new(0.0, 1.0, 2.0))]
            .into_iter()
            .collect();
        let result = InferenceEngine::new(
            provider_with(100.0),
            Arc::new(DefaultsTable::from_sections([(Subsystem::Hydraulics, stats)])),
            InferenceSettings::default(),
            Box::new(NoJitter),
        );
        assert!(matches!(result, Err(InferenceError::Feature(_))));
    }

    #[test]
    fn test_schema_mismatch_detected() {
        let source = MemorySource::new().with_file("lg.json", linear("lg_v0", &["a", "b", "c"], vec![1.0; 3], 0.0));
        let provider = ArtifactProvider::new(
            HashMap::from([(LANDING_GEAR_MODEL.to_string(), "lg.json".to_string())]),
            Box::new(source),
            CachePolicy::Memoize,
        );
        let e = InferenceEngine::new(
            Arc::new(provider),
            Arc::new(DefaultsTable::empty(DefaultsOrigin::InMemory)),
            InferenceSettings::default(),
            Box::new(NoJitter),
        )
        .unwrap();
        let err = e.predict_landing_gear(&FeaturePayload::new()).unwrap_err();
        assert!(matches!(err, InferenceError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_preload_loads_everything() {
        let e = engine(InferenceSettings::default(), DefaultsTable::empty(DefaultsOrigin::InMemory));
        assert!(e.preload().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        for bounds in [
            RescaleBounds { display: (120.0, 60.0), ..RescaleBounds::default() },
            RescaleBounds { source: (120.0, 80.0), ..RescaleBounds::default() },
        ] {
            let settings = InferenceSettings {
                bounds,
                ..InferenceSettings::default()
            };
            let result = InferenceEngine::new(
                provider_with(100.0),
                Arc::new(DefaultsTable::empty(DefaultsOrigin::InMemory)),
                settings,
                Box::new(NoJitter),
            );
            assert!(matches!(result, Err(InferenceError::InvalidRange { .. })));
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let settings = InferenceSettings {
            history_capacity: 0,
            ..InferenceSettings::default()
        };
        let result = InferenceEngine::new(
            provider_with(100.0),
            Arc::new(DefaultsTable::empty(DefaultsOrigin::InMemory)),
            settings,
            Box::new(NoJitter),
        );
        assert!(matches!(result, Err(InferenceError::History(_))));
    }
}
