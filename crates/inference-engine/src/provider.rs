//! Pluggable model provider
//!
//! Maps model names to artifact files, fetches them from an [`ArtifactSource`]
//! and applies the configured [`CachePolicy`].

use feature_engine::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::artifact::{FeatureManifest, RegressorArtifact, ScalerArtifact};
use crate::onnx::OnnxRegressor;
use crate::regressor::{self, Regressor};
use crate::scaler::{Scaler, ScalerHandle};
use crate::InferenceError;

/// How loaded artifacts are retained between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Fetch and parse on every call
    None,
    /// Parse once, keep in memory
    #[default]
    Memoize,
    /// Copy to a local cache directory on first fetch, then memoize
    Persist,
}

impl CachePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::None => "none",
            CachePolicy::Memoize => "memoize",
            CachePolicy::Persist => "persist",
        }
    }
}

/// Where artifact bytes come from
pub trait ArtifactSource: Send + Sync {
    fn fetch(&self, file: &str) -> Result<Vec<u8>, InferenceError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Artifacts stored in a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactSource for DirectorySource {
    fn fetch(&self, file: &str) -> Result<Vec<u8>, InferenceError> {
        let path = self.root.join(file);
        std::fs::read(&path).map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Artifacts held in memory (embedded or generated)
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(file.into(), bytes.into());
        self
    }
}

impl ArtifactSource for MemorySource {
    fn fetch(&self, file: &str) -> Result<Vec<u8>, InferenceError> {
        self.files
            .get(file)
            .cloned()
            .ok_or_else(|| InferenceError::ModelLoadError(format!("artifact not found: {}", file)))
    }

    fn describe(&self) -> String {
        format!("memory ({} files)", self.files.len())
    }
}

/// Loaded regressor with its declared column order
pub struct ModelHandle {
    pub name: String,
    pub version: String,
    pub feature_names: Vec<String>,
    preprocess: Option<Scaler>,
    regressor: Box<dyn Regressor>,
}

impl ModelHandle {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        feature_names: Vec<String>,
        preprocess: Option<Scaler>,
        regressor: Box<dyn Regressor>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            feature_names,
            preprocess,
            regressor,
        }
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn kind(&self) -> &'static str {
        self.regressor.kind()
    }

    /// Fail unless the declared order equals the schema's
    pub fn ensure_schema(&self, schema: &FeatureSchema) -> Result<(), InferenceError> {
        if schema.matches(&self.feature_names) {
            Ok(())
        } else {
            Err(InferenceError::SchemaMismatch {
                model: self.name.clone(),
                schema: schema.version,
            })
        }
    }

    /// Predict one row; the row width must equal the declared feature count
    pub fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.n_features() {
            return Err(InferenceError::InvalidInputShape {
                model: self.name.clone(),
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        let y = match &self.preprocess {
            Some(scaler) => self.regressor.predict(&scaler.apply(features)?)?,
            None => self.regressor.predict(features)?,
        };

        if !y.is_finite() {
            return Err(InferenceError::InferenceFailed(format!("{} produced non-finite output", self.name)));
        }
        Ok(y)
    }
}

/// Loads models and scalers by name
pub trait ModelProvider: Send + Sync {
    fn regressor(&self, name: &str) -> Result<Arc<ModelHandle>, InferenceError>;

    fn scaler(&self, name: &str) -> Result<Arc<ScalerHandle>, InferenceError>;

    fn cache_policy(&self) -> CachePolicy;
}

type Cache<T> = RwLock<HashMap<String, Arc<T>>>;

/// Provider backed by an artifact source and a name→file registry
pub struct ArtifactProvider {
    artifacts: HashMap<String, String>,
    source: Box<dyn ArtifactSource>,
    policy: CachePolicy,
    cache_dir: Option<PathBuf>,
    regressors: Cache<ModelHandle>,
    scalers: Cache<ScalerHandle>,
}

impl ArtifactProvider {
    pub fn new(artifacts: HashMap<String, String>, source: Box<dyn ArtifactSource>, policy: CachePolicy) -> Self {
        info!(
            "Model provider: {} artifacts from {}, cache policy {}",
            artifacts.len(),
            source.describe(),
            policy.as_str()
        );
        Self {
            artifacts,
            source,
            policy,
            cache_dir: None,
            regressors: RwLock::new(HashMap::new()),
            scalers: RwLock::new(HashMap::new()),
        }
    }

    /// Local directory used by [`CachePolicy::Persist`]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    fn file_for(&self, name: &str) -> Result<&str, InferenceError> {
        self.artifacts
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| InferenceError::UnknownModel(name.to_string()))
    }

    fn read(&self, file: &str) -> Result<Vec<u8>, InferenceError> {
        match self.policy {
            CachePolicy::Persist => self.read_persisted(file),
            CachePolicy::None | CachePolicy::Memoize => self.source.fetch(file),
        }
    }

    fn read_persisted(&self, file: &str) -> Result<Vec<u8>, InferenceError> {
        let dir = self
            .cache_dir
            .as_deref()
            .ok_or_else(|| InferenceError::ModelLoadError("persist cache policy requires a cache directory".to_string()))?;
        let local = dir.join(file);

        if local.exists() {
            debug!("Reading cached artifact {}", local.display());
            return std::fs::read(&local).map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", local.display(), e)));
        }

        let bytes = self.source.fetch(file)?;
        persist(&local, &bytes)?;
        info!("Cached artifact {} ({} bytes)", local.display(), bytes.len());
        Ok(bytes)
    }

    fn build_regressor(&self, name: &str) -> Result<ModelHandle, InferenceError> {
        let file = self.file_for(name)?;

        if Path::new(file).extension().map_or(false, |ext| ext == "onnx") {
            let manifest_file = Path::new(file).with_extension("features.json").to_string_lossy().into_owned();
            let manifest: FeatureManifest = parse_json(&self.read(&manifest_file)?, &manifest_file)?;
            let regressor = OnnxRegressor::from_bytes(&self.read(file)?, manifest.feature_names.len())?;
            return Ok(ModelHandle::new(name, manifest.version, manifest.feature_names, None, Box::new(regressor)));
        }

        let artifact: RegressorArtifact = parse_json(&self.read(file)?, file)?;
        let n_features = artifact.feature_names.len();
        let preprocess = artifact
            .preprocess
            .map(|spec| Scaler::from_spec(spec, n_features, file))
            .transpose()?;
        let regressor = regressor::build(artifact.model, n_features, file)?;

        Ok(ModelHandle::new(name, artifact.version, artifact.feature_names, preprocess, regressor))
    }

    fn build_scaler(&self, name: &str) -> Result<ScalerHandle, InferenceError> {
        let file = self.file_for(name)?;
        let artifact: ScalerArtifact = parse_json(&self.read(file)?, file)?;
        let scaler = Scaler::from_spec(artifact.scaler, artifact.feature_names.len(), file)?;

        Ok(ScalerHandle {
            name: name.to_string(),
            version: artifact.version,
            feature_names: artifact.feature_names,
            scaler,
        })
    }

    fn cached<T>(
        &self,
        cache: &Cache<T>,
        name: &str,
        build: impl FnOnce() -> Result<T, InferenceError>,
    ) -> Result<Arc<T>, InferenceError> {
        if self.policy == CachePolicy::None {
            return build().map(Arc::new);
        }

        if let Some(hit) = cache
            .read()
            .map_err(|_| InferenceError::ModelLoadError("model cache poisoned".to_string()))?
            .get(name)
        {
            return Ok(Arc::clone(hit));
        }

        let loaded = Arc::new(build()?);
        let mut cache = cache
            .write()
            .map_err(|_| InferenceError::ModelLoadError("model cache poisoned".to_string()))?;
        let entry = cache.entry(name.to_string()).or_insert_with(|| Arc::clone(&loaded));
        Ok(Arc::clone(entry))
    }
}

impl ModelProvider for ArtifactProvider {
    fn regressor(&self, name: &str) -> Result<Arc<ModelHandle>, InferenceError> {
        self.cached(&self.regressors, name, || {
            let handle = self.build_regressor(name)?;
            info!(
                "Loaded model '{}' ({}, {} features, version {})",
                name,
                handle.kind(),
                handle.n_features(),
                handle.version
            );
            Ok(handle)
        })
    }

    fn scaler(&self, name: &str) -> Result<Arc<ScalerHandle>, InferenceError> {
        self.cached(&self.scalers, name, || {
            let handle = self.build_scaler(name)?;
            info!("Loaded scaler '{}' ({} features)", name, handle.feature_names.len());
            Ok(handle)
        })
    }

    fn cache_policy(&self) -> CachePolicy {
        self.policy
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(bytes: &[u8], file: &str) -> Result<T, InferenceError> {
    serde_json::from_slice(bytes).map_err(|e| InferenceError::InvalidArtifact {
        file: file.to_string(),
        reason: e.to_string(),
    })
}

fn persist(path: &Path, bytes: &[u8]) -> Result<(), InferenceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, bytes).map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LINEAR: &str = r#"{"version": "lg_v1", "feature_names": ["a", "b"],
        "model": {"type": "linear", "coefficients": [1.0, 2.0], "intercept": 3.0}}"#;
    const SCALER: &str = r#"{"version": "s_v1", "feature_names": ["a", "b"],
        "scaler": {"type": "min_max", "scale": [0.5, 0.5], "min": [0.0, 0.0]}}"#;

    /// Counts fetches to observe cache behavior
    struct CountingSource {
        inner: MemorySource,
        fetches: Arc<AtomicUsize>,
    }

    impl ArtifactSource for CountingSource {
        fn fetch(&self, file: &str) -> Result<Vec<u8>, InferenceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(file)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn provider(policy: CachePolicy) -> (ArtifactProvider, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: MemorySource::new().with_file("m.json", LINEAR).with_file("s.json", SCALER),
            fetches: Arc::clone(&fetches),
        };
        let artifacts = HashMap::from([
            ("model".to_string(), "m.json".to_string()),
            ("scaler".to_string(), "s.json".to_string()),
        ]);
        (ArtifactProvider::new(artifacts, Box::new(source), policy), fetches)
    }

    #[test]
    fn test_unknown_model_fails_loudly() {
        let (provider, _) = provider(CachePolicy::Memoize);
        assert!(matches!(provider.regressor("rotor"), Err(InferenceError::UnknownModel(_))));
    }

    #[test]
    fn test_memoize_fetches_once() {
        let (provider, fetches) = provider(CachePolicy::Memoize);
        let a = provider.regressor("model").unwrap();
        let b = provider.regressor("model").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(a.predict(&[1.0, 1.0]).unwrap(), 6.0);
    }

    #[test]
    fn test_no_cache_refetches() {
        let (provider, fetches) = provider(CachePolicy::None);
        provider.scaler("scaler").unwrap();
        provider.scaler("scaler").unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_persist_writes_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, fetches) = provider(CachePolicy::Persist);
        let provider = provider.with_cache_dir(dir.path());

        provider.regressor("model").unwrap();
        assert!(dir.path().join("m.json").exists());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        // a fresh provider reads the local copy instead of the source
        let (second, second_fetches) = self::provider(CachePolicy::Persist);
        let second = second.with_cache_dir(dir.path());
        second.regressor("model").unwrap();
        assert_eq!(second_fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_persist_without_dir_is_error() {
        let (provider, _) = provider(CachePolicy::Persist);
        assert!(matches!(provider.regressor("model"), Err(InferenceError::ModelLoadError(_))));
    }

    #[test]
    fn test_input_shape_checked() {
        let (provider, _) = provider(CachePolicy::Memoize);
        let handle = provider.regressor("model").unwrap();
        let err = handle.predict(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidInputShape { expected: 2, actual: 3, .. }));
    }

    #[test]
    fn test_invalid_json_artifact() {
        let source = MemorySource::new().with_file("bad.json", "{");
        let provider = ArtifactProvider::new(
            HashMap::from([("bad".to_string(), "bad.json".to_string())]),
            Box::new(source),
            CachePolicy::Memoize,
        );
        assert!(matches!(provider.regressor("bad"), Err(InferenceError::InvalidArtifact { .. })));
    }

    #[test]
    fn test_onnx_reads_sidecar_manifest() {
        let source = MemorySource::new()
            .with_file("hyd.features.json", r#"{"version": "hyd_v2", "feature_names": ["a"]}"#)
            .with_file("hyd.onnx", vec![0u8; 8]);
        let provider = ArtifactProvider::new(
            HashMap::from([("hyd".to_string(), "hyd.onnx".to_string())]),
            Box::new(source),
            CachePolicy::Memoize,
        );
        // manifest parsed, graph bytes rejected by the ONNX loader
        assert!(matches!(provider.regressor("hyd"), Err(InferenceError::ModelLoadError(ref m)) if m.starts_with("ONNX")));
    }

    #[test]
    fn test_onnx_without_manifest() {
        let source = MemorySource::new().with_file("hyd.onnx", vec![0u8; 8]);
        let provider = ArtifactProvider::new(
            HashMap::from([("hyd".to_string(), "hyd.onnx".to_string())]),
            Box::new(source),
            CachePolicy::Memoize,
        );
        assert!(matches!(provider.regressor("hyd"), Err(InferenceError::ModelLoadError(ref m)) if m.contains("hyd.features.json")));
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m.json"), LINEAR).unwrap();
        let source = DirectorySource::new(dir.path());
        assert_eq!(source.fetch("m.json").unwrap(), LINEAR.as_bytes());
        assert!(source.fetch("missing.json").is_err());
    }
}
