//! Subsystem RUL Service
//!
//! HTTP API returning remaining-useful-life predictions for engine,
//! hydraulics and landing gear.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use feature_defaults::{DefaultsOrigin, DefaultsTable, Subsystem};
use inference_engine::{
    ArtifactProvider, CachePolicy, DirectorySource, InferenceEngine, InferenceError, RescalePolicy, RulPrediction,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
mod routes;

pub use crate::config::{load_config, AppConfig, LoggingConfig, DEFAULT_CONFIG_FILE};
pub use error::{ApiError, ErrorBody};

use storage::{PredictionRecord, Repository};

/// Application state shared across handlers
pub struct AppState {
    pub engine: InferenceEngine,
    /// Prediction log
    pub repository: Repository,
    /// Prometheus renderer, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: InferenceEngine, repository: Repository) -> Self {
        Self {
            engine,
            repository,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Count the outcome and log successful predictions
    pub(crate) fn record(
        &self,
        subsystem: Subsystem,
        result: Result<RulPrediction, InferenceError>,
    ) -> Result<RulPrediction, ApiError> {
        let label = subsystem.as_str();
        let prediction = match result {
            Ok(prediction) => prediction,
            Err(e) => return Err(self.record_failure(subsystem, e)),
        };

        metrics::counter!("rul_predictions_total", "subsystem" => label).increment(1);
        metrics::histogram!("rul_prediction_latency_seconds", "subsystem" => label)
            .record(prediction.latency.as_secs_f64());

        self.repository.insert_prediction(PredictionRecord::new(
            subsystem,
            prediction.raw_rul,
            prediction.predicted_rul,
            prediction.model_version.clone(),
            prediction.health.as_str(),
        ))?;

        Ok(prediction)
    }

    /// Count a failed prediction
    pub(crate) fn record_failure(&self, subsystem: Subsystem, error: InferenceError) -> ApiError {
        metrics::counter!("rul_prediction_errors_total", "subsystem" => subsystem.as_str()).increment(1);
        error.into()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub defaults: DefaultsHealth,
    pub cache_policy: CachePolicy,
    pub rescale_policy: RescalePolicy,
}

/// Defaults table summary
#[derive(Debug, Serialize)]
pub struct DefaultsHealth {
    pub origin: DefaultsOrigin,
    pub engine: usize,
    pub hydraulics: usize,
    pub landing_gear: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/predict/engine", post(routes::predict::engine))
        .route("/predict/engine/batch", post(routes::predict::engine_batch))
        .route("/predict/hydraulics", post(routes::predict::hydraulics))
        .route("/predict/hydraulics/batch", post(routes::predict::hydraulics_batch))
        .route("/predict/landing-gear", post(routes::predict::landing_gear))
        .route("/predict/landing-gear/batch", post(routes::predict::landing_gear_batch))
        .route("/predictions", get(routes::predictions::get_predictions))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let defaults = state.engine.defaults();
    let status = if defaults.is_degraded() { "degraded" } else { "ok" };

    Json(HealthResponse {
        status,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        defaults: DefaultsHealth {
            origin: defaults.origin(),
            engine: defaults.section(Subsystem::Engine).len(),
            hydraulics: defaults.section(Subsystem::Hydraulics).len(),
            landing_gear: defaults.section(Subsystem::LandingGear).len(),
        },
        cache_policy: state.engine.provider().cache_policy(),
        rescale_policy: state.engine.settings().rescale,
    })
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = Level::from_str(&config.level).unwrap_or_else(|_| {
        eprintln!("Unknown log level '{}', using info", config.level);
        Level::INFO
    });

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
    .context("Failed to set tracing subscriber")
}

/// Load defaults, wire the model provider and build the shared state
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let defaults = DefaultsTable::load(&config.paths.defaults_file)
        .with_context(|| format!("Invalid feature defaults in {}", config.paths.defaults_file.display()))?;
    defaults.log_health();

    let source = DirectorySource::new(&config.paths.models_dir);
    let provider = ArtifactProvider::new(config.models.artifacts.clone(), Box::new(source), config.models.cache_policy)
        .with_cache_dir(&config.models.cache_dir);

    let jitter = config.hydraulics.noise.into_jitter(config.hydraulics.seed);
    let engine = InferenceEngine::new(
        Arc::new(provider),
        Arc::new(defaults),
        config.hydraulics.inference_settings(),
        jitter,
    )
    .context("Hydraulics feature order does not match the defaults table")?;

    if config.models.preload {
        engine.preload().context("Model preload failed")?;
    }

    let repository = Repository::with_max_records(config.history.max_records)?;
    Ok(AppState::new(engine, repository))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let mut state = build_state(&config)?;
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Prometheus recorder not installed: {}", e),
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
