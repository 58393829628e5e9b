//! Subsystem RUL Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, load_config, run_server, DEFAULT_CONFIG_FILE};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::var("RUL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = load_config(&path).with_context(|| format!("Failed to load configuration from {}", path))?;

    init_logging(&config.logging)?;

    info!("=== Subsystem RUL Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Models from {}, defaults from {}", config.paths.models_dir.display(), config.paths.defaults_file.display());

    run_server(config).await
}
