//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use pixpress_core::Config;
use pixpress_services::{editor_from_config, ClaidClient, ClaidConfig};
use pixpress_worker::BatchOrchestrator;
use std::sync::Arc;

/// Build the shared state and the router. Telemetry must already be initialized.
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;
    crate::error::set_production_mode(config.is_production());

    let claid = ClaidClient::new(ClaidConfig::from(&config)).context("Failed to build Claid client")?;
    if !claid.is_configured() {
        tracing::warn!("CLAID_API_KEY not set; /api/claid-upload will answer with a configuration error");
    }

    let editor = editor_from_config(&config).context("Failed to select image editor")?;
    tracing::info!(
        backend = editor.name(),
        queue_size = config.batch_queue_size,
        "Batch orchestrator ready"
    );
    let batch = BatchOrchestrator::new(editor, config.batch_queue_size);

    let state = Arc::new(AppState {
        config,
        claid,
        batch,
    });

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
