//! Application setup and initialization
//!
//! Everything that builds the process: telemetry, AWS clients, components, routes and
//! the background poller. Kept apart from `main` so tests can assemble the router with
//! their own capabilities.

pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use ingest_core::Config;
use ingest_worker::VerdictPoller;

use crate::constants::SERVICE_NAME;
use crate::state::AppState;

/// A fully assembled, not yet running application.
pub struct Application {
    pub state: Arc<AppState>,
    pub router: Router,
    pub poller: VerdictPoller,
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<Application> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    ingest_infra::init_telemetry(
        SERVICE_NAME,
        &config.server.environment,
        &config.server.log_format,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        tenant_id = %config.tenant.tenant_id,
        landing_bucket = %config.storage.landing_bucket,
        tenant_bucket = %config.storage.tenant_bucket,
        generation_enabled = config.generation.is_some(),
        "Configuration loaded and validated successfully"
    );

    let services = services::initialize_services(&config).await?;

    let router = routes::setup_routes(&config, services.state.clone(), services.verifier)?;

    Ok(Application {
        state: services.state,
        router,
        poller: services.poller,
    })
}
