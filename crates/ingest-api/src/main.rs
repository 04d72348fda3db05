use ingest_api::setup;
use ingest_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize telemetry, AWS clients, components and routes
    let app = setup::initialize_app(config.clone()).await?;

    // Serve until a shutdown signal, then drain and stop the poller
    setup::server::start_server(&config, app.router, app.poller).await?;

    Ok(())
}
