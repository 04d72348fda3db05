use ingest_core::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub fn default_filter() -> &'static str {
    "ingest=debug,tower_http=debug"
}

/// Install the global tracing subscriber.
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_telemetry(
    service_name: &str,
    environment: &str,
    log_format: &LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed, keeping it");
        return Ok(());
    }

    tracing::info!(
        service.name = %service_name,
        deployment.environment = %environment,
        log_format = ?log_format,
        "Tracing initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
