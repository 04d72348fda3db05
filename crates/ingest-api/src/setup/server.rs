//! Server startup and graceful shutdown
//!
//! One cancellation token drives both halves of the process. On SIGINT/SIGTERM it is
//! cancelled: the poller abandons its in-flight receive, the server stops accepting
//! connections, and in-flight requests get `shutdown_grace` to finish before the
//! server future is dropped.

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use ingest_core::Config;
use ingest_worker::VerdictPoller;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router, poller: VerdictPoller) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server.port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = TcpListener::bind(&addr).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    tracing::info!(
        queue_url = %config.queue.queue_url,
        shutdown_grace_secs = config.server.shutdown_grace.as_secs(),
        "Server ready and accepting connections"
    );

    serve_until_cancelled(listener, app, poller, shutdown, config.server.shutdown_grace).await
}

/// Run the poller and the HTTP server until `shutdown` is cancelled, then drain both.
pub async fn serve_until_cancelled(
    listener: TcpListener,
    app: Router,
    poller: VerdictPoller,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<()> {
    let poller_handle = tokio::spawn(poller.run(shutdown.child_token()));

    let mut server = Box::pin(
        axum::serve(listener, app)
            .with_graceful_shutdown({
                let shutdown = shutdown.clone();
                async move { shutdown.cancelled().await }
            })
            .into_future(),
    );

    let served = tokio::select! {
        result = &mut server => result.map_err(anyhow::Error::from),
        _ = grace_elapsed(&shutdown, grace) => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed, closing remaining connections"
            );
            Ok(())
        }
    };

    // Connections that outlived the grace period end with the runtime.
    drop(server);

    // The server can also stop on its own (listener failure); the poller follows it.
    shutdown.cancel();

    match tokio::time::timeout(grace, poller_handle).await {
        Ok(Ok(())) => tracing::info!("Verdict poller stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Verdict poller task failed"),
        Err(_) => tracing::warn!("Verdict poller did not stop within the grace period"),
    }

    ingest_infra::shutdown_telemetry().await;

    served
}

async fn grace_elapsed(shutdown: &CancellationToken, grace: Duration) {
    shutdown.cancelled().await;
    tokio::time::sleep(grace).await;
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals to initiate graceful shutdown.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
