//! Shutdown behaviour of the combined server and poller.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use ingest_api::setup::server::serve_until_cancelled;
use ingest_core::QueueConfig;
use ingest_storage::MemoryStorage;
use ingest_worker::{
    ObjectMover, PollerState, QueueError, QueueMessage, VerdictPoller, VerdictQueue,
    VerdictRouter,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Long poll that never returns on its own.
#[derive(Default)]
struct IdleQueue {
    receives: AtomicUsize,
}

#[async_trait]
impl VerdictQueue for IdleQueue {
    async fn receive(
        &self,
        _max_messages: i32,
        _wait_time: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        self.receives.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn delete(&self, _receipt_handle: &str) -> Result<(), QueueError> {
        Ok(())
    }
}

fn poller(queue: Arc<IdleQueue>) -> VerdictPoller {
    let config = helpers::test_config();
    VerdictPoller::new(
        queue,
        VerdictRouter::from_config(&config.storage),
        ObjectMover::from_config(Arc::new(MemoryStorage::new()), &config.storage),
        &QueueConfig {
            queue_url: config.queue.queue_url.clone(),
            max_messages: 10,
            wait_time: Duration::from_secs(20),
            error_backoff: Duration::from_secs(5),
        },
    )
}

#[tokio::test]
async fn test_cancel_stops_server_and_aborts_in_flight_poll() {
    let queue = Arc::new(IdleQueue::default());
    let poller = poller(queue.clone());
    let mut state = poller.state();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let app = Router::new().route("/", get(|| async { "ok" }));
    let shutdown = CancellationToken::new();

    let running = tokio::spawn(serve_until_cancelled(
        listener,
        app,
        poller,
        shutdown.clone(),
        Duration::from_secs(2),
    ));

    // Let the poller enter its long poll.
    while queue.receives.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    shutdown.cancel();

    // Bounded by the grace period, not by the 20s long-poll wait.
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("shutdown is bounded")
        .expect("server task joins");
    assert!(result.is_ok());

    state
        .wait_for(|s| *s == PollerState::Stopped)
        .await
        .expect("poller reports stopped");
    assert_eq!(queue.receives.load(Ordering::SeqCst), 1);
}
