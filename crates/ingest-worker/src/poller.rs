//! Verdict poller: the long-running consumer loop.
//!
//! States are [`PollerState::Polling`] and [`PollerState::Stopped`]. The loop leaves
//! `Polling` only when its cancellation token fires, never because of an error. The
//! token is raced against the in-flight long poll and against the error backoff, so
//! shutdown does not wait for either to elapse.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use ingest_core::{Config, ErrorKind, QueueConfig, ScanVerdictEvent};
use ingest_storage::ObjectStorage;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::ack::Acknowledger;
use crate::mover::{MoveOutcome, ObjectMover};
use crate::queue::{QueueMessage, VerdictQueue};
use crate::router::{Verdict, VerdictRouter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Polling,
    Stopped,
}

/// What happened to one received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Moved(MoveOutcome),
    /// Another bucket or tenant's event.
    Ignored,
    /// Body missing or unparsable; redelivery cannot fix it.
    Malformed,
    /// A transient failure; left on the queue for redelivery.
    Retained,
    /// No receipt handle, so it cannot be acknowledged.
    Skipped,
}

impl Disposition {
    pub fn should_acknowledge(&self) -> bool {
        matches!(
            self,
            Disposition::Moved(_) | Disposition::Ignored | Disposition::Malformed
        )
    }
}

/// Counters for one received batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub received: usize,
    pub promoted: usize,
    pub already_moved: usize,
    pub quarantined: usize,
    pub ignored: usize,
    pub malformed: usize,
    pub retained: usize,
    pub skipped: usize,
    pub residual_risk: usize,
    pub acked: usize,
}

impl PollSummary {
    fn record(&mut self, disposition: Disposition, acked: bool) {
        match disposition {
            Disposition::Moved(MoveOutcome::Promoted | MoveOutcome::PromotedWithResidual) => {
                self.promoted += 1
            }
            Disposition::Moved(MoveOutcome::AlreadyMoved) => self.already_moved += 1,
            Disposition::Moved(MoveOutcome::Quarantined | MoveOutcome::QuarantineResidual) => {
                self.quarantined += 1
            }
            Disposition::Ignored => self.ignored += 1,
            Disposition::Malformed => self.malformed += 1,
            Disposition::Retained => self.retained += 1,
            Disposition::Skipped => self.skipped += 1,
        }
        if let Disposition::Moved(outcome) = disposition {
            if outcome.is_residual_risk() {
                self.residual_risk += 1;
            }
        }
        if acked {
            self.acked += 1;
        }
    }
}

pub struct VerdictPoller {
    queue: Arc<dyn VerdictQueue>,
    router: VerdictRouter,
    mover: ObjectMover,
    acknowledger: Acknowledger,
    max_messages: i32,
    wait_time: Duration,
    error_backoff: Duration,
    state_tx: watch::Sender<PollerState>,
}

impl VerdictPoller {
    pub fn new(
        queue: Arc<dyn VerdictQueue>,
        router: VerdictRouter,
        mover: ObjectMover,
        queue_config: &QueueConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(PollerState::Polling);
        Self {
            acknowledger: Acknowledger::new(queue.clone()),
            queue,
            router,
            mover,
            max_messages: queue_config.max_messages,
            wait_time: queue_config.wait_time,
            error_backoff: queue_config.error_backoff,
            state_tx,
        }
    }

    pub fn from_config(
        queue: Arc<dyn VerdictQueue>,
        storage: Arc<dyn ObjectStorage>,
        config: &Config,
    ) -> Self {
        Self::new(
            queue,
            VerdictRouter::from_config(&config.storage),
            ObjectMover::from_config(storage, &config.storage),
            &config.queue,
        )
    }

    /// Watch the loop state; flips to `Stopped` once `run` returns.
    pub fn state(&self) -> watch::Receiver<PollerState> {
        self.state_tx.subscribe()
    }

    /// Poll until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            max_messages = self.max_messages,
            wait_secs = self.wait_time.as_secs(),
            "Verdict poller started"
        );

        loop {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = self.queue.receive(self.max_messages, self.wait_time) => received,
            };

            match received {
                Ok(messages) if messages.is_empty() => {
                    tracing::trace!("No verdicts received, polling again");
                }
                Ok(messages) => {
                    let summary = self.process_batch(messages).await;
                    tracing::info!(
                        received = summary.received,
                        promoted = summary.promoted,
                        already_moved = summary.already_moved,
                        quarantined = summary.quarantined,
                        ignored = summary.ignored,
                        malformed = summary.malformed,
                        retained = summary.retained,
                        skipped = summary.skipped,
                        residual_risk = summary.residual_risk,
                        acked = summary.acked,
                        "Verdict batch processed"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        error_kind = %ErrorKind::TransientInfrastructure,
                        backoff_secs = self.error_backoff.as_secs(),
                        "Failed to receive verdicts, backing off"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.error_backoff) => {}
                    }
                }
            }
        }

        self.state_tx.send_replace(PollerState::Stopped);
        tracing::info!("Verdict poller stopped");
    }

    /// Handle every message of a batch concurrently. Messages share no state.
    pub async fn process_batch(&self, messages: Vec<QueueMessage>) -> PollSummary {
        let mut summary = PollSummary {
            received: messages.len(),
            ..Default::default()
        };
        let results = join_all(messages.iter().map(|m| self.handle_message(m))).await;
        for (disposition, acked) in results {
            summary.record(disposition, acked);
        }
        summary
    }

    /// Route, move and acknowledge one message. Returns its disposition and whether the
    /// acknowledgement went through.
    pub async fn handle_message(&self, message: &QueueMessage) -> (Disposition, bool) {
        let span = tracing::info_span!(
            "verdict_message",
            message_id = message.message_id.as_deref().unwrap_or("-")
        );

        async move {
            let Some(receipt_handle) = message.receipt_handle.as_deref() else {
                tracing::warn!("Message has no receipt handle, skipping");
                return (Disposition::Skipped, false);
            };

            let disposition = self.dispose(message.body.as_deref()).await;
            let acked = if disposition.should_acknowledge() {
                self.acknowledger.acknowledge(receipt_handle).await
            } else {
                false
            };
            (disposition, acked)
        }
        .instrument(span)
        .await
    }

    async fn dispose(&self, body: Option<&str>) -> Disposition {
        let Some(body) = body else {
            tracing::warn!(
                error_kind = %ErrorKind::MalformedInput,
                "Message has no body, dropping"
            );
            return Disposition::Malformed;
        };

        let event = match ScanVerdictEvent::from_message_body(body) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, error_kind = %e.kind(), "Dropping malformed verdict");
                return Disposition::Malformed;
            }
        };

        let verdict = self.router.route(&event);
        tracing::debug!(
            bucket = %event.bucket,
            key = %event.key,
            scan_status = %event.scan_status,
            verdict = %verdict,
            "Verdict routed"
        );

        match verdict {
            Verdict::Ignore => {
                tracing::info!(
                    bucket = %event.bucket,
                    key = %event.key,
                    error_kind = %ErrorKind::PolicyViolation,
                    "Verdict belongs to another bucket or tenant, skipping"
                );
                Disposition::Ignored
            }
            Verdict::Promote => match self.mover.promote(&event.key).await {
                Ok(outcome) => Disposition::Moved(outcome),
                Err(e) if e.allows_acknowledgement() => {
                    tracing::warn!(key = %event.key, error = %e, error_kind = %e.kind(), "Dropping unpromotable verdict");
                    Disposition::Malformed
                }
                Err(e) => {
                    tracing::error!(
                        key = %event.key,
                        error = %e,
                        error_kind = %e.kind(),
                        "Promotion failed, leaving message for redelivery"
                    );
                    Disposition::Retained
                }
            },
            Verdict::Quarantine => Disposition::Moved(self.mover.quarantine(&event.key).await),
        }
    }
}
