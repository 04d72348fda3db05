//! Ingest Worker
//!
//! Background consumer of scan verdicts. One [`VerdictPoller`] task long-polls the
//! verdict queue for the lifetime of the process; each received message runs through
//! [`VerdictRouter`], [`ObjectMover`] and [`Acknowledger`] independently of the others.
//!
//! Delivery is at-least-once: a message is acknowledged only after routing and the move
//! completed (ignored, malformed and residual-risk outcomes included). Transient
//! failures leave the message on the queue so it reappears after its visibility window.

pub mod ack;
pub mod mover;
pub mod poller;
pub mod queue;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use ack::Acknowledger;
pub use mover::{MoveOutcome, ObjectMover};
pub use poller::{Disposition, PollSummary, PollerState, VerdictPoller};
#[cfg(feature = "sqs")]
pub use queue::SqsVerdictQueue;
pub use queue::{QueueError, QueueMessage, VerdictQueue};
pub use router::{Verdict, VerdictRouter};
