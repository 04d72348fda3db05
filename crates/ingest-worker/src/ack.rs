//! Acknowledger: deletes a handled message from the verdict queue.
//!
//! Only called once routing and the move have completed. A failed delete is logged and
//! dropped; the message reappears after its visibility window and is handled again,
//! which the mover tolerates.

use std::sync::Arc;

use crate::queue::VerdictQueue;

#[derive(Clone)]
pub struct Acknowledger {
    queue: Arc<dyn VerdictQueue>,
}

impl Acknowledger {
    pub fn new(queue: Arc<dyn VerdictQueue>) -> Self {
        Self { queue }
    }

    /// Returns whether the queue accepted the delete.
    pub async fn acknowledge(&self, receipt_handle: &str) -> bool {
        match self.queue.delete(receipt_handle).await {
            Ok(()) => {
                tracing::debug!("Message acknowledged");
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to acknowledge message, it will be redelivered"
                );
                false
            }
        }
    }
}
