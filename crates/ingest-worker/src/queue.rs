//! Verdict queue: long-poll receive and delete-by-receipt.
//!
//! Implementations hold no per-consumer state; cancellation is done by dropping the
//! in-flight `receive` future.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Failed to receive messages: {0}")]
    ReceiveFailed(String),

    #[error("Failed to delete message: {0}")]
    DeleteFailed(String),
}

/// One received queue message. Fields the transport may omit are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: Option<String>,
    pub receipt_handle: Option<String>,
    pub body: Option<String>,
}

impl QueueMessage {
    pub fn new(message_id: &str, receipt_handle: &str, body: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.to_string()),
            receipt_handle: Some(receipt_handle.to_string()),
            body: Some(body.into()),
        }
    }
}

#[async_trait]
pub trait VerdictQueue: Send + Sync {
    /// Receive up to `max_messages`, waiting at most `wait_time` for the first one.
    /// An empty batch means the wait elapsed.
    async fn receive(
        &self,
        max_messages: i32,
        wait_time: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    /// Delete a message by the receipt handle it was received with.
    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError>;
}

#[cfg(feature = "sqs")]
pub use sqs::SqsVerdictQueue;

#[cfg(feature = "sqs")]
mod sqs {
    use super::*;
    use aws_sdk_sqs::error::DisplayErrorContext;
    use aws_sdk_sqs::Client;

    /// Verdict queue backed by Amazon SQS.
    #[derive(Clone)]
    pub struct SqsVerdictQueue {
        client: Client,
        queue_url: String,
    }

    impl SqsVerdictQueue {
        pub fn new(client: Client, queue_url: String) -> Self {
            Self { client, queue_url }
        }
    }

    #[async_trait]
    impl VerdictQueue for SqsVerdictQueue {
        #[tracing::instrument(skip(self), fields(
            aws.service.name = "sqs",
            aws.sqs.operation = "ReceiveMessage"
        ))]
        async fn receive(
            &self,
            max_messages: i32,
            wait_time: Duration,
        ) -> Result<Vec<QueueMessage>, QueueError> {
            let output = self
                .client
                .receive_message()
                .queue_url(&self.queue_url)
                .max_number_of_messages(max_messages)
                .wait_time_seconds(wait_time.as_secs() as i32)
                .send()
                .await
                .map_err(|e| QueueError::ReceiveFailed(DisplayErrorContext(&e).to_string()))?;

            Ok(output
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|m| QueueMessage {
                    message_id: m.message_id,
                    receipt_handle: m.receipt_handle,
                    body: m.body,
                })
                .collect())
        }

        #[tracing::instrument(skip(self, receipt_handle), fields(
            aws.service.name = "sqs",
            aws.sqs.operation = "DeleteMessage"
        ))]
        async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
            self.client
                .delete_message()
                .queue_url(&self.queue_url)
                .receipt_handle(receipt_handle)
                .send()
                .await
                .map_err(|e| QueueError::DeleteFailed(DisplayErrorContext(&e).to_string()))?;
            Ok(())
        }
    }
}
