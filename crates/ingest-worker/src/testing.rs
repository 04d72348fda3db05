//! Fakes shared by the worker tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ingest_storage::{MemoryStorage, ObjectStorage, StorageError, StorageResult};
use tokio::time::Instant;

use crate::queue::{QueueError, QueueMessage, VerdictQueue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Copy {
        from: (String, String),
        to: (String, String),
    },
    Delete(String, String),
}

/// Memory storage that records every call and can inject delete failures.
pub struct RecordingStorage {
    inner: MemoryStorage,
    calls: Mutex<Vec<StorageCall>>,
    fail_deletes: AtomicBool,
    missing_on_delete: AtomicBool,
}

impl RecordingStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
            missing_on_delete: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn report_missing_on_delete(&self) {
        self.missing_on_delete.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> StorageResult<()> {
        self.calls.lock().unwrap().push(StorageCall::Copy {
            from: (source_bucket.to_string(), source_key.to_string()),
            to: (dest_bucket.to_string(), dest_key.to_string()),
        });
        self.inner
            .copy_object(source_bucket, source_key, dest_bucket, dest_key)
            .await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StorageCall::Delete(bucket.to_string(), key.to_string()));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("injected failure".to_string()));
        }
        if self.missing_on_delete.load(Ordering::SeqCst) {
            return Err(StorageError::not_found(bucket, key));
        }
        self.inner.delete_object(bucket, key).await
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Queue that replays scripted receive results, then blocks like an idle long poll
/// that never returns.
#[derive(Default)]
pub struct ScriptedQueue {
    script: Mutex<VecDeque<Result<Vec<QueueMessage>, QueueError>>>,
    receive_times: Mutex<Vec<Instant>>,
    receive_calls: AtomicUsize,
    deleted: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl ScriptedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, batch: Vec<QueueMessage>) {
        self.script.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_error(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(QueueError::ReceiveFailed(message.to_string())));
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    pub fn receive_times(&self) -> Vec<Instant> {
        self.receive_times.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerdictQueue for ScriptedQueue {
    async fn receive(
        &self,
        _max_messages: i32,
        _wait_time: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        self.receive_times.lock().unwrap().push(Instant::now());
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(QueueError::DeleteFailed("injected failure".to_string()));
        }
        self.deleted.lock().unwrap().push(receipt_handle.to_string());
        Ok(())
    }
}

/// Scanner event body for `bucket/key` with `status`.
pub fn verdict_body(bucket: &str, key: &str, status: &str) -> String {
    serde_json::json!({
        "version": "0",
        "detail-type": "GuardDuty Malware Protection Object Scan Result",
        "source": "aws.guardduty",
        "detail": {
            "scanStatus": status,
            "resourceType": "S3_OBJECT",
            "s3ObjectDetails": { "bucketName": bucket, "key": key }
        }
    })
    .to_string()
}
