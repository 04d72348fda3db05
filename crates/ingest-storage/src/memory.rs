//! In-process object store.
//!
//! Holds objects in a map keyed by `(bucket, key)`. Used for local development and by the
//! pipeline tests; it follows S3 semantics for missing objects (copy fails with
//! `NotFound`, delete succeeds).

use crate::traits::{validate_key, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

type ObjectMap = BTreeMap<(String, String), Vec<u8>>;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<ObjectMap>>,
    /// Buckets whose operations fail with a backend error.
    failing_buckets: Arc<RwLock<HashSet<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_object(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    pub async fn get_object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys currently stored in `bucket`, in lexical order.
    pub async fn list_keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Make every operation touching `bucket` fail, simulating an outage.
    pub async fn fail_bucket(&self, bucket: &str) {
        self.failing_buckets.write().await.insert(bucket.to_string());
    }

    pub async fn restore_bucket(&self, bucket: &str) {
        self.failing_buckets.write().await.remove(bucket);
    }

    async fn is_failing(&self, bucket: &str) -> bool {
        self.failing_buckets.read().await.contains(bucket)
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> StorageResult<()> {
        validate_key(source_key)?;
        validate_key(dest_key)?;
        if self.is_failing(source_bucket).await || self.is_failing(dest_bucket).await {
            return Err(StorageError::CopyFailed(format!(
                "bucket unavailable: {} -> {}",
                source_bucket, dest_bucket
            )));
        }

        let mut objects = self.objects.write().await;
        let data = objects
            .get(&(source_bucket.to_string(), source_key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::not_found(source_bucket, source_key))?;
        objects.insert((dest_bucket.to_string(), dest_key.to_string()), data);

        tracing::debug!(
            source_bucket = %source_bucket,
            source_key = %source_key,
            dest_bucket = %dest_bucket,
            "Memory copy successful"
        );
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        if self.is_failing(bucket).await {
            return Err(StorageError::DeleteFailed(format!(
                "bucket unavailable: {}",
                bucket
            )));
        }
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
