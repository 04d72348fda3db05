//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must implement.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    pub fn not_found(bucket: &str, key: &str) -> Self {
        StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Implementations are long-lived, stateless from the caller's perspective and safe to
/// share between the request-serving path and the verdict poller.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Copy `source_bucket/source_key` to `dest_bucket/dest_key`.
    ///
    /// Returns [`StorageError::NotFound`] when the source object does not exist.
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> StorageResult<()>;

    /// Delete `bucket/key`.
    ///
    /// Backends may report a missing object either as success or as
    /// [`StorageError::NotFound`]; callers treat both the same.
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Name of the backend, for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Keys must not be empty, start with `/` or contain `..` segments.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must not start with '/': {}",
            key
        )));
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "key must not contain '..' segments: {}",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("tenant-a/upload-1/file.pdf").is_ok());
        assert!(validate_key("tenant-a/upload-1/..hidden").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/tenant-a/file").is_err());
        assert!(validate_key("tenant-a/../tenant-b/file").is_err());
    }

    #[test]
    fn test_not_found_helper() {
        let err = StorageError::not_found("landing", "k");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Object not found: landing/k");
        assert!(!StorageError::DeleteFailed("x".into()).is_not_found());
    }
}
