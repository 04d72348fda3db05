//! Ingest Storage Library
//!
//! This crate provides the object-storage abstraction used by the object mover and its
//! implementations for S3 and for an in-process memory store.
//!
//! Objects are addressed by `(bucket, key)`. Every operation fails closed: errors are
//! surfaced as distinct [`StorageError`] values and never swallowed at this layer.

#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
