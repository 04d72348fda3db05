//! Ingest Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every component of the upload-and-scan ingestion pipeline.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{
    AuthConfig, Config, GenerationConfig, LogFormat, QueueConfig, ServerConfig, StorageConfig,
    TenantConfig,
};
pub use error::{AppError, ErrorKind, ErrorMetadata, LogLevel, PipelineError};
pub use models::{
    ScanStatus, ScanVerdictEvent, TemporaryCredential, TenantId, TenantIdError, UploadSession,
};
