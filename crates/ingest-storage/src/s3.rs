use crate::traits::{ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client;

/// Error codes S3 uses for a missing object or source object.
fn is_missing_object_code(code: Option<&str>) -> bool {
    matches!(code, Some("NoSuchKey") | Some("NotFound"))
}

/// S3 storage implementation
///
/// One client serves both the landing and the tenant bucket; the bucket is an argument
/// of every call.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    /// Create a new S3Storage from a shared SDK configuration.
    ///
    /// # Arguments
    /// * `sdk_config` - Loaded AWS configuration (region, credentials, retry policy)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO). Enables path-style addressing.
    pub fn new(sdk_config: &SdkConfig, endpoint_url: Option<&str>) -> Self {
        let client = if let Some(endpoint) = endpoint_url {
            let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(sdk_config)
        };

        S3Storage { client }
    }

    pub fn from_client(client: Client) -> Self {
        S3Storage { client }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    #[tracing::instrument(skip(self), fields(
        aws.service.name = "s3",
        aws.s3.operation = "CopyObject"
    ))]
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();

        // URL-encode the copy source per AWS S3 API requirements
        let encoded_key = urlencoding::encode(source_key);
        let copy_source = format!("{}/{}", source_bucket, encoded_key);

        let result = self
            .client
            .copy_object()
            .bucket(dest_bucket)
            .copy_source(&copy_source)
            .key(dest_key)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!(
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 copy successful"
                );
                Ok(())
            }
            Err(e) if is_missing_object_code(e.code()) => {
                Err(StorageError::not_found(source_bucket, source_key))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    error_code = ?e.code(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 copy failed"
                );
                Err(StorageError::CopyFailed(e.to_string()))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(
        aws.service.name = "s3",
        aws.s3.operation = "DeleteObject"
    ))]
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let result = self
            .client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!(
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete successful"
                );
                Ok(())
            }
            Err(e) if is_missing_object_code(e.code()) => Err(StorageError::not_found(bucket, key)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    error_code = ?e.code(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
