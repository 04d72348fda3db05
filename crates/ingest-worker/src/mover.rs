//! Object mover: promote (copy + delete from landing) and quarantine (delete from landing).
//!
//! Copy and delete are independent calls, not a transaction. Only a failed copy is
//! fatal for a message; a failed landing delete leaves a residual object that is logged
//! with `residual_risk = true` and otherwise tolerated. A missing object on either call is
//! what a redelivered message sees after an earlier successful run.

use std::sync::Arc;

use ingest_core::{ErrorKind, PipelineError, StorageConfig};
use ingest_storage::{ObjectStorage, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Copied to the tenant bucket and removed from landing.
    Promoted,
    /// Source already gone from landing; an earlier delivery moved it.
    AlreadyMoved,
    /// Copied to the tenant bucket, but the landing copy could not be removed.
    PromotedWithResidual,
    /// Removed from landing.
    Quarantined,
    /// The unsafe object could not be removed from landing.
    QuarantineResidual,
}

impl MoveOutcome {
    pub fn is_residual_risk(&self) -> bool {
        matches!(
            self,
            MoveOutcome::PromotedWithResidual | MoveOutcome::QuarantineResidual
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveOutcome::Promoted => "promoted",
            MoveOutcome::AlreadyMoved => "already_moved",
            MoveOutcome::PromotedWithResidual => "promoted_with_residual",
            MoveOutcome::Quarantined => "quarantined",
            MoveOutcome::QuarantineResidual => "quarantine_residual",
        }
    }
}

#[derive(Clone)]
pub struct ObjectMover {
    storage: Arc<dyn ObjectStorage>,
    landing_bucket: String,
    tenant_bucket: String,
}

impl ObjectMover {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        landing_bucket: impl Into<String>,
        tenant_bucket: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            landing_bucket: landing_bucket.into(),
            tenant_bucket: tenant_bucket.into(),
        }
    }

    pub fn from_config(storage: Arc<dyn ObjectStorage>, config: &StorageConfig) -> Self {
        Self::new(storage, &config.landing_bucket, &config.tenant_bucket)
    }

    /// Copy `key` from landing to the tenant bucket under the same key, then delete it
    /// from landing.
    #[tracing::instrument(skip(self), fields(
        landing_bucket = %self.landing_bucket,
        tenant_bucket = %self.tenant_bucket
    ))]
    pub async fn promote(&self, key: &str) -> Result<MoveOutcome, PipelineError> {
        match self
            .storage
            .copy_object(&self.landing_bucket, key, &self.tenant_bucket, key)
            .await
        {
            Ok(()) => {}
            Err(StorageError::NotFound { .. }) => {
                tracing::info!(key = %key, "Source object no longer in landing, treating as already moved");
                return Ok(MoveOutcome::AlreadyMoved);
            }
            Err(StorageError::InvalidKey(reason)) => {
                return Err(PipelineError::MalformedInput(reason));
            }
            Err(e) => return Err(PipelineError::transient("copy_object", e)),
        }

        match self.delete_from_landing(key).await {
            Ok(()) => {
                tracing::info!(key = %key, backend = self.storage.backend_name(), "Object promoted");
                Ok(MoveOutcome::Promoted)
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    residual_risk = true,
                    error_kind = %ErrorKind::ResidualRisk,
                    "Object promoted but landing copy could not be deleted"
                );
                Ok(MoveOutcome::PromotedWithResidual)
            }
        }
    }

    /// Delete `key` from landing. Never fails: a failed delete is reported as
    /// [`MoveOutcome::QuarantineResidual`].
    #[tracing::instrument(skip(self), fields(landing_bucket = %self.landing_bucket))]
    pub async fn quarantine(&self, key: &str) -> MoveOutcome {
        match self.delete_from_landing(key).await {
            Ok(()) => {
                tracing::info!(key = %key, "Unsafe object removed from landing");
                MoveOutcome::Quarantined
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    residual_risk = true,
                    error_kind = %ErrorKind::ResidualRisk,
                    "Unsafe object could not be deleted from landing"
                );
                MoveOutcome::QuarantineResidual
            }
        }
    }

    async fn delete_from_landing(&self, key: &str) -> Result<(), StorageError> {
        match self.storage.delete_object(&self.landing_bucket, key).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
