//! Credential issuer
//!
//! Exchanges a per-session upload policy for temporary credentials at an external
//! federation-token service. The duration is fixed; callers cannot extend it. Provider
//! failures are returned as-is, retries belong to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ingest_core::constants::{TENANT_TAG_KEY, UPLOAD_CREDENTIAL_DURATION_SECS};
use ingest_core::{TemporaryCredential, TenantId, UploadSession};
use serde::Serialize;
use thiserror::Error;

use crate::policy::build_upload_policy;

/// Maximum packed size the federation service accepts for an inline policy.
const MAX_POLICY_LEN: usize = 2048;
/// Federated user names are limited to 32 characters.
const MAX_FEDERATION_NAME_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Federation token provider failed: {0}")]
    Provider(String),

    #[error("Federation token response is malformed: {0}")]
    MalformedResponse(String),

    #[error("Upload policy is invalid: {0}")]
    InvalidPolicy(String),
}

/// One federation-token call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederationTokenRequest {
    pub name: String,
    pub policy: String,
    pub duration_secs: i32,
}

/// External federation-token service.
#[async_trait]
pub trait FederationTokenProvider: Send + Sync {
    async fn get_federation_token(
        &self,
        request: FederationTokenRequest,
    ) -> Result<TemporaryCredential, CredentialError>;
}

/// Object tag every upload must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredTag {
    pub key: String,
    pub value: String,
}

impl RequiredTag {
    /// Value for the `x-amz-tagging` upload header.
    pub fn header_value(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Everything a client needs to upload into its session.
#[derive(Debug, Clone)]
pub struct IssuedUploadCredentials {
    pub credential: TemporaryCredential,
    pub required_tag: RequiredTag,
    pub kms_key_id: String,
    pub bucket: String,
    pub upload_prefix: String,
}

pub struct CredentialIssuer {
    provider: Arc<dyn FederationTokenProvider>,
    upload_bucket: String,
    kms_key_arn: String,
}

impl CredentialIssuer {
    pub fn new(
        provider: Arc<dyn FederationTokenProvider>,
        upload_bucket: String,
        kms_key_arn: String,
    ) -> Self {
        Self {
            provider,
            upload_bucket,
            kms_key_arn,
        }
    }

    /// Issue credentials for one new upload session of `tenant_id`.
    ///
    /// `tenant_id` must come from configuration or a verified identity, never from
    /// request input.
    #[tracing::instrument(skip(self, tenant_id), fields(tenant_id = %tenant_id))]
    pub async fn issue_upload_credentials(
        &self,
        tenant_id: &TenantId,
    ) -> Result<IssuedUploadCredentials, CredentialError> {
        let issued_at = Utc::now();
        let session = UploadSession::start(tenant_id.clone(), issued_at);
        let policy = build_upload_policy(&session, &self.upload_bucket, &self.kms_key_arn)
            .to_json()
            .map_err(|e| CredentialError::InvalidPolicy(e.to_string()))?;
        if policy.len() > MAX_POLICY_LEN {
            return Err(CredentialError::InvalidPolicy(format!(
                "policy is {} bytes, limit is {}",
                policy.len(),
                MAX_POLICY_LEN
            )));
        }

        let request = FederationTokenRequest {
            name: federation_name(tenant_id),
            policy,
            duration_secs: UPLOAD_CREDENTIAL_DURATION_SECS,
        };

        let mut credential = self.provider.get_federation_token(request).await?;

        // Never report a lifetime longer than the one requested.
        let ceiling = issued_at + Duration::seconds(UPLOAD_CREDENTIAL_DURATION_SECS as i64);
        if credential.expiration > ceiling {
            credential.expiration = ceiling;
        }

        tracing::info!(
            upload_prefix = %session.prefix,
            expiration = %credential.expiration,
            "Issued upload credentials"
        );

        Ok(IssuedUploadCredentials {
            credential,
            required_tag: RequiredTag {
                key: TENANT_TAG_KEY.to_string(),
                value: tenant_id.as_str().to_string(),
            },
            kms_key_id: self.kms_key_arn.clone(),
            bucket: self.upload_bucket.clone(),
            upload_prefix: format!("{}/", session.prefix),
        })
    }
}

fn federation_name(tenant_id: &TenantId) -> String {
    let mut name = format!("Upload-{}", tenant_id);
    name.truncate(MAX_FEDERATION_NAME_LEN);
    name
}

#[cfg(feature = "sts")]
pub use sts::StsFederationTokenProvider;

#[cfg(feature = "sts")]
mod sts {
    use super::*;
    use aws_sdk_sts::Client;

    /// Federation tokens from AWS STS `GetFederationToken`.
    #[derive(Clone)]
    pub struct StsFederationTokenProvider {
        client: Client,
    }

    impl StsFederationTokenProvider {
        pub fn new(client: Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl FederationTokenProvider for StsFederationTokenProvider {
        #[tracing::instrument(skip(self, request), fields(
            aws.service.name = "sts",
            aws.sts.operation = "GetFederationToken",
            federation_name = %request.name
        ))]
        async fn get_federation_token(
            &self,
            request: FederationTokenRequest,
        ) -> Result<TemporaryCredential, CredentialError> {
            let start = std::time::Instant::now();

            let output = self
                .client
                .get_federation_token()
                .name(request.name)
                .policy(request.policy)
                .duration_seconds(request.duration_secs)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "STS GetFederationToken failed"
                    );
                    CredentialError::Provider(e.to_string())
                })?;

            let credentials = output.credentials().ok_or_else(|| {
                CredentialError::MalformedResponse("response carries no credentials".to_string())
            })?;

            let expiration = credentials.expiration();
            let expiration = DateTime::<Utc>::from_timestamp(
                expiration.secs(),
                expiration.subsec_nanos(),
            )
            .ok_or_else(|| {
                CredentialError::MalformedResponse("expiration out of range".to_string())
            })?;

            tracing::debug!(
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "STS GetFederationToken successful"
            );

            Ok(TemporaryCredential {
                access_key: credentials.access_key_id().to_string(),
                secret_key: credentials.secret_access_key().to_string(),
                session_token: credentials.session_token().to_string(),
                expiration,
            })
        }
    }
}
