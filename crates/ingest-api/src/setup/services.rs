//! AWS clients, request-path services and the verdict poller

use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use ingest_core::constants::DEFAULT_STS_ENDPOINT;
use ingest_core::Config;
use ingest_services::{
    AnthropicGenerator, CredentialIssuer, StsFederationTokenProvider, TextGenerator,
};
use ingest_storage::{ObjectStorage, S3Storage};
use ingest_worker::{SqsVerdictQueue, VerdictPoller, VerdictQueue};

use crate::auth::{JwksTokenVerifier, TokenVerifier};
use crate::state::AppState;

const AWS_MAX_ATTEMPTS: u32 = 3;

pub struct Services {
    pub state: Arc<AppState>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub poller: VerdictPoller,
}

/// Shared SDK configuration. Credentials come from the default provider chain.
pub async fn load_aws_config(config: &Config) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.storage.aws_region.clone()))
        .retry_config(RetryConfig::standard().with_max_attempts(AWS_MAX_ATTEMPTS))
        .load()
        .await
}

/// Build every component once. Clients are shared by all requests and the poller.
pub async fn initialize_services(config: &Config) -> Result<Services> {
    let sdk_config = load_aws_config(config).await;

    let storage: Arc<dyn ObjectStorage> = Arc::new(S3Storage::new(
        &sdk_config,
        config.storage.s3_endpoint.as_deref(),
    ));
    let queue: Arc<dyn VerdictQueue> = Arc::new(SqsVerdictQueue::new(
        aws_sdk_sqs::Client::new(&sdk_config),
        config.queue.queue_url.clone(),
    ));
    let poller = VerdictPoller::from_config(queue, storage, config);

    let credential_issuer = Arc::new(CredentialIssuer::new(
        Arc::new(StsFederationTokenProvider::new(aws_sdk_sts::Client::new(
            &sdk_config,
        ))),
        config.storage.upload_bucket.clone(),
        config.tenant.kms_key_arn.clone(),
    ));

    let generator: Option<Arc<dyn TextGenerator>> = match &config.generation {
        Some(generation) => {
            let generator = AnthropicGenerator::new(
                generation.anthropic_api_key.clone(),
                generation.model.clone(),
            )
            .context("Failed to initialize text generation")?;
            tracing::info!(model = %generation.model, "Text generation enabled");
            Some(Arc::new(generator))
        }
        None => {
            tracing::info!("ANTHROPIC_API_KEY not set, text generation disabled");
            None
        }
    };

    let verifier: Arc<dyn TokenVerifier> = Arc::new(
        JwksTokenVerifier::new(&config.auth).context("Failed to initialize token verifier")?,
    );

    let state = Arc::new(AppState {
        tenant_id: config.tenant.tenant_id.clone(),
        credential_issuer,
        generator,
        sts_endpoint: DEFAULT_STS_ENDPOINT.to_string(),
    });

    Ok(Services {
        state,
        verifier,
        poller,
    })
}
