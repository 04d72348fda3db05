//! Test helpers: build the router with fake capabilities.
//!
//! Nothing here talks to AWS or an identity provider. The router is the production one
//! from `setup::routes`; only the verifier, the federation-token provider and the text
//! generator are swapped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use ingest_api::auth::{Claims, TokenVerifier};
use ingest_api::constants;
use ingest_api::setup::routes;
use ingest_api::state::AppState;
use ingest_core::constants::DEFAULT_STS_ENDPOINT;
use ingest_core::{AppError, Config, TemporaryCredential};
use ingest_services::{
    CredentialError, CredentialIssuer, FederationTokenProvider, FederationTokenRequest,
    GenerationError, TextGenerator,
};

pub const VALID_TOKEN: &str = "valid-token";
pub const TEST_SUBJECT: &str = "user-123";
pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_TENANT: &str = "tenant-a";
pub const TEST_KMS_KEY: &str = "arn:aws:kms:eu-west-1:123456789012:key/abc";

/// API path with the version prefix (e.g. `/api/v1/health`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("TENANT_ID", TEST_TENANT),
        ("KMS_TENANT_KEY_ARN", TEST_KMS_KEY),
        ("AWS_REGION", "eu-west-1"),
        ("LANDING_BUCKET", "landing"),
        ("TENANT_BUCKET", "tenant-a-data"),
        (
            "VERDICT_QUEUE_URL",
            "https://sqs.eu-west-1.amazonaws.com/123456789012/verdicts",
        ),
        ("AUTH_ISSUER", "https://issuer.example.com"),
    ]);
    Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .expect("test configuration is valid")
}

/// Accepts [`VALID_TOKEN`] only.
pub struct FakeVerifier;

#[async_trait]
impl TokenVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        if token == VALID_TOKEN {
            Ok(Claims {
                sub: TEST_SUBJECT.to_string(),
                email: Some(TEST_EMAIL.to_string()),
                exp: (Utc::now() + Duration::hours(1)).timestamp(),
                iat: None,
                iss: Some("https://issuer.example.com".to_string()),
                token_use: Some("access".to_string()),
            })
        } else {
            Err(AppError::Unauthorized(
                "Key ID secret-kid-42 not found in JWKS".to_string(),
            ))
        }
    }
}

/// Federation-token provider that records requests.
#[derive(Default)]
pub struct FakeProvider {
    pub fail_with: Option<String>,
    pub requests: Mutex<Vec<FederationTokenRequest>>,
}

impl FakeProvider {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FederationTokenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FederationTokenProvider for FakeProvider {
    async fn get_federation_token(
        &self,
        request: FederationTokenRequest,
    ) -> Result<TemporaryCredential, CredentialError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.fail_with {
            return Err(CredentialError::Provider(message.clone()));
        }
        Ok(TemporaryCredential {
            access_key: "ASIAEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            session_token: "session".to_string(),
            expiration: Utc::now() + Duration::seconds(request.duration_secs as i64),
        })
    }
}

/// Generator that echoes the prompt, or fails.
pub struct FakeGenerator {
    pub fail: bool,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.fail {
            return Err(GenerationError::Provider {
                status: 401,
                body: "invalid x-api-key sk-ant-secret".to_string(),
            });
        }
        Ok(format!("echo: {}", prompt))
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub provider: Arc<FakeProvider>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn setup_test_app_with(
    provider: FakeProvider,
    generator: Option<Arc<dyn TextGenerator>>,
) -> TestApp {
    let config = test_config();
    let provider = Arc::new(provider);
    let state = Arc::new(AppState {
        tenant_id: config.tenant.tenant_id.clone(),
        credential_issuer: Arc::new(CredentialIssuer::new(
            provider.clone(),
            config.storage.upload_bucket.clone(),
            config.tenant.kms_key_arn.clone(),
        )),
        generator,
        sts_endpoint: DEFAULT_STS_ENDPOINT.to_string(),
    });

    let router = routes::setup_routes(&config, state, Arc::new(FakeVerifier))
        .expect("router builds");
    let server = TestServer::new(router).expect("test server starts");

    TestApp { server, provider }
}

/// App with a working provider and an echoing generator.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(
        FakeProvider::default(),
        Some(Arc::new(FakeGenerator { fail: false })),
    )
}
