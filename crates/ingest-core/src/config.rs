//! Configuration module
//!
//! All bucket names, queue URLs, identity settings and limits are read once at start-up
//! into an immutable [`Config`] that is passed to each component at construction time.
//! Nothing reads the process environment after that point.

use std::env;
use std::time::Duration;

use crate::constants::{MAX_RECEIVE_BATCH, MAX_RECEIVE_WAIT_SECS};
use crate::models::TenantId;

const SERVER_PORT: u16 = 8080;
const SHUTDOWN_GRACE_SECS: u64 = 5;
const VERDICT_QUEUE_ERROR_BACKOFF_SECS: u64 = 5;
const JWKS_CACHE_TTL_SECS: i64 = 3600;
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP transport settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    /// Time in-flight requests get to finish after the shutdown signal.
    pub shutdown_grace: Duration,
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
}

/// The tenant this deployment serves and its key-management settings
#[derive(Clone, Debug)]
pub struct TenantConfig {
    pub tenant_id: TenantId,
    pub kms_key_arn: String,
}

/// Buckets and prefixes of the two ownership domains
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub aws_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, LocalStack, ...)
    pub s3_endpoint: Option<String>,
    /// Shared, short-lived area holding scan-pending objects.
    pub landing_bucket: String,
    /// Private, durable area receiving promoted objects.
    pub tenant_bucket: String,
    /// Bucket the issued upload credentials may write to.
    pub upload_bucket: String,
    /// Key prefix that marks this tenant's objects in the landing bucket.
    pub tenant_prefix: String,
}

/// Verdict queue consumption settings
#[derive(Clone, Debug)]
pub struct QueueConfig {
    pub queue_url: String,
    pub max_messages: i32,
    pub wait_time: Duration,
    pub error_backoff: Duration,
}

/// External identity provider settings
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub jwks_url: String,
    pub audience: Option<String>,
    pub jwks_cache_ttl_seconds: i64,
}

/// Text generation provider settings
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub anthropic_api_key: String,
    pub model: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub tenant: TenantConfig,
    pub storage: StorageConfig,
    pub queue: QueueConfig,
    pub auth: AuthConfig,
    pub generation: Option<GenerationConfig>,
}

fn required<F>(lookup: &F, name: &str) -> Result<String, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", name))
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from the process environment (and an optional `.env` file).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = optional(&lookup, "ENVIRONMENT")
            .or_else(|| optional(&lookup, "APP_ENV"))
            .unwrap_or_else(|| "development".to_string());
        let is_production = is_production_env(&environment);

        let cors_origins = optional(&lookup, "CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match optional(&lookup, "LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") if !is_production => LogFormat::Pretty,
            None if !is_production => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        let server = ServerConfig {
            port: optional(&lookup, "PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            shutdown_grace: Duration::from_secs(
                optional(&lookup, "SHUTDOWN_GRACE_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(SHUTDOWN_GRACE_SECS),
            ),
            cors_origins,
            log_format,
        };

        let tenant_id_raw = required(&lookup, "TENANT_ID")?;
        let tenant_id = TenantId::parse(&tenant_id_raw)
            .map_err(|e| anyhow::anyhow!("TENANT_ID is invalid: {}", e))?;
        let tenant = TenantConfig {
            tenant_id,
            kms_key_arn: required(&lookup, "KMS_TENANT_KEY_ARN")?,
        };

        let landing_bucket = required(&lookup, "LANDING_BUCKET")?;
        let storage = StorageConfig {
            aws_region: required(&lookup, "AWS_REGION")?,
            s3_endpoint: optional(&lookup, "S3_ENDPOINT"),
            upload_bucket: optional(&lookup, "UPLOAD_BUCKET")
                .unwrap_or_else(|| landing_bucket.clone()),
            landing_bucket,
            tenant_bucket: required(&lookup, "TENANT_BUCKET")?,
            tenant_prefix: optional(&lookup, "TENANT_PREFIX")
                .unwrap_or_else(|| tenant.tenant_id.key_prefix()),
        };

        let queue = QueueConfig {
            queue_url: required(&lookup, "VERDICT_QUEUE_URL")?,
            max_messages: optional(&lookup, "VERDICT_QUEUE_MAX_MESSAGES")
                .and_then(|s| s.parse::<i32>().ok())
                .unwrap_or(MAX_RECEIVE_BATCH)
                .clamp(1, MAX_RECEIVE_BATCH),
            wait_time: Duration::from_secs(
                optional(&lookup, "VERDICT_QUEUE_WAIT_SECS")
                    .and_then(|s| s.parse::<i32>().ok())
                    .unwrap_or(MAX_RECEIVE_WAIT_SECS)
                    .clamp(0, MAX_RECEIVE_WAIT_SECS) as u64,
            ),
            error_backoff: Duration::from_secs(
                optional(&lookup, "VERDICT_QUEUE_ERROR_BACKOFF_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(VERDICT_QUEUE_ERROR_BACKOFF_SECS),
            ),
        };

        let issuer = required(&lookup, "AUTH_ISSUER")?
            .trim_end_matches('/')
            .to_string();
        let auth = AuthConfig {
            jwks_url: optional(&lookup, "AUTH_JWKS_URL")
                .unwrap_or_else(|| format!("{}/.well-known/jwks.json", issuer)),
            issuer,
            audience: optional(&lookup, "AUTH_AUDIENCE"),
            jwks_cache_ttl_seconds: optional(&lookup, "AUTH_JWKS_CACHE_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(JWKS_CACHE_TTL_SECS),
        };

        let generation = optional(&lookup, "ANTHROPIC_API_KEY").map(|anthropic_api_key| {
            GenerationConfig {
                anthropic_api_key,
                model: optional(&lookup, "ANTHROPIC_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            }
        });

        Ok(Config {
            server,
            tenant,
            storage,
            queue,
            auth,
            generation,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.server.environment)
    }

    /// Reject combinations that would break tenant isolation or leak credentials.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage.landing_bucket.eq_ignore_ascii_case(&self.storage.tenant_bucket) {
            anyhow::bail!("LANDING_BUCKET and TENANT_BUCKET must differ");
        }
        if self.storage.tenant_prefix.is_empty() || !self.storage.tenant_prefix.ends_with('/') {
            anyhow::bail!("TENANT_PREFIX must be non-empty and end with '/'");
        }
        if !self.queue.queue_url.starts_with("http://")
            && !self.queue.queue_url.starts_with("https://")
        {
            anyhow::bail!("VERDICT_QUEUE_URL must be an http(s) URL");
        }
        if self.is_production() {
            if !self.auth.issuer.starts_with("https://") {
                anyhow::bail!("AUTH_ISSUER must use https in production");
            }
            if self.server.cors_origins.iter().any(|o| o == "*") {
                anyhow::bail!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                );
            }
        }
        Ok(())
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("TENANT_ID", "tenant-a"),
            ("KMS_TENANT_KEY_ARN", "arn:aws:kms:eu-west-1:123456789012:key/abc"),
            ("AWS_REGION", "eu-west-1"),
            ("LANDING_BUCKET", "landing"),
            ("TENANT_BUCKET", "tenant-a-data"),
            (
                "VERDICT_QUEUE_URL",
                "https://sqs.eu-west-1.amazonaws.com/123456789012/verdicts",
            ),
            (
                "AUTH_ISSUER",
                "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_pool/",
            ),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, anyhow::Error> {
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_are_applied() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.shutdown_grace, Duration::from_secs(5));
        assert_eq!(config.server.log_format, LogFormat::Pretty);
        assert_eq!(config.storage.upload_bucket, "landing");
        assert_eq!(config.storage.tenant_prefix, "tenant-a/");
        assert_eq!(config.queue.max_messages, 10);
        assert_eq!(config.queue.wait_time, Duration::from_secs(20));
        assert_eq!(config.queue.error_backoff, Duration::from_secs(5));
        assert_eq!(
            config.auth.jwks_url,
            "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_pool/.well-known/jwks.json"
        );
        assert!(config.generation.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn queue_limits_are_clamped() {
        let mut vars = base_vars();
        vars.insert("VERDICT_QUEUE_MAX_MESSAGES", "50");
        vars.insert("VERDICT_QUEUE_WAIT_SECS", "90");
        let config = load(&vars).unwrap();
        assert_eq!(config.queue.max_messages, 10);
        assert_eq!(config.queue.wait_time, Duration::from_secs(20));
    }

    #[test]
    fn missing_required_variable_is_reported() {
        let mut vars = base_vars();
        vars.remove("VERDICT_QUEUE_URL");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("VERDICT_QUEUE_URL"));
    }

    #[test]
    fn invalid_tenant_id_is_rejected() {
        let mut vars = base_vars();
        vars.insert("TENANT_ID", "tenant\"a");
        assert!(load(&vars).unwrap_err().to_string().contains("TENANT_ID"));
    }

    #[test]
    fn identical_buckets_fail_validation() {
        let mut vars = base_vars();
        vars.insert("TENANT_BUCKET", "LANDING");
        let config = load(&vars).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_forces_json_logs_and_strict_cors() {
        let mut vars = base_vars();
        vars.insert("ENVIRONMENT", "production");
        vars.insert("LOG_FORMAT", "pretty");
        let config = load(&vars).unwrap();
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert!(config.validate().is_err());

        vars.insert("CORS_ORIGINS", "https://app.example.com");
        let config = load(&vars).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn generation_enabled_by_api_key() {
        let mut vars = base_vars();
        vars.insert("ANTHROPIC_API_KEY", "sk-test");
        let config = load(&vars).unwrap();
        let generation = config.generation.unwrap();
        assert_eq!(generation.model, DEFAULT_ANTHROPIC_MODEL);
    }
}
