use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::TenantId;
use crate::constants::{UPLOAD_CREDENTIAL_DURATION_SECS, UPLOAD_SESSION_PREFIX};

/// A single credential request's upload area: `{tenant}/upload-{nonce}`.
///
/// Not persisted. Its only durable trace is the policy issued with the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub tenant_id: TenantId,
    pub nonce: String,
    pub prefix: String,
    pub expires_at: DateTime<Utc>,
}

impl UploadSession {
    /// Start a session with a fresh random nonce.
    pub fn start(tenant_id: TenantId, now: DateTime<Utc>) -> Self {
        Self::with_nonce(tenant_id, Uuid::new_v4().simple().to_string(), now)
    }

    pub fn with_nonce(tenant_id: TenantId, nonce: String, now: DateTime<Utc>) -> Self {
        let prefix = format!("{}/{}{}", tenant_id, UPLOAD_SESSION_PREFIX, nonce);
        Self {
            tenant_id,
            nonce,
            prefix,
            expires_at: now + Duration::seconds(UPLOAD_CREDENTIAL_DURATION_SECS as i64),
        }
    }

    /// Object-key pattern the session may write to.
    pub fn key_pattern(&self) -> String {
        format!("{}/*", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_prefix_is_tenant_scoped() {
        let tenant = TenantId::parse("tenant-a").unwrap();
        let now = Utc::now();
        let session = UploadSession::with_nonce(tenant, "abc123".to_string(), now);
        assert_eq!(session.prefix, "tenant-a/upload-abc123");
        assert_eq!(session.key_pattern(), "tenant-a/upload-abc123/*");
        assert_eq!((session.expires_at - now).num_seconds(), 900);
    }

    #[test]
    fn concurrent_sessions_never_share_a_prefix() {
        let tenant = TenantId::parse("tenant-a").unwrap();
        let now = Utc::now();
        let first = UploadSession::start(tenant.clone(), now);
        let second = UploadSession::start(tenant, now);
        assert_ne!(first.prefix, second.prefix);
    }
}
