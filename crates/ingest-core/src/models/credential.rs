use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Temporary storage credentials handed to a client exactly once.
///
/// Never persisted server-side. `Debug` redacts the secret parts so the value can appear
/// in tracing spans without leaking.
#[derive(Clone, Serialize)]
pub struct TemporaryCredential {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl Debug for TemporaryCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TemporaryCredential")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let credential = TemporaryCredential {
            access_key: "ASIAEXAMPLE".to_string(),
            secret_key: "very-secret".to_string(),
            session_token: "token-value".to_string(),
            expiration: Utc::now(),
        };
        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("ASIAEXAMPLE"));
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("token-value"));
    }
}
