use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const MAX_TENANT_ID_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantIdError {
    #[error("tenant id must not be empty")]
    Empty,
    #[error("tenant id exceeds {MAX_TENANT_ID_LEN} characters")]
    TooLong,
    #[error("tenant id contains forbidden character {0:?}")]
    ForbiddenCharacter(char),
    #[error("tenant id must not be a relative path segment")]
    RelativeSegment,
}

/// Identifier of the tenant a deployment serves.
///
/// Only ASCII alphanumerics, `-`, `_` and `.` are accepted, so the value can be embedded in
/// object keys, resource ARNs and tag conditions without widening what they match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    pub fn parse(value: &str) -> Result<Self, TenantIdError> {
        if value.is_empty() {
            return Err(TenantIdError::Empty);
        }
        if value.len() > MAX_TENANT_ID_LEN {
            return Err(TenantIdError::TooLong);
        }
        if value == "." || value == ".." {
            return Err(TenantIdError::RelativeSegment);
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(TenantIdError::ForbiddenCharacter(c));
        }
        Ok(TenantId(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default key prefix owned by this tenant in shared buckets: `{tenant}/`.
    pub fn key_prefix(&self) -> String {
        format!("{}/", self.0)
    }
}

impl Display for TenantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = TenantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TenantId::parse(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TenantId::parse(&value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}
