//! Verdict router.
//!
//! Decision order, first match wins:
//! 1. bucket is not the landing bucket (ASCII case-insensitive), or key is not under the
//!    tenant prefix: [`Verdict::Ignore`]
//! 2. scan status is clean: [`Verdict::Promote`]
//! 3. anything else: [`Verdict::Quarantine`]

use ingest_core::{ScanVerdictEvent, StorageConfig};
use ingest_storage::traits::validate_key;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Promote,
    Quarantine,
    Ignore,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Promote => "promote",
            Verdict::Quarantine => "quarantine",
            Verdict::Ignore => "ignore",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct VerdictRouter {
    landing_bucket: String,
    tenant_prefix: String,
}

impl VerdictRouter {
    pub fn new(landing_bucket: impl Into<String>, tenant_prefix: impl Into<String>) -> Self {
        Self {
            landing_bucket: landing_bucket.into(),
            tenant_prefix: tenant_prefix.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.landing_bucket, &config.tenant_prefix)
    }

    /// Classify one event. Deterministic, no I/O.
    pub fn route(&self, event: &ScanVerdictEvent) -> Verdict {
        if !event.bucket.eq_ignore_ascii_case(&self.landing_bucket) || !self.owns_key(&event.key) {
            return Verdict::Ignore;
        }
        if event.scan_status.is_clean() {
            Verdict::Promote
        } else {
            Verdict::Quarantine
        }
    }

    /// A key is owned when it sits strictly below the prefix and has no `..` segment
    /// that could resolve outside of it.
    fn owns_key(&self, key: &str) -> bool {
        key.len() > self.tenant_prefix.len()
            && key.starts_with(&self.tenant_prefix)
            && validate_key(key).is_ok()
    }
}
