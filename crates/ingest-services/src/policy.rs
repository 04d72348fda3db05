//! Upload policy builder
//!
//! Builds the access policy attached to a federation token for one upload session.
//! The document is assembled from typed values and serialized with serde, so tenant ids
//! and nonces are always JSON-escaped and can never alter the document structure.
//!
//! Granted, and nothing else:
//! - `s3:PutObject` and `s3:PutObjectTagging` on `arn:aws:s3:::{bucket}/{tenant}/upload-{nonce}/*`,
//!   only when the request carries the object tag `tenantId={tenant}`
//! - `kms:GenerateDataKey` and `kms:Decrypt` on the tenant's key

use std::collections::BTreeMap;

use ingest_core::constants::TENANT_TAG_KEY;
use ingest_core::UploadSession;
use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";

/// Storage actions an upload session may perform.
pub const UPLOAD_ACTIONS: [&str; 2] = ["s3:PutObject", "s3:PutObjectTagging"];

/// Key-management actions required for server-side encryption under the tenant key.
pub const KMS_ACTIONS: [&str; 2] = ["kms:GenerateDataKey", "kms:Decrypt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// `{"StringEquals": {"s3:RequestObjectTag/tenantId": "tenant-a"}}`
pub type Condition = BTreeMap<&'static str, BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub sid: &'static str,
    pub effect: Effect,
    pub action: Vec<&'static str>,
    pub resource: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Every action granted by the document.
    pub fn granted_actions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.statement
            .iter()
            .filter(|s| s.effect == Effect::Allow)
            .flat_map(|s| s.action.iter().copied())
    }
}

/// Object-tag condition key for the tenant tag.
pub fn tenant_tag_condition_key() -> String {
    format!("s3:RequestObjectTag/{}", TENANT_TAG_KEY)
}

/// Build the policy for one upload session.
///
/// `bucket` is the bucket uploads are written to; `kms_key_arn` the tenant's key.
pub fn build_upload_policy(
    session: &UploadSession,
    bucket: &str,
    kms_key_arn: &str,
) -> PolicyDocument {
    let mut tag_condition = BTreeMap::new();
    tag_condition.insert(
        tenant_tag_condition_key(),
        session.tenant_id.as_str().to_string(),
    );
    let mut condition = Condition::new();
    condition.insert("StringEquals", tag_condition);

    PolicyDocument {
        version: POLICY_VERSION,
        statement: vec![
            Statement {
                sid: "AllowTaggedUploadToSessionPrefix",
                effect: Effect::Allow,
                action: UPLOAD_ACTIONS.to_vec(),
                resource: vec![format!(
                    "arn:aws:s3:::{}/{}",
                    bucket,
                    session.key_pattern()
                )],
                condition: Some(condition),
            },
            Statement {
                sid: "AllowTenantKeyUsage",
                effect: Effect::Allow,
                action: KMS_ACTIONS.to_vec(),
                resource: vec![kms_key_arn.to_string()],
                condition: None,
            },
        ],
    }
}
