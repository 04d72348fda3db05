//! Scan verdict events delivered by the external malware scanner.
//!
//! Wire shape (unknown fields are ignored):
//!
//! ```json
//! {
//!   "detail": {
//!     "scanStatus": "NO_THREATS_FOUND",
//!     "resourceType": "S3_OBJECT",
//!     "s3ObjectDetails": { "bucketName": "landing", "key": "tenant-a/upload-1/file.pdf" }
//!   }
//! }
//! ```
//!
//! Some scanner versions report `scanStatus: "COMPLETED"` and carry the outcome in
//! `scanResultDetails.scanResultStatus`; when present, that field wins.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::SCAN_STATUS_CLEAN;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScanStatus {
    NoThreatsFound,
    ThreatsFound,
    Unsupported,
    AccessDenied,
    Failed,
    Other(String),
}

impl ScanStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, ScanStatus::NoThreatsFound)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScanStatus::NoThreatsFound => SCAN_STATUS_CLEAN,
            ScanStatus::ThreatsFound => "THREATS_FOUND",
            ScanStatus::Unsupported => "UNSUPPORTED",
            ScanStatus::AccessDenied => "ACCESS_DENIED",
            ScanStatus::Failed => "FAILED",
            ScanStatus::Other(ref raw) => raw,
        }
    }
}

impl From<&str> for ScanStatus {
    fn from(value: &str) -> Self {
        match value {
            SCAN_STATUS_CLEAN => ScanStatus::NoThreatsFound,
            "THREATS_FOUND" => ScanStatus::ThreatsFound,
            "UNSUPPORTED" => ScanStatus::Unsupported,
            "ACCESS_DENIED" => ScanStatus::AccessDenied,
            "FAILED" => ScanStatus::Failed,
            other => ScanStatus::Other(other.to_string()),
        }
    }
}

impl Display for ScanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Serialize for ScanStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One scan verdict, immutable once received. Logically keyed by `(bucket, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanVerdictEvent {
    pub bucket: String,
    pub key: String,
    pub scan_status: ScanStatus,
    pub resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerdictEnvelope {
    detail: VerdictDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerdictDetail {
    scan_status: String,
    #[serde(default)]
    resource_type: Option<String>,
    #[serde(default)]
    scan_result_details: Option<ScanResultDetails>,
    s3_object_details: S3ObjectDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanResultDetails {
    #[serde(default)]
    scan_result_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S3ObjectDetails {
    bucket_name: String,
    key: String,
}

impl ScanVerdictEvent {
    /// Parse a queue message body. Any structural problem is `MalformedInput`.
    pub fn from_message_body(body: &str) -> Result<Self, PipelineError> {
        let envelope: VerdictEnvelope = serde_json::from_str(body)?;
        let detail = envelope.detail;

        if detail.s3_object_details.bucket_name.trim().is_empty() {
            return Err(PipelineError::MalformedInput(
                "detail.s3ObjectDetails.bucketName is empty".to_string(),
            ));
        }
        if detail.s3_object_details.key.is_empty() {
            return Err(PipelineError::MalformedInput(
                "detail.s3ObjectDetails.key is empty".to_string(),
            ));
        }

        let status = detail
            .scan_result_details
            .and_then(|d| d.scan_result_status)
            .unwrap_or(detail.scan_status);

        Ok(ScanVerdictEvent {
            bucket: detail.s3_object_details.bucket_name,
            key: detail.s3_object_details.key,
            scan_status: ScanStatus::from(status.as_str()),
            resource_type: detail.resource_type,
        })
    }
}
