//! Fixed limits of the ingestion pipeline.
//!
//! These are deliberately not configurable.

/// Lifetime of issued upload credentials, in seconds. Hard upper bound.
pub const UPLOAD_CREDENTIAL_DURATION_SECS: i32 = 900;

/// Name of the object tag every upload must carry.
pub const TENANT_TAG_KEY: &str = "tenantId";

/// Key prefix segment that marks an upload session directory.
pub const UPLOAD_SESSION_PREFIX: &str = "upload-";

/// Scan status reported for objects without findings.
pub const SCAN_STATUS_CLEAN: &str = "NO_THREATS_FOUND";

/// Maximum messages a single queue receive may return.
pub const MAX_RECEIVE_BATCH: i32 = 10;

/// Maximum long-poll wait a single queue receive may use, in seconds.
pub const MAX_RECEIVE_WAIT_SECS: i32 = 20;

/// Default global STS endpoint handed back to clients.
pub const DEFAULT_STS_ENDPOINT: &str = "https://sts.amazonaws.com";
