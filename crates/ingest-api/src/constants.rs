//! API constants

/// Versioned prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Path the OpenAPI document is served on.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Service name reported in logs.
pub const SERVICE_NAME: &str = "ingest-api";

/// Largest accepted request body. No route takes file content.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Largest accepted prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 8000;

/// Requests served at once before callers queue.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Timeout of a single JWKS fetch.
pub const JWKS_FETCH_TIMEOUT_SECS: u64 = 10;
