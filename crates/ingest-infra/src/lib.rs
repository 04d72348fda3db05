//! Ingest Infrastructure
//!
//! Cross-cutting plumbing shared by the binary: tracing subscriber setup and HTTP
//! middleware.

#[cfg(feature = "middleware")]
pub mod middleware;
pub mod telemetry;

#[cfg(feature = "middleware")]
pub use middleware::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, shutdown_telemetry};
