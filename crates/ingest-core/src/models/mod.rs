//! Domain models of the ingestion pipeline.

pub mod credential;
pub mod tenant;
pub mod upload_session;
pub mod verdict;

pub use credential::TemporaryCredential;
pub use tenant::{TenantId, TenantIdError};
pub use upload_session::UploadSession;
pub use verdict::{ScanStatus, ScanVerdictEvent};
