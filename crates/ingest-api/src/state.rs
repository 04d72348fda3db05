//! Application state shared by the request handlers.

use std::sync::Arc;

use ingest_core::TenantId;
use ingest_services::{CredentialIssuer, TextGenerator};

#[derive(Clone)]
pub struct AppState {
    /// Tenant served by this deployment. Never taken from request input.
    pub tenant_id: TenantId,
    pub credential_issuer: Arc<CredentialIssuer>,
    /// `None` when no generation provider is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Token-service endpoint clients use with the issued credentials.
    pub sts_endpoint: String,
}
