use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ingest_core::{AppError, TenantId};
use serde::{Deserialize, Serialize};

use crate::error::HttpAppError;

/// Claims read from a verified identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub token_use: Option<String>,
}

/// Caller identity attached to the request by the auth middleware.
///
/// `tenant_id` is the configured tenant of this deployment, never a claim.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub email: Option<String>,
    pub tenant_id: TenantId,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims, tenant_id: TenantId) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            tenant_id,
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing authenticated user".to_string(),
                ))
            })
    }
}
