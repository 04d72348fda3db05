use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct RequiredTagResponse {
    pub key: String,
    pub value: String,
    /// Ready-made `x-amz-tagging` header value.
    pub header: String,
}

/// Temporary credentials scoped to one new upload session.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadTokenResponse {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
    pub kms_key_id: String,
    pub required_tag: RequiredTagResponse,
    pub bucket: String,
    /// Every uploaded key must start with this prefix.
    pub upload_prefix: String,
    pub sts_endpoint: String,
}

/// Issue upload credentials for a fresh session of the deployment's tenant.
#[utoipa::path(
    get,
    path = "/api/v1/upload/token",
    tag = "upload",
    responses(
        (status = 200, description = "Credentials issued", body = UploadTokenResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Credential provider failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, user), fields(subject = %user.subject))]
pub async fn issue_upload_token(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let issued = state
        .credential_issuer
        .issue_upload_credentials(&state.tenant_id)
        .await?;

    Ok(Json(UploadTokenResponse {
        access_key: issued.credential.access_key,
        secret_key: issued.credential.secret_key,
        session_token: issued.credential.session_token,
        expiration: issued.credential.expiration,
        kms_key_id: issued.kms_key_id,
        required_tag: RequiredTagResponse {
            header: issued.required_tag.header_value(),
            key: issued.required_tag.key,
            value: issued.required_tag.value,
        },
        bucket: issued.bucket,
        upload_prefix: issued.upload_prefix,
        sts_endpoint: state.sts_endpoint.clone(),
    }))
}
