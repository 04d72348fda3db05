use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub tenant_id: String,
}

/// Identity of the authenticated caller.
#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    tag = "user",
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(user), fields(subject = %user.subject))]
pub async fn get_profile(user: AuthenticatedUser) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(ProfileResponse {
        subject: user.subject,
        email: user.email,
        tenant_id: user.tenant_id.to_string(),
    }))
}
