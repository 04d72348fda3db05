use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use ingest_core::{AppError, TenantId};

use crate::auth::models::AuthenticatedUser;
use crate::auth::verifier::TokenVerifier;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub tenant_id: TenantId,
}

/// Require `Authorization: Bearer <token>` and attach the verified caller.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token.to_string(),
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing or malformed Authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let claims = match auth_state.verifier.verify(&token).await {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(subject = %claims.sub, "Request authenticated");

    let user = AuthenticatedUser::from_claims(claims, auth_state.tenant_id.clone());
    request.extensions_mut().insert(user);

    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
