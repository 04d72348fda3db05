use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use ingest_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::constants::MAX_PROMPT_CHARS;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromptResponse {
    pub status: String,
    pub response: String,
}

/// Send a prompt to the configured text generation provider.
#[utoipa::path(
    post,
    path = "/api/v1/ai/prompt",
    tag = "ai",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Generated text", body = PromptResponse),
        (status = 400, description = "Empty or oversized prompt", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Generation provider failed", body = ErrorResponse),
        (status = 503, description = "Generation not configured", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, user, request), fields(subject = %user.subject))]
pub async fn submit_prompt(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<PromptRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::InvalidInput("prompt must not be empty".to_string()).into());
    }
    let prompt_chars = prompt.chars().count();
    if prompt_chars > MAX_PROMPT_CHARS {
        return Err(AppError::InvalidInput(format!(
            "prompt exceeds {} characters",
            MAX_PROMPT_CHARS
        ))
        .into());
    }

    let generator = state.generator.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Text generation is not configured".to_string())
    })?;

    tracing::debug!(
        model = generator.model_name(),
        prompt_chars,
        "Forwarding prompt"
    );
    let response = generator.generate(prompt).await?;

    Ok(Json(PromptResponse {
        status: "success".to_string(),
        response,
    }))
}
