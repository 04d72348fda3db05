//! OpenAPI documentation.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;

struct BearerAuthAddon;

impl Modify for BearerAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ingest API",
        version = "0.1.0",
        description = "Upload credential issuance for the upload-and-scan ingestion pipeline. Uploaded objects are promoted to tenant storage once the external scanner reports them clean."
    ),
    paths(
        handlers::health::liveness_check,
        handlers::upload_token::issue_upload_token,
        handlers::profile::get_profile,
        handlers::prompt::submit_prompt,
    ),
    components(
        schemas(
            handlers::health::LivenessResponse,
            handlers::upload_token::UploadTokenResponse,
            handlers::upload_token::RequiredTagResponse,
            handlers::profile::ProfileResponse,
            handlers::prompt::PromptRequest,
            handlers::prompt::PromptResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuthAddon),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "upload", description = "Scoped upload credential issuance"),
        (name = "user", description = "Authenticated caller identity"),
        (name = "ai", description = "Text generation")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
