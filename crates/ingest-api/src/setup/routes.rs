//! Route configuration and setup

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, Uri},
    routing::{get, post},
    Json, Router,
};
use ingest_core::{AppError, Config};
use ingest_infra::request_id_middleware;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthState, TokenVerifier};
use crate::constants::{
    API_PREFIX, HTTP_CONCURRENCY_LIMIT, MAX_REQUEST_BODY_BYTES, OPENAPI_PATH,
};
use crate::error::HttpAppError;
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
    verifier: Arc<dyn TokenVerifier>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        verifier,
        tenant_id: state.tenant_id.clone(),
    });

    let protected_routes =
        protected_routes().layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let api_routes = public_routes().merge(protected_routes);

    tracing::info!(
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        max_request_body_bytes = MAX_REQUEST_BODY_BYTES,
        "HTTP limits configured"
    );

    let app = Router::new()
        .nest(API_PREFIX, api_routes)
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .fallback(route_not_found)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

async fn route_not_found(uri: Uri) -> HttpAppError {
    HttpAppError(AppError::NotFound(format!("No route for {}", uri.path())))
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.server.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .server
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::liveness_check))
}

/// Protected routes (require authentication)
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/upload/token",
            get(handlers::upload_token::issue_upload_token),
        )
        .route("/user/profile", get(handlers::profile::get_profile))
        .route("/ai/prompt", post(handlers::prompt::submit_prompt))
}
