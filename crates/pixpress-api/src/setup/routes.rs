//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::constants::{API_BASE, MAX_FILES_PER_UPLOAD, OPENAPI_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use pixpress_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let config = &state.config;
    let cors = setup_cors(config)?;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let body_limit = config
        .max_file_size_bytes()
        .saturating_mul(MAX_FILES_PER_UPLOAD);

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .merge(editing_routes())
        .merge(batch_routes())
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn editing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/claid-upload", API_BASE),
            post(handlers::claid_upload::claid_upload),
        )
        .route(
            &format!("{}/process", API_BASE),
            post(handlers::process::process_image),
        )
        .route(
            &format!("{}/presets", API_BASE),
            get(handlers::presets::list_presets),
        )
}

fn batch_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/batch", API_BASE), get(handlers::batch::get_batch))
        .route(
            &format!("{}/batch/images", API_BASE),
            post(handlers::batch::add_images),
        )
        .route(
            &format!("{}/batch/images/{{id}}", API_BASE),
            delete(handlers::batch::remove_image),
        )
        .route(
            &format!("{}/batch/images/{{id}}/preview", API_BASE),
            get(handlers::batch::preview_image),
        )
        .route(
            &format!("{}/batch/process", API_BASE),
            post(handlers::batch::process_batch),
        )
        .route(
            &format!("{}/batch/reset", API_BASE),
            post(handlers::batch::reset_batch),
        )
        .route(
            &format!("{}/batch/download", API_BASE),
            get(handlers::batch::download_batch),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let exposed = [
        crate::constants::HEADER_ORIGINAL_SIZE,
        crate::constants::HEADER_NEW_SIZE,
        crate::constants::HEADER_CLAID_RESPONSE,
    ]
    .map(axum::http::HeaderName::from_static);

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers(exposed)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers(exposed)
    };
    Ok(cors)
}
