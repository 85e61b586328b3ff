use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Editor used for batch runs: "claid" or "local"
    pub backend: String,
    pub claid_configured: bool,
    pub batch_processing: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        backend: state.batch.editor_name().to_string(),
        claid_configured: state.claid.is_configured(),
        batch_processing: state.batch.is_processing(),
    })
}
