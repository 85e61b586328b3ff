//! Batch endpoints: upload, list, preview, remove, process, reset, download.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pixpress_core::{
    default_preset, find_preset, AppError, DecompressMode, ImageRecordResponse, ProcessingOptions,
    RestorationOptions, UpscaleMethod, DEFAULT_QUALITY,
};
use pixpress_worker::{BatchSummary, RunReport};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::form::UploadForm;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchResponse {
    pub images: Vec<ImageRecordResponse>,
    pub summary: BatchSummary,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessBatchRequest {
    /// Preset name, e.g. "Instagram Square" (default)
    #[serde(default)]
    pub preset: Option<String>,
    /// JPEG/output quality, 0-100 (default 85)
    #[serde(default)]
    pub quality: Option<u8>,
    #[serde(default)]
    pub upscale: UpscaleMethod,
    #[serde(default)]
    pub decompress: DecompressMode,
    #[serde(default)]
    pub polish: bool,
}

impl ProcessBatchRequest {
    fn into_options(self) -> Result<ProcessingOptions, AppError> {
        let preset = match self.preset.as_deref() {
            Some(name) => find_preset(name)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown preset '{}'", name)))?,
            None => default_preset(),
        };
        let options = ProcessingOptions::new(preset, self.quality.unwrap_or(DEFAULT_QUALITY))?;
        Ok(options.with_restorations(RestorationOptions {
            upscale: self.upscale,
            decompress: self.decompress,
            polish: self.polish,
        }))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessBatchResponse {
    pub report: RunReport,
    pub summary: BatchSummary,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResetBatchRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResetBatchResponse {
    pub removed: usize,
}

async fn batch_response(state: &AppState) -> BatchResponse {
    let records = state.batch.records().await;
    BatchResponse {
        images: records.iter().map(ImageRecordResponse::from).collect(),
        summary: state.batch.summary().await,
    }
}

/// Add images to the batch
///
/// Every file part with an `image/*` content type becomes a pending record;
/// other files are ignored.
#[utoipa::path(
    post,
    path = "/api/batch/images",
    tag = "batch",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Images added", body = BatchResponse),
        (status = 400, description = "No image files in the request", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "batch_add"))]
pub async fn add_images(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = UploadForm::read(multipart, state.max_file_size()).await?;
    let added = state.batch.add(form.into_files()).await?;

    let summary = state.batch.summary().await;
    Ok((
        StatusCode::CREATED,
        Json(BatchResponse {
            images: added.iter().map(ImageRecordResponse::from).collect(),
            summary,
        }),
    ))
}

/// List the batch with its aggregates
#[utoipa::path(
    get,
    path = "/api/batch",
    tag = "batch",
    responses((status = 200, description = "Current batch", body = BatchResponse))
)]
pub async fn get_batch(State(state): State<Arc<AppState>>) -> Json<BatchResponse> {
    Json(batch_response(&state).await)
}

/// Original bytes of one image, for display
#[utoipa::path(
    get,
    path = "/api/batch/images/{id}/preview",
    tag = "batch",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Source image bytes"),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
pub async fn preview_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let record = state.batch.get(id).await?;
    let source = record.source();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, source.content_type.as_str())
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(source.data.clone()))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}

/// Remove one image from the batch
#[utoipa::path(
    delete,
    path = "/api/batch/images/{id}",
    tag = "batch",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "batch_remove"))]
pub async fn remove_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.batch.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Process every pending image with one set of options
///
/// Images are edited one at a time; a failure marks that image as `error`
/// and the run continues. Returns once the run has finished.
#[utoipa::path(
    post,
    path = "/api/batch/process",
    tag = "batch",
    request_body = ProcessBatchRequest,
    responses(
        (status = 200, description = "Run finished", body = ProcessBatchResponse),
        (status = 400, description = "Unknown preset or invalid quality", body = ErrorResponse),
        (status = 409, description = "A run is already in progress", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "batch_process"))]
pub async fn process_batch(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ProcessBatchRequest>,
) -> Result<Json<ProcessBatchResponse>, HttpAppError> {
    let options = request.into_options()?;
    let report = state.batch.process_all(options).await?;

    Ok(Json(ProcessBatchResponse {
        report,
        summary: state.batch.summary().await,
    }))
}

/// Discard every image
///
/// A non-empty batch is only cleared with `confirm: true`.
#[utoipa::path(
    post,
    path = "/api/batch/reset",
    tag = "batch",
    request_body = ResetBatchRequest,
    responses(
        (status = 200, description = "Batch cleared", body = ResetBatchResponse),
        (status = 409, description = "Confirmation required", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "batch_reset"))]
pub async fn reset_batch(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ResetBatchRequest>,
) -> Result<Json<ResetBatchResponse>, HttpAppError> {
    let removed = state.batch.reset(request.confirm).await?;
    Ok(Json(ResetBatchResponse { removed }))
}

/// Download every completed image as one ZIP
#[utoipa::path(
    get,
    path = "/api/batch/download",
    tag = "batch",
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 409, description = "No processed images yet", body = ErrorResponse),
        (status = 500, description = "Failed to generate archive", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "batch_download"))]
pub async fn download_batch(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let archive = state.batch.download_archive().await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", archive.file_name),
        )
        .body(Body::from(archive.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}
