use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
};
use pixpress_core::{default_preset, AppError, DEFAULT_QUALITY};
use pixpress_processing::{ImageTransformer, ResizeOutput, ResizeRequest};

use crate::constants::{HEADER_NEW_SIZE, HEADER_ORIGINAL_SIZE};
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::form::UploadForm;
use crate::state::AppState;

/// Resize one image locally
///
/// Cover-fits the image to `width` x `height` (default preset when omitted)
/// and re-encodes it as JPEG at `quality` (default 85).
#[utoipa::path(
    post,
    path = "/api/process",
    tag = "editing",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "JPEG bytes with X-Original-Size and X-New-Size headers", content_type = "image/jpeg"),
        (status = 400, description = "No image or invalid parameters", body = ErrorResponse),
        (status = 500, description = "Failed to process image", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "local_process"))]
pub async fn process_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = UploadForm::read(multipart, state.max_file_size()).await?;

    let image = form
        .take_file("image")
        .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    let preset = default_preset();
    let width = form.parse::<u32>("width")?.unwrap_or(preset.width);
    let height = form.parse::<u32>("height")?.unwrap_or(preset.height);
    let quality = form.parse::<u8>("quality")?.unwrap_or(DEFAULT_QUALITY);
    if quality > 100 {
        return Err(AppError::InvalidInput(format!(
            "Quality must be between 0 and 100, got {}",
            quality
        ))
        .into());
    }

    let request = ResizeRequest::new(width, height, quality);
    let data = image.data.clone();
    let output = tokio::task::spawn_blocking(move || ImageTransformer::resize_to_jpeg(&data, request))
        .await
        .map_err(|e| AppError::Internal(format!("Resize task failed: {}", e)))?
        .map_err(AppError::from)?;

    tracing::info!(
        file_name = %image.file_name,
        original_size = output.original_size,
        new_size = output.new_size,
        "Image resized locally"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, ResizeOutput::CONTENT_TYPE)
        .header(HEADER_ORIGINAL_SIZE, output.original_size)
        .header(HEADER_NEW_SIZE, output.new_size)
        .body(Body::from(output.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}
