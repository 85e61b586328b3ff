use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pixpress_core::{AppError, DecompressMode, EditOperations, UpscaleMethod};
use pixpress_services::EditOutcome;

use crate::constants::{HEADER_CLAID_RESPONSE, HEADER_NEW_SIZE, HEADER_ORIGINAL_SIZE};
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::form::UploadForm;
use crate::state::AppState;

/// Edit one image through Claid
///
/// Form fields: `image` (file), optional `width`, `height`, `upscale`,
/// `decompress` and `polish`. Responds with the processed image bytes, or with
/// Claid's raw JSON when it returned no temporary output URL.
#[utoipa::path(
    post,
    path = "/api/claid-upload",
    tag = "editing",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Processed image bytes with X-Original-Size, X-New-Size and X-Claid-Response headers, or raw Claid JSON"),
        (status = 400, description = "No image or malformed field", body = ErrorResponse),
        (status = 500, description = "Missing CLAID_API_KEY or processing failure", body = ErrorResponse),
        (status = 503, description = "Upstream status is forwarded on Claid errors", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "claid_upload"))]
pub async fn claid_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = UploadForm::read(multipart, state.max_file_size()).await?;

    let image = form
        .take_file("image")
        .ok_or_else(|| AppError::InvalidInput("No image file provided".to_string()))?;

    let mut builder = EditOperations::builder();
    if let Some(width) = form.parse::<u32>("width")? {
        builder = builder.width(width);
    }
    if let Some(height) = form.parse::<u32>("height")? {
        builder = builder.height(height);
    }
    if let Some(upscale) = form.parse::<UpscaleMethod>("upscale")? {
        builder = builder.upscale(upscale);
    }
    if let Some(decompress) = form.parse::<DecompressMode>("decompress")? {
        builder = builder.decompress(decompress);
    }
    let operations = builder.polish(form.flag("polish")).build();

    let outcome = state
        .claid
        .edit(&image, &operations)
        .await
        .map_err(AppError::from)?;

    let edit = match outcome {
        EditOutcome::Processed(edit) => edit,
        EditOutcome::Raw(payload) => return Ok(Json(payload).into_response()),
    };

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, edit.content_type.as_str())
        .header(HEADER_ORIGINAL_SIZE, edit.original_size)
        .header(HEADER_NEW_SIZE, edit.new_size)
        .body(Body::from(edit.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    match HeaderValue::from_bytes(edit.metadata.to_string().as_bytes()) {
        Ok(value) => {
            response.headers_mut().insert(HEADER_CLAID_RESPONSE, value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Claid response is not a valid header value, omitting it");
        }
    }

    Ok(response)
}
