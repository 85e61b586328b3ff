//! OpenAPI documentation, served at `crate::constants::OPENAPI_PATH`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use pixpress_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pixpress API",
        version = "0.1.0",
        description = "Batch image resizing and AI restoration for social media presets. Images are edited through the Claid API or resized locally, then downloaded as one ZIP archive."
    ),
    paths(
        handlers::health::health_check,
        handlers::presets::list_presets,
        // Single image
        handlers::claid_upload::claid_upload,
        handlers::process::process_image,
        // Batch
        handlers::batch::add_images,
        handlers::batch::get_batch,
        handlers::batch::preview_image,
        handlers::batch::remove_image,
        handlers::batch::process_batch,
        handlers::batch::reset_batch,
        handlers::batch::download_batch,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::health::HealthResponse,
        handlers::presets::PresetResponse,
        handlers::batch::BatchResponse,
        handlers::batch::ProcessBatchRequest,
        handlers::batch::ProcessBatchResponse,
        handlers::batch::ResetBatchRequest,
        handlers::batch::ResetBatchResponse,
        models::ImageRecordResponse,
        models::ImageStatus,
        models::UpscaleMethod,
        models::DecompressMode,
        models::RestorationOptions,
        pixpress_worker::BatchSummary,
        pixpress_worker::RunReport,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "editing", description = "Single image edits"),
        (name = "batch", description = "Batch upload, processing and download"),
    )
)]
pub struct ApiDoc;
