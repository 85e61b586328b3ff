use axum::Json;
use pixpress_core::{PresetDimension, PRESET_DIMENSIONS};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PresetResponse {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl From<&PresetDimension> for PresetResponse {
    fn from(preset: &PresetDimension) -> Self {
        Self {
            name: preset.name.to_string(),
            width: preset.width,
            height: preset.height,
        }
    }
}

/// Available output presets; the first is the default
#[utoipa::path(
    get,
    path = "/api/presets",
    tag = "batch",
    responses((status = 200, description = "Preset table", body = [PresetResponse]))
)]
pub async fn list_presets() -> Json<Vec<PresetResponse>> {
    Json(PRESET_DIMENSIONS.iter().map(PresetResponse::from).collect())
}
