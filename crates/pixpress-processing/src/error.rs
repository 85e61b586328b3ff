use pixpress_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    #[error("Target dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Target dimensions {width}x{height} exceed the {max}px limit")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Encoder produced no output")]
    EmptyOutput,
}

impl From<ResizeError> for AppError {
    fn from(err: ResizeError) -> Self {
        match err {
            ResizeError::InvalidDimensions { .. } | ResizeError::DimensionsTooLarge { .. } => {
                AppError::InvalidInput(err.to_string())
            }
            ResizeError::Decode(msg) => AppError::ImageDecode(msg),
            ResizeError::Encode(msg) => AppError::ImageEncode(msg),
            ResizeError::EmptyOutput => AppError::ImageEncode(err.to_string()),
        }
    }
}
