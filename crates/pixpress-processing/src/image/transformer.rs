//! Decode, cover-resize and JPEG re-encode.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;

use crate::error::ResizeError;
use crate::image::resize::ImageResize;

/// Largest accepted output edge, in pixels.
pub const MAX_OUTPUT_DIMENSION: u32 = 8192;

/// Target of a local resize. Quality is 0-100 and is clamped to the
/// encoder's 1-100 range when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl ResizeRequest {
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            quality,
        }
    }

    fn validate(&self) -> Result<(), ResizeError> {
        if self.width == 0 || self.height == 0 {
            return Err(ResizeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_OUTPUT_DIMENSION || self.height > MAX_OUTPUT_DIMENSION {
            return Err(ResizeError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_OUTPUT_DIMENSION,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ResizeOutput {
    pub data: Bytes,
    pub original_size: u64,
    pub new_size: u64,
}

impl ResizeOutput {
    pub const CONTENT_TYPE: &'static str = "image/jpeg";
}

pub struct ImageTransformer;

impl ImageTransformer {
    pub fn resize_to_jpeg(data: &[u8], request: ResizeRequest) -> Result<ResizeOutput, ResizeError> {
        request.validate()?;

        let img = Self::decode(data)?;
        let resized = ImageResize::cover(&img, request.width, request.height);
        let encoded = Self::encode_jpeg(resized, request.quality)?;

        tracing::debug!(
            original_size = data.len(),
            new_size = encoded.len(),
            width = request.width,
            height = request.height,
            quality = request.quality,
            "Resized image"
        );

        Ok(ResizeOutput {
            original_size: data.len() as u64,
            new_size: encoded.len() as u64,
            data: encoded,
        })
    }

    pub fn decode(data: &[u8]) -> Result<DynamicImage, ResizeError> {
        let img = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;
        Ok(img)
    }

    fn encode_jpeg(img: DynamicImage, quality: u8) -> Result<Bytes, ResizeError> {
        let (width, height) = img.dimensions();
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

        let mut buffer = Vec::with_capacity((width * height) as usize / 4);
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        if buffer.is_empty() {
            return Err(ResizeError::EmptyOutput);
        }
        Ok(Bytes::from(buffer))
    }
}
