use image::{imageops, DynamicImage, GenericImageView};

/// Geometry of a "cover" fit: the source is scaled uniformly until it covers
/// the target on both axes, then centred. Expressed in source pixels as the
/// centred region that survives the crop, so only that region is resampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverPlacement {
    pub scale: f64,
    pub crop_x: u32,
    pub crop_y: u32,
    pub crop_width: u32,
    pub crop_height: u32,
}

impl CoverPlacement {
    pub fn compute(orig_width: u32, orig_height: u32, target_width: u32, target_height: u32) -> Self {
        let scale = f64::max(
            target_width as f64 / orig_width as f64,
            target_height as f64 / orig_height as f64,
        );

        let crop_width = ((target_width as f64 / scale).round() as u32).clamp(1, orig_width);
        let crop_height = ((target_height as f64 / scale).round() as u32).clamp(1, orig_height);

        Self {
            scale,
            crop_x: (orig_width - crop_width) / 2,
            crop_y: (orig_height - crop_height) / 2,
            crop_width,
            crop_height,
        }
    }
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            imageops::FilterType::CatmullRom
        } else {
            imageops::FilterType::Lanczos3
        }
    }

    /// Resize to exactly `target_width` x `target_height`, covering the whole
    /// canvas and cropping the overflow symmetrically.
    ///
    /// The crop happens on the source before resampling, so memory stays
    /// proportional to the source plus the target.
    pub fn cover(img: &DynamicImage, target_width: u32, target_height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let placement = CoverPlacement::compute(orig_width, orig_height, target_width, target_height);

        tracing::debug!(
            orig_width,
            orig_height,
            target_width,
            target_height,
            scale = placement.scale,
            crop_width = placement.crop_width,
            crop_height = placement.crop_height,
            "Applying cover resize"
        );

        let filter = Self::select_filter(
            placement.crop_width,
            placement.crop_height,
            target_width,
            target_height,
        );

        img.crop_imm(
            placement.crop_x,
            placement.crop_y,
            placement.crop_width,
            placement.crop_height,
        )
        .resize_exact(target_width, target_height, filter)
    }
}
