//! Image processing module
//!
//! - Cover-fit geometry and resampling (resize)
//! - Decode, resize and JPEG re-encode in one call (transformer)

pub mod resize;
pub mod transformer;

pub use resize::{CoverPlacement, ImageResize};
pub use transformer::{ImageTransformer, ResizeOutput, ResizeRequest, MAX_OUTPUT_DIMENSION};
