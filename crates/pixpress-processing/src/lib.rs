//! Pixpress Image Processing Library
//!
//! Local resizing used when no remote editor is configured, and by the
//! `/api/process` endpoint.

pub mod error;
pub mod image;

pub use error::ResizeError;
pub use crate::image::{
    CoverPlacement, ImageResize, ImageTransformer, ResizeOutput, ResizeRequest, MAX_OUTPUT_DIMENSION,
};
