mod image;
mod operations;
mod options;
mod preset;

pub use image::{
    ImageRecord, ImageRecordResponse, ImageStatus, InvalidTransition, ProcessedImage, SourceFile,
};
pub use operations::{EditOperations, EditOperationsBuilder, Resizing, Restorations};
pub use options::{
    DecompressMode, ParseOptionError, ProcessingOptions, RestorationOptions, UpscaleMethod,
    DEFAULT_QUALITY,
};
pub use preset::{default_preset, find_preset, PresetDimension, PRESET_DIMENSIONS};
