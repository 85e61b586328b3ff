//! Pixpress Core Library
//!
//! This crate provides the domain models, error types, and configuration that are
//! shared across all Pixpress components (processing, services, worker, API, CLI).

pub mod config;
pub mod error;
pub mod format;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ProcessingBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use format::{format_bytes, size_change_percent};
pub use models::{
    default_preset, find_preset, DecompressMode, EditOperations, EditOperationsBuilder,
    ImageRecord, ImageRecordResponse, ImageStatus, InvalidTransition, ParseOptionError,
    PresetDimension,
    ProcessedImage, ProcessingOptions, Resizing, RestorationOptions, Restorations, SourceFile,
    UpscaleMethod, DEFAULT_QUALITY, PRESET_DIMENSIONS,
};
