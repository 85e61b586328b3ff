//! Error types module
//!
//! All user-facing failures are unified under [`AppError`]. Each variant describes
//! how it should be presented over HTTP through the [`ErrorMetadata`] trait, so the
//! API layer only has to render what the error says about itself.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for upstream or user-data problems
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPSTREAM_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed request input (e.g. no file)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing credential or other deployment problem
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote editing API answered with a non-success status
    #[error("Upstream error: status {status}")]
    Upstream { status: u16, body: String },

    /// The request to the remote editing API could not be sent or answered
    #[error("Upstream connection error: {0}")]
    UpstreamConnect(String),

    /// Fetching the processed result from its temporary URL failed
    #[error("Download error: {0}")]
    Download(String),

    /// The remote editing API answered with a body that could not be used
    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("Archive error: {0}")]
    Archive(String),

    /// Operation not allowed in the current batch state (e.g. already processing)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Destructive operation on a non-empty batch without explicit confirmation
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<crate::models::InvalidTransition> for AppError {
    fn from(err: crate::models::InvalidTransition) -> Self {
        AppError::Conflict(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::Configuration(_) => (500, "CONFIGURATION_ERROR", false, false, LogLevel::Error),
        AppError::Upstream { status, .. } => (
            upstream_status(*status),
            "UPSTREAM_ERROR",
            *status == 429 || *status >= 500,
            false,
            LogLevel::Warn,
        ),
        AppError::UpstreamConnect(_) => {
            (500, "UPSTREAM_CONNECT_ERROR", true, false, LogLevel::Warn)
        }
        AppError::Download(_) => (500, "DOWNLOAD_ERROR", true, false, LogLevel::Warn),
        AppError::Processing(_) => (500, "PROCESSING_ERROR", false, false, LogLevel::Warn),
        AppError::ImageDecode(_) => (500, "IMAGE_DECODE_ERROR", false, false, LogLevel::Warn),
        AppError::ImageEncode(_) => (500, "IMAGE_ENCODE_ERROR", false, false, LogLevel::Error),
        AppError::Archive(_) => (500, "ARCHIVE_ERROR", true, true, LogLevel::Error),
        AppError::Conflict(_) => (409, "CONFLICT", true, false, LogLevel::Debug),
        AppError::ConfirmationRequired(_) => {
            (409, "CONFIRMATION_REQUIRED", false, false, LogLevel::Debug)
        }
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
    }
}

/// Upstream statuses are forwarded as-is when they are valid error codes.
fn upstream_status(status: u16) -> u16 {
    if (400..=599).contains(&status) {
        status
    } else {
        502
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Configuration(msg)
            | AppError::Conflict(msg)
            | AppError::ConfirmationRequired(msg) => msg.clone(),
            AppError::Upstream { status, .. } => format!("Claid API error: {}", status),
            AppError::UpstreamConnect(_)
            | AppError::Download(_)
            | AppError::Processing(_)
            | AppError::ImageDecode(_)
            | AppError::ImageEncode(_) => "Failed to process image".to_string(),
            AppError::Archive(_) => "Failed to generate archive".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }
}

impl AppError {
    /// Variant name for logs and non-production error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Configuration(_) => "Configuration",
            AppError::Upstream { .. } => "Upstream",
            AppError::UpstreamConnect(_) => "UpstreamConnect",
            AppError::Download(_) => "Download",
            AppError::Processing(_) => "Processing",
            AppError::ImageDecode(_) => "ImageDecode",
            AppError::ImageEncode(_) => "ImageEncode",
            AppError::Archive(_) => "Archive",
            AppError::Conflict(_) => "Conflict",
            AppError::ConfirmationRequired(_) => "ConfirmationRequired",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Failures of an image edit. Their details stay visible in production
    /// so callers can tell why an edit failed.
    pub fn is_processing_failure(&self) -> bool {
        matches!(
            self,
            AppError::Upstream { .. }
                | AppError::UpstreamConnect(_)
                | AppError::Download(_)
                | AppError::Processing(_)
                | AppError::ImageDecode(_)
                | AppError::ImageEncode(_)
        )
    }

    /// Detail string shown to clients outside production. Upstream errors
    /// forward the remote body verbatim.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::Upstream { body, .. } => body.clone(),
            AppError::UpstreamConnect(msg)
            | AppError::Download(msg)
            | AppError::Processing(msg)
            | AppError::ImageDecode(msg)
            | AppError::ImageEncode(msg)
            | AppError::Archive(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}
