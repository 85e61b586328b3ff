use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::format::size_change_percent;

/// Lifecycle status of one image in a batch.
///
/// Only `Pending -> Processing -> {Completed | Error}` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Pending => "pending",
            ImageStatus::Processing => "processing",
            ImageStatus::Completed => "completed",
            ImageStatus::Error => "error",
        }
    }

    fn can_transition_to(self, next: ImageStatus) -> bool {
        matches!(
            (self, next),
            (ImageStatus::Pending, ImageStatus::Processing)
                | (ImageStatus::Processing, ImageStatus::Completed)
                | (ImageStatus::Processing, ImageStatus::Error)
        )
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: ImageStatus,
    pub to: ImageStatus,
}

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Uploader filter: only `image/*` content types are accepted into a batch.
    pub fn is_image(&self) -> bool {
        self.content_type.to_lowercase().starts_with("image/")
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Output of a successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pub data: Bytes,
    pub content_type: String,
}

impl ProcessedImage {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One image of a batch.
///
/// The processed blob and its size live in a single `Option<ProcessedImage>`,
/// so they are present together or absent together, and only `complete` sets it.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    id: Uuid,
    source: SourceFile,
    status: ImageStatus,
    processed: Option<ProcessedImage>,
    error: Option<String>,
    added_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn new(source: SourceFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            status: ImageStatus::Pending,
            processed: None,
            error: None,
            added_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.source.file_name
    }

    pub fn original_size(&self) -> u64 {
        self.source.size()
    }

    pub fn status(&self) -> ImageStatus {
        self.status
    }

    pub fn processed(&self) -> Option<&ProcessedImage> {
        self.processed.as_ref()
    }

    pub fn processed_size(&self) -> Option<u64> {
        self.processed.as_ref().map(ProcessedImage::size)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Path that serves the source bytes for display
    pub fn preview_path(&self) -> String {
        format!("/api/batch/images/{}/preview", self.id)
    }

    /// Completed with a non-empty blob
    pub fn is_archivable(&self) -> bool {
        self.status == ImageStatus::Completed
            && self.processed.as_ref().is_some_and(|p| !p.is_empty())
    }

    fn transition(&mut self, next: ImageStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn start_processing(&mut self) -> Result<(), InvalidTransition> {
        self.transition(ImageStatus::Processing)
    }

    pub fn complete(&mut self, processed: ProcessedImage) -> Result<(), InvalidTransition> {
        self.transition(ImageStatus::Completed)?;
        self.processed = Some(processed);
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), InvalidTransition> {
        self.transition(ImageStatus::Error)?;
        self.error = Some(message.into());
        Ok(())
    }
}

/// JSON view of an image record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageRecordResponse {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub preview_url: String,
    pub original_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_size: Option<u64>,
    /// Relative size change in percent (negative when the output is smaller)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_change_percent: Option<i64>,
    pub status: ImageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl From<&ImageRecord> for ImageRecordResponse {
    fn from(record: &ImageRecord) -> Self {
        let processed_size = record.processed_size();
        Self {
            id: record.id(),
            file_name: record.file_name().to_string(),
            content_type: record.source().content_type.clone(),
            preview_url: record.preview_path(),
            original_size: record.original_size(),
            processed_size,
            size_change_percent: processed_size
                .and_then(|size| size_change_percent(record.original_size(), size)),
            status: record.status(),
            error: record.error_message().map(String::from),
            added_at: record.added_at(),
        }
    }
}
