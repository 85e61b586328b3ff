//! Editors used by the batch orchestrator.
//!
//! [`RemoteEditor`] sends each image to Claid with the run's options;
//! [`LocalEditor`] resizes in-process and ignores the AI restorations.

use async_trait::async_trait;
use pixpress_core::{
    AppError, Config, EditOperations, ProcessedImage, ProcessingBackend, ProcessingOptions,
    SourceFile,
};
use pixpress_processing::{ImageTransformer, ResizeOutput, ResizeRequest};
use std::sync::Arc;

use crate::claid::{ClaidClient, ClaidConfig, EditOutcome};

#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    async fn edit(
        &self,
        source: &SourceFile,
        options: &ProcessingOptions,
    ) -> Result<ProcessedImage, AppError>;
}

pub struct RemoteEditor {
    client: ClaidClient,
}

impl RemoteEditor {
    pub fn new(client: ClaidClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageEditor for RemoteEditor {
    fn name(&self) -> &'static str {
        "claid"
    }

    async fn edit(
        &self,
        source: &SourceFile,
        options: &ProcessingOptions,
    ) -> Result<ProcessedImage, AppError> {
        let operations = EditOperations::from_options(options);
        match self.client.edit(source, &operations).await? {
            EditOutcome::Processed(edit) => Ok(ProcessedImage::new(edit.data, edit.content_type)),
            // A batch record has nowhere to keep a bare JSON payload
            EditOutcome::Raw(_) => Err(AppError::Processing(
                "Claid response did not include a processed image URL".to_string(),
            )),
        }
    }
}

#[derive(Debug, Default)]
pub struct LocalEditor;

#[async_trait]
impl ImageEditor for LocalEditor {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn edit(
        &self,
        source: &SourceFile,
        options: &ProcessingOptions,
    ) -> Result<ProcessedImage, AppError> {
        if !options.restorations.is_default() {
            tracing::debug!("Local editor ignores restoration options");
        }

        let data = source.data.clone();
        let request = ResizeRequest::new(options.preset.width, options.preset.height, options.quality);
        let output = tokio::task::spawn_blocking(move || {
            ImageTransformer::resize_to_jpeg(&data, request)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Resize task failed: {}", e)))??;

        Ok(ProcessedImage::new(output.data, ResizeOutput::CONTENT_TYPE))
    }
}

/// Editor selected by `PROCESSING_BACKEND`
pub fn editor_from_config(config: &Config) -> Result<Arc<dyn ImageEditor>, AppError> {
    match config.processing_backend {
        ProcessingBackend::Remote => {
            let client = ClaidClient::new(ClaidConfig::from(config))?;
            Ok(Arc::new(RemoteEditor::new(client)))
        }
        ProcessingBackend::Local => Ok(Arc::new(LocalEditor)),
    }
}
